pub mod interaction;
pub mod registry;
pub mod render;
pub mod surface;
pub mod transform;

use interaction::{Button, Context, Interaction, Outcome, Pointer, Request};
use registry::{Registry, Visualization};
use render::{Layers, Overlay, View};
use surface::FrameSurface;
use transform::CoordinateTransform;

use data::meter::{AdaptiveScale, MarkerBook, MarkerChange, MarkerId, MarkerKind, scale};
use data::{DisplayId, DisplaySpec, InternalError, RenderConfig, ScaleFactor};
use exchange::{MarketSnapshot, Price, RawSnapshot, SnapshotError};

use iced::widget::canvas::{self, Cache, Canvas, Event};
use iced::{Element, Length, Rectangle, Renderer, Size, Theme, keyboard, mouse, window};

/// Latest input of a display. Replaced wholesale on every snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Waiting,
    Rejected(SnapshotError),
    Ready(MarketSnapshot),
}

#[derive(Debug, Clone, Copy)]
pub enum Message {
    BoundsChanged(Rectangle),
    Pointer(Request),
}

/// Outbound notifications for the host to persist.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    MarkerChanged(MarkerChange),
}

/// What a handled canvas event asks of the widget tree.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Reply {
    Redraw { capture: bool },
    Publish(Request),
}

#[derive(Default)]
pub struct CanvasState {
    interaction: Interaction,
    modifiers: keyboard::Modifiers,
}

/// One instrument's meter: latest snapshot, its markers and the canvas that paints them.
pub struct MeterDisplay {
    id: DisplayId,
    symbol: String,
    status: Status,
    last_rejection: Option<SnapshotError>,
    config: RenderConfig,
    scale_config: scale::Config,
    interaction: data::Interaction,
    ui_scale: f32,
    /// Scale factor the OS applies to the window, on top of `ui_scale`
    window_factor: f32,
    markers: MarkerBook,
    selected: Option<MarkerId>,
    visualization: Box<dyn Visualization>,
    cache: Cache,
    bounds: Option<Rectangle>,
}

impl MeterDisplay {
    pub fn new(
        spec: &DisplaySpec,
        registry: &Registry,
        config: RenderConfig,
        interaction: data::Interaction,
        scale_factor: ScaleFactor,
    ) -> Result<Self, InternalError> {
        let visualization = registry.resolve(spec.kind).ok_or_else(|| {
            InternalError::Layout(format!(
                "no visualization registered for {} ({})",
                spec.kind, spec.symbol
            ))
        })?;

        Ok(Self {
            id: spec.id,
            symbol: spec.symbol.clone(),
            status: Status::Waiting,
            last_rejection: None,
            config,
            scale_config: scale::Config::default(),
            interaction,
            ui_scale: scale_factor.into(),
            window_factor: 1.0,
            markers: MarkerBook::from_markers(spec.id, spec.markers.clone()),
            selected: None,
            visualization,
            cache: Cache::new(),
            bounds: None,
        })
    }

    pub fn id(&self) -> DisplayId {
        self.id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn markers(&self) -> &MarkerBook {
        &self.markers
    }

    /// Takes the snapshot if it is for this display's symbol. The latest one always wins,
    /// rejected ones included.
    pub fn on_snapshot(&mut self, raw: &RawSnapshot) -> bool {
        if raw.symbol.as_deref() != Some(self.symbol.as_str()) {
            return false;
        }

        self.status = match MarketSnapshot::try_from(raw.clone()) {
            Ok(snapshot) => {
                if self.last_rejection.take().is_some() {
                    log::info!("{}: receiving valid snapshots again", self.symbol);
                }
                Status::Ready(snapshot)
            }
            Err(err) => {
                if self.last_rejection.as_ref() != Some(&err) {
                    log::warn!("{}: rejected snapshot: {err}", self.symbol);
                    self.last_rejection = Some(err.clone());
                }
                Status::Rejected(err)
            }
        };

        self.cache.clear();
        true
    }

    pub fn on_resize(&mut self, bounds: Rectangle) {
        self.bounds = Some(bounds);
        self.cache.clear();
    }

    pub fn set_config(&mut self, config: RenderConfig) {
        self.config = config;
        self.cache.clear();
    }

    pub fn set_scale_factor(&mut self, scale_factor: ScaleFactor) {
        self.ui_scale = scale_factor.into();
        self.cache.clear();
    }

    pub fn set_window_factor(&mut self, factor: f32) {
        self.window_factor = if factor.is_finite() && factor > 0.0 {
            factor
        } else {
            1.0
        };
        self.cache.clear();
    }

    /// Physical pixels per logical pixel of the canvas.
    pub fn device_pixel_ratio(&self) -> f32 {
        self.ui_scale * self.window_factor
    }

    pub fn update(&mut self, message: Message) -> Option<Action> {
        match message {
            Message::BoundsChanged(bounds) => {
                self.on_resize(bounds);
                None
            }
            Message::Pointer(Request::PlaceMarker { price }) => {
                let Status::Ready(snapshot) = &self.status else {
                    return None;
                };
                let pip = snapshot.pip_step()?;

                let change = self.markers.place(price, pip, MarkerKind::default());
                self.selected = Some(change.marker().id);
                Some(Action::MarkerChanged(change))
            }
            Message::Pointer(Request::Select(id)) => {
                self.selected = id;
                None
            }
            Message::Pointer(Request::Resize(id, kind)) => self
                .markers
                .set_kind(id, kind)
                .map(Action::MarkerChanged),
            Message::Pointer(Request::Delete(id)) => {
                if self.selected == Some(id) {
                    self.selected = None;
                }
                self.markers.remove(id).map(Action::MarkerChanged)
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        Canvas::new(self)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Transform for the current snapshot at the last known size.
    pub fn transform(&self) -> Option<CoordinateTransform> {
        let bounds = self.bounds?;
        self.project(bounds.size()).map(|(_, transform)| transform)
    }

    fn project(&self, size: Size) -> Option<(AdaptiveScale, CoordinateTransform)> {
        let Status::Ready(snapshot) = &self.status else {
            return None;
        };
        Some(transform::project(
            snapshot,
            &self.scale_config,
            size,
            self.config.layout.padding,
            self.device_pixel_ratio(),
        ))
    }

    fn annotate_held(&self, modifiers: keyboard::Modifiers) -> bool {
        self.interaction.annotate_modifier.is_held(modifiers)
    }

    fn render_view<'a>(&'a self, overlay: Overlay<'a>) -> View<'a> {
        View {
            status: &self.status,
            config: &self.config,
            scale_config: &self.scale_config,
            overlay,
        }
    }

    /// Pip-snapped price under the cursor, shown while the annotate modifier is held.
    fn hover_price(
        &self,
        state: &CanvasState,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<f64> {
        if !matches!(state.interaction, Interaction::Idle) || !self.annotate_held(state.modifiers) {
            return None;
        }
        let position = cursor.position_in(bounds)?;
        let Status::Ready(snapshot) = &self.status else {
            return None;
        };
        let (_, transform) = self.project(bounds.size())?;

        let price = Price::from_f64_lossy(transform.price_at(position.y));
        Some(price.round_to_step(snapshot.pip_step()?).to_f64())
    }

    fn handle_event(
        &self,
        state: &mut CanvasState,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<Reply> {
        let pointer = match event {
            Event::Keyboard(keyboard::Event::ModifiersChanged(modifiers)) => {
                let was_held = self.annotate_held(state.modifiers);
                state.modifiers = *modifiers;

                return (was_held != self.annotate_held(*modifiers))
                    .then_some(Reply::Redraw { capture: false });
            }
            Event::Keyboard(keyboard::Event::KeyPressed {
                key: keyboard::Key::Named(keyboard::key::Named::Escape),
                ..
            })
            | Event::Window(window::Event::Unfocused)
            | Event::Mouse(mouse::Event::CursorLeft) => Pointer::Cancel,
            Event::Mouse(mouse::Event::ButtonPressed(button)) => {
                let position = cursor.position_in(bounds)?;
                Pointer::Down(pointer_button(*button)?, position)
            }
            Event::Mouse(mouse::Event::ButtonReleased(button)) => {
                Pointer::Up(pointer_button(*button)?)
            }
            Event::Mouse(mouse::Event::CursorMoved { .. }) => match state.interaction {
                Interaction::Measuring(_) => {
                    Pointer::Move(cursor.position_from(bounds.position())?)
                }
                _ => match cursor.position_in(bounds) {
                    Some(position) => Pointer::Move(position),
                    None if self.annotate_held(state.modifiers) => {
                        return Some(Reply::Redraw { capture: false });
                    }
                    None => return None,
                },
            },
            _ => return None,
        };

        let outcome = match self.project(bounds.size()) {
            Some((_, transform)) => {
                let ctx = Context {
                    transform: &transform,
                    markers: &self.markers,
                    annotate_held: self.annotate_held(state.modifiers),
                    hit_tolerance: self.interaction.hit_tolerance_px,
                    bounds: bounds.size(),
                };
                state.interaction.on_pointer(pointer, &ctx)
            }
            None => state.interaction.on_pointer_unmapped(pointer),
        };

        match outcome {
            Outcome::Ignored => None,
            Outcome::Redraw => Some(Reply::Redraw { capture: true }),
            Outcome::Request(request) => Some(Reply::Publish(request)),
        }
    }
}

fn pointer_button(button: mouse::Button) -> Option<Button> {
    match button {
        mouse::Button::Left => Some(Button::Primary),
        mouse::Button::Right => Some(Button::Secondary),
        _ => None,
    }
}

impl canvas::Program<Message> for MeterDisplay {
    type State = CanvasState;

    fn update(
        &self,
        state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let reply = self.handle_event(state, event, bounds, cursor);
        let resized = self.bounds != Some(bounds);

        match reply {
            Some(Reply::Publish(request)) => {
                Some(canvas::Action::publish(Message::Pointer(request)).and_capture())
            }
            // the resize rides along with the redraw it triggers
            _ if resized => {
                let action = canvas::Action::publish(Message::BoundsChanged(bounds));
                Some(match reply {
                    Some(Reply::Redraw { capture: true }) => action.and_capture(),
                    _ => action,
                })
            }
            Some(Reply::Redraw { capture }) => {
                let action = canvas::Action::request_redraw();
                Some(if capture { action.and_capture() } else { action })
            }
            None => None,
        }
    }

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let data_layers = self.cache.draw(renderer, bounds.size(), |frame| {
            let mut surface = FrameSurface::new(frame, self.device_pixel_ratio());
            self.visualization.paint(
                &mut surface,
                &self.render_view(Overlay::default()),
                Layers::Data,
            );
        });

        let overlay = Overlay {
            markers: Some(&self.markers),
            selected: self.selected,
            hover_price: self.hover_price(state, bounds, cursor),
            measurement: state.interaction.measurement(),
            menu: state.interaction.menu(),
        };

        let mut frame = canvas::Frame::new(renderer, bounds.size());
        self.visualization.paint(
            &mut FrameSurface::new(&mut frame, self.device_pixel_ratio()),
            &self.render_view(overlay),
            Layers::Overlay,
        );

        vec![data_layers, frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        match state.interaction {
            Interaction::Measuring(_) => mouse::Interaction::ResizingVertically,
            Interaction::Menu(menu)
                if cursor
                    .position_in(bounds)
                    .and_then(|p| menu.row_at(p))
                    .is_some() =>
            {
                mouse::Interaction::Pointer
            }
            Interaction::Idle
                if self.annotate_held(state.modifiers) && cursor.is_over(bounds) =>
            {
                mouse::Interaction::Crosshair
            }
            _ => mouse::Interaction::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::Point;

    fn raw(symbol: &str) -> RawSnapshot {
        RawSnapshot {
            symbol: Some(symbol.to_string()),
            current: Some(1.0560),
            open: Some(1.0550),
            high: Some(1.0620),
            low: Some(1.0490),
            adr_high: Some(1.0650),
            adr_low: Some(1.0450),
            pip_position: Some(4),
            pip_size: Some(0.0001),
        }
    }

    fn display() -> MeterDisplay {
        MeterDisplay::new(
            &DisplaySpec::new("EURUSD"),
            &Registry::with_builtin(),
            RenderConfig::default(),
            data::Interaction::default(),
            ScaleFactor::default(),
        )
        .unwrap()
    }

    fn bounds(width: f32, height: f32) -> Rectangle {
        Rectangle::new(Point::ORIGIN, Size::new(width, height))
    }

    /// Runs one event through the canvas and returns what it publishes.
    fn dispatch(
        display: &MeterDisplay,
        state: &mut CanvasState,
        event: Event,
        at: Point,
    ) -> Option<Message> {
        <MeterDisplay as canvas::Program<Message>>::update(
            display,
            state,
            &event,
            bounds(300.0, 400.0),
            mouse::Cursor::Available(at),
        )
        .and_then(|action| action.into_inner().0)
    }

    #[test]
    fn unregistered_kind_is_an_error() {
        let result = MeterDisplay::new(
            &DisplaySpec::new("EURUSD"),
            &Registry::new(),
            RenderConfig::default(),
            data::Interaction::default(),
            ScaleFactor::default(),
        );

        assert!(result.is_err());
    }

    #[test]
    fn snapshots_for_other_symbols_are_ignored() {
        let mut display = display();

        assert!(!display.on_snapshot(&raw("GBPUSD")));
        assert_eq!(display.status(), &Status::Waiting);

        assert!(display.on_snapshot(&raw("EURUSD")));
        assert!(matches!(display.status(), Status::Ready(_)));
    }

    #[test]
    fn latest_snapshot_wins_even_when_rejected() {
        let mut display = display();
        display.on_snapshot(&raw("EURUSD"));

        let broken = RawSnapshot {
            adr_low: None,
            ..raw("EURUSD")
        };
        display.on_snapshot(&broken);
        assert_eq!(
            display.status(),
            &Status::Rejected(SnapshotError::Missing("adrLow"))
        );

        let newer = RawSnapshot {
            current: Some(1.0601),
            ..raw("EURUSD")
        };
        display.on_snapshot(&newer);
        let Status::Ready(snapshot) = display.status() else {
            panic!("expected a ready display");
        };
        assert_eq!(snapshot.current, 1.0601);
    }

    #[test]
    fn placement_snaps_and_notifies() {
        let mut display = display();
        display.on_snapshot(&raw("EURUSD"));
        display.on_resize(bounds(300.0, 400.0));

        let transform = display.transform().unwrap();
        let y = transform.price_to_y(1.05556);

        let action = display
            .update(Message::Pointer(Request::PlaceMarker {
                price: transform.price_at(y),
            }))
            .unwrap();

        let Action::MarkerChanged(MarkerChange::Added(marker)) = action else {
            panic!("expected an added marker");
        };
        assert_eq!(marker.price, Price::from_f64_lossy(1.0556));
        assert_eq!(marker.display_id, display.id());
        assert_eq!(display.markers().len(), 1);
    }

    #[test]
    fn no_marker_without_snapshot() {
        let mut display = display();

        let action = display.update(Message::Pointer(Request::PlaceMarker { price: 1.0 }));

        assert!(action.is_none());
        assert!(display.markers().is_empty());
    }

    #[test]
    fn markers_keep_price_across_resize() {
        let mut display = display();
        display.on_snapshot(&raw("EURUSD"));
        display.on_resize(bounds(300.0, 400.0));
        display.update(Message::Pointer(Request::PlaceMarker { price: 1.0600 }));

        let before = display.markers().iter().next().unwrap().clone();
        let y_before = display
            .transform()
            .unwrap()
            .price_to_y(before.price.to_f64());

        display.update(Message::BoundsChanged(bounds(300.0, 800.0)));

        let after = display.markers().iter().next().unwrap().clone();
        let y_after = display
            .transform()
            .unwrap()
            .price_to_y(after.price.to_f64());

        assert_eq!(before, after);
        assert!((y_before - y_after).abs() > 1.0);
    }

    #[test]
    fn resize_and_delete_through_messages() {
        let mut display = display();
        display.on_snapshot(&raw("EURUSD"));
        let Some(Action::MarkerChanged(added)) =
            display.update(Message::Pointer(Request::PlaceMarker { price: 1.0575 }))
        else {
            panic!("expected a marker");
        };
        let id = added.marker().id;

        let resized = display.update(Message::Pointer(Request::Resize(id, MarkerKind::Small)));
        assert!(matches!(
            resized,
            Some(Action::MarkerChanged(MarkerChange::Updated(ref m))) if m.kind == MarkerKind::Small
        ));

        let deleted = display.update(Message::Pointer(Request::Delete(id)));
        assert!(matches!(
            deleted,
            Some(Action::MarkerChanged(MarkerChange::Removed(_)))
        ));
        assert!(display.markers().is_empty());
        assert!(display.update(Message::Pointer(Request::Delete(id))).is_none());
    }

    #[test]
    fn restores_persisted_markers() {
        let mut spec = DisplaySpec::new("EURUSD");
        let mut book = MarkerBook::new(spec.id);
        let pip = exchange::PriceStep::from_f64(0.0001).unwrap();
        spec.markers.push(book.place(1.05, pip, MarkerKind::Big).marker().clone());

        let display = MeterDisplay::new(
            &spec,
            &Registry::with_builtin(),
            RenderConfig::default(),
            data::Interaction::default(),
            ScaleFactor::default(),
        )
        .unwrap();

        assert_eq!(display.markers().len(), 1);
    }

    #[test]
    fn release_ends_measurement_while_data_is_rejected() {
        let mut display = display();
        display.on_snapshot(&raw("EURUSD"));
        display.on_resize(bounds(300.0, 400.0));
        let mut state = CanvasState::default();
        let at = Point::new(50.0, 200.0);

        dispatch(
            &display,
            &mut state,
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Right)),
            at,
        );
        assert!(matches!(state.interaction, Interaction::Measuring(_)));

        display.on_snapshot(&RawSnapshot {
            adr_low: None,
            ..raw("EURUSD")
        });
        dispatch(
            &display,
            &mut state,
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Right)),
            at,
        );
        display.on_snapshot(&raw("EURUSD"));

        assert_eq!(state.interaction, Interaction::Idle);
    }

    #[test]
    fn escape_closes_menu_without_data() {
        let mut display = display();
        display.on_snapshot(&raw("EURUSD"));
        display.on_resize(bounds(300.0, 400.0));
        display.update(Message::Pointer(Request::PlaceMarker { price: 1.0550 }));
        let y = display.transform().unwrap().price_to_y(1.0550);

        let mut state = CanvasState {
            modifiers: keyboard::Modifiers::SHIFT,
            ..CanvasState::default()
        };
        dispatch(
            &display,
            &mut state,
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Right)),
            Point::new(40.0, y),
        );
        assert!(state.interaction.menu().is_some());

        display.on_snapshot(&RawSnapshot {
            adr_high: None,
            ..raw("EURUSD")
        });
        dispatch(
            &display,
            &mut state,
            Event::Keyboard(keyboard::Event::KeyPressed {
                key: keyboard::Key::Named(keyboard::key::Named::Escape),
                modified_key: keyboard::Key::Named(keyboard::key::Named::Escape),
                physical_key: keyboard::key::Physical::Unidentified(
                    keyboard::key::NativeCode::Unidentified,
                ),
                location: keyboard::Location::Standard,
                modifiers: keyboard::Modifiers::SHIFT,
                text: None,
                repeat: false,
            }),
            Point::new(40.0, y),
        );

        assert_eq!(state.interaction, Interaction::Idle);
    }

    #[test]
    fn click_on_first_event_is_not_lost_to_resize() {
        let mut display = display();
        display.on_snapshot(&raw("EURUSD"));
        let mut state = CanvasState {
            modifiers: keyboard::Modifiers::SHIFT,
            ..CanvasState::default()
        };

        let published = dispatch(
            &display,
            &mut state,
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)),
            Point::new(50.0, 200.0),
        );
        assert!(matches!(
            published,
            Some(Message::Pointer(Request::PlaceMarker { .. }))
        ));

        let published = dispatch(
            &display,
            &mut state,
            Event::Mouse(mouse::Event::CursorMoved {
                position: Point::new(50.0, 210.0),
            }),
            Point::new(50.0, 210.0),
        );
        assert!(matches!(
            published,
            Some(Message::BoundsChanged(b)) if b == bounds(300.0, 400.0)
        ));
    }

    #[test]
    fn pixel_ratio_combines_window_and_ui_scale() {
        let mut display = display();
        display.set_scale_factor(ScaleFactor::from(1.2));
        display.set_window_factor(1.25);
        assert!((display.device_pixel_ratio() - 1.5).abs() < 1e-6);

        display.on_snapshot(&raw("EURUSD"));
        display.on_resize(bounds(300.0, 400.0));
        let transform = display.transform().unwrap();
        assert!((transform.device_pixel_ratio() - 1.5).abs() < 1e-6);

        display.set_window_factor(f32::NAN);
        assert!((display.device_pixel_ratio() - 1.2).abs() < 1e-6);
    }
}
