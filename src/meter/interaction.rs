//! Pointer state machine of a meter: marker placement, selection, context menu and
//! delta measurement.

use super::transform::CoordinateTransform;

use data::meter::{DeltaMeasurement, MarkerBook, MarkerId, MarkerKind};
use iced::{Point, Rectangle, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Secondary,
}

/// Input already reduced to surface-relative logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pointer {
    Down(Button, Point),
    Move(Point),
    Up(Button),
    /// Escape, focus loss or the pointer leaving while nothing is dragged
    Cancel,
}

/// What the state machine wants from the host display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Request {
    PlaceMarker { price: f64 },
    Select(Option<MarkerId>),
    Resize(MarkerId, MarkerKind),
    Delete(MarkerId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Ignored,
    Redraw,
    Request(Request),
}

pub struct Context<'a> {
    pub transform: &'a CoordinateTransform,
    pub markers: &'a MarkerBook,
    pub annotate_held: bool,
    pub hit_tolerance: f32,
    pub bounds: Size,
}

impl Context<'_> {
    /// Closest marker whose line is within the pixel tolerance of `y`.
    pub fn marker_at(&self, y: f32) -> Option<MarkerId> {
        self.markers
            .iter()
            .map(|m| (m.id, (self.transform.price_to_y(m.price.to_f64()) - y).abs()))
            .filter(|(_, distance)| *distance <= self.hit_tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    Measuring(DeltaMeasurement),
    Menu(ContextMenu),
}

impl Interaction {
    pub fn measurement(&self) -> Option<&DeltaMeasurement> {
        match self {
            Interaction::Measuring(m) => Some(m),
            _ => None,
        }
    }

    pub fn menu(&self) -> Option<&ContextMenu> {
        match self {
            Interaction::Menu(menu) => Some(menu),
            _ => None,
        }
    }

    pub fn on_pointer(&mut self, pointer: Pointer, ctx: &Context<'_>) -> Outcome {
        match (*self, pointer) {
            (_, Pointer::Cancel) => self.reset(),

            (Interaction::Menu(menu), Pointer::Down(Button::Primary, p)) => {
                *self = Interaction::Idle;
                match menu.item_at(p) {
                    Some(MenuItem::Resize(kind)) => {
                        Outcome::Request(Request::Resize(menu.marker, kind))
                    }
                    Some(MenuItem::Delete) => Outcome::Request(Request::Delete(menu.marker)),
                    None => Outcome::Redraw,
                }
            }
            (Interaction::Menu(_), Pointer::Down(Button::Secondary, _)) => self.reset(),
            (Interaction::Menu(mut menu), Pointer::Move(p)) => {
                let hovered = menu.row_at(p);
                if hovered == menu.hovered {
                    return Outcome::Ignored;
                }
                menu.hovered = hovered;
                *self = Interaction::Menu(menu);
                Outcome::Redraw
            }
            (Interaction::Menu(_), Pointer::Up(_)) => Outcome::Ignored,

            (Interaction::Measuring(mut m), Pointer::Move(p)) => {
                m.update(ctx.transform.price_at(p.y));
                *self = Interaction::Measuring(m);
                Outcome::Redraw
            }
            (Interaction::Measuring(_), Pointer::Up(Button::Secondary)) => self.reset(),
            (Interaction::Measuring(_), _) => Outcome::Ignored,

            (Interaction::Idle, Pointer::Down(Button::Primary, p)) => {
                if ctx.annotate_held {
                    Outcome::Request(Request::PlaceMarker {
                        price: ctx.transform.price_at(p.y),
                    })
                } else {
                    Outcome::Request(Request::Select(ctx.marker_at(p.y)))
                }
            }
            (Interaction::Idle, Pointer::Down(Button::Secondary, p)) => {
                if ctx.annotate_held {
                    let Some(id) = ctx.marker_at(p.y) else {
                        return Outcome::Ignored;
                    };
                    let kind = ctx.markers.get(id).map(|m| m.kind).unwrap_or_default();

                    *self = Interaction::Menu(ContextMenu::new(id, kind, p, ctx.bounds));
                    Outcome::Request(Request::Select(Some(id)))
                } else {
                    let price = ctx.transform.price_at(p.y);
                    *self = Interaction::Measuring(DeltaMeasurement::begin(price, p.y));
                    Outcome::Redraw
                }
            }
            (Interaction::Idle, Pointer::Move(_)) if ctx.annotate_held => Outcome::Redraw,
            (Interaction::Idle, _) => Outcome::Ignored,
        }
    }

    /// Input that arrives while there is nothing to map it onto. Releases and cancels
    /// still end a gesture; everything else is dropped.
    pub fn on_pointer_unmapped(&mut self, pointer: Pointer) -> Outcome {
        match (*self, pointer) {
            (_, Pointer::Cancel) | (Interaction::Measuring(_), Pointer::Up(Button::Secondary)) => {
                self.reset()
            }
            _ => Outcome::Ignored,
        }
    }

    fn reset(&mut self) -> Outcome {
        if matches!(self, Interaction::Idle) {
            Outcome::Ignored
        } else {
            *self = Interaction::Idle;
            Outcome::Redraw
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Resize(MarkerKind),
    Delete,
}

impl std::fmt::Display for MenuItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MenuItem::Resize(kind) => write!(f, "{kind}"),
            MenuItem::Delete => write!(f, "Delete"),
        }
    }
}

/// Marker actions, laid out in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextMenu {
    pub marker: MarkerId,
    pub current: MarkerKind,
    pub origin: Point,
    pub hovered: Option<usize>,
}

impl ContextMenu {
    /// One resize row per marker kind, then `Delete`.
    pub const ITEMS: [MenuItem; MarkerKind::ALL.len() + 1] = {
        let mut items = [MenuItem::Delete; MarkerKind::ALL.len() + 1];
        let mut idx = 0;
        while idx < MarkerKind::ALL.len() {
            items[idx] = MenuItem::Resize(MarkerKind::ALL[idx]);
            idx += 1;
        }
        items
    };
    pub const ROW_HEIGHT: f32 = 22.0;
    pub const WIDTH: f32 = 96.0;

    /// Opens at `at`, shifted so the whole menu stays on the surface.
    pub fn new(marker: MarkerId, current: MarkerKind, at: Point, surface: Size) -> Self {
        let height = Self::ROW_HEIGHT * Self::ITEMS.len() as f32;
        let x = at.x.min(surface.width - Self::WIDTH).max(0.0);
        let y = at.y.min(surface.height - height).max(0.0);

        Self {
            marker,
            current,
            origin: Point::new(x, y),
            hovered: None,
        }
    }

    pub fn bounds(&self) -> Rectangle {
        Rectangle {
            x: self.origin.x,
            y: self.origin.y,
            width: Self::WIDTH,
            height: Self::ROW_HEIGHT * Self::ITEMS.len() as f32,
        }
    }

    pub fn row_bounds(&self, idx: usize) -> Rectangle {
        Rectangle {
            x: self.origin.x,
            y: self.origin.y + Self::ROW_HEIGHT * idx as f32,
            width: Self::WIDTH,
            height: Self::ROW_HEIGHT,
        }
    }

    pub fn row_at(&self, p: Point) -> Option<usize> {
        (0..Self::ITEMS.len()).find(|&idx| self.row_bounds(idx).contains(p))
    }

    pub fn item_at(&self, p: Point) -> Option<MenuItem> {
        self.row_at(p).map(|idx| Self::ITEMS[idx])
    }
}
