//! Layered painter of the day range meter.
//!
//! Layers, bottom to top: background, axis, center line, boundaries (with 50% reference
//! lines), percentage ladder and range badge, price labels, user markers, measurement
//! overlay and the marker context menu. The first six only depend on the snapshot and are
//! cached by the display; the rest follow the pointer and are repainted on every frame.

use super::Status;
use super::interaction::ContextMenu;
use super::surface::{DASHED, DOTTED, Label, Line, Surface};
use super::transform::{CoordinateTransform, project};
use crate::style;

use data::RenderConfig;
use data::config::palette::PriceRole;
use data::meter::{AdaptiveScale, DeltaMeasurement, MarkerBook, MarkerId, scale};
use data::util::format_signed;
use exchange::{MarketSnapshot, Price};

use iced::{Alignment, Color, Point, Size};

const LEVEL_EPSILON: f64 = 1e-9;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("{what} is not a finite position")]
    NonFinite { what: &'static str },
    #[error("surface has no area")]
    EmptySurface,
    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layers {
    All,
    /// Snapshot-driven layers
    Data,
    /// Pointer-driven layers
    Overlay,
}

impl Layers {
    fn data(self) -> bool {
        matches!(self, Layers::All | Layers::Data)
    }

    fn overlay(self) -> bool {
        matches!(self, Layers::All | Layers::Overlay)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Overlay<'a> {
    pub markers: Option<&'a MarkerBook>,
    pub selected: Option<MarkerId>,
    /// Price of the annotate preview line, set while the modifier is held over the surface
    pub hover_price: Option<f64>,
    pub measurement: Option<&'a DeltaMeasurement>,
    pub menu: Option<&'a ContextMenu>,
}

pub struct View<'a> {
    pub status: &'a Status,
    pub config: &'a RenderConfig,
    pub scale_config: &'a scale::Config,
    pub overlay: Overlay<'a>,
}

/// Paints one frame onto `surface`.
///
/// Same inputs, same draw calls. Invalid snapshots turn into a status frame and a failing layer
/// into an error frame; nothing escapes to the caller.
pub fn render(surface: &mut dyn Surface, view: &View<'_>, layers: Layers) {
    let snapshot = match view.status {
        Status::Waiting => {
            if layers.data() {
                paint_status(surface, view.config, None);
            }
            return;
        }
        Status::Rejected(err) => {
            if layers.data() {
                paint_status(surface, view.config, Some(&err.to_string()));
            }
            return;
        }
        Status::Ready(snapshot) => snapshot,
    };

    if let Err(err) = snapshot.validate() {
        if layers.data() {
            paint_status(surface, view.config, Some(&err.to_string()));
        }
        return;
    }

    surface.save();
    let result = paint(surface, snapshot, view, layers);
    surface.restore();

    if let Err(err) = result {
        log::error!("{}: frame dropped: {err}", snapshot.symbol);
        paint_error(surface, view.config, &err);
    }
}

struct Ctx<'a> {
    snapshot: &'a MarketSnapshot,
    scale: AdaptiveScale,
    transform: CoordinateTransform,
    config: &'a RenderConfig,
    scale_config: &'a scale::Config,
    size: Size,
    axis_x: f32,
}

impl Ctx<'_> {
    fn y(&self, price: f64, what: &'static str) -> Result<f32, RenderError> {
        let y = self.transform.price_to_y(price);
        if y.is_finite() {
            Ok(y)
        } else {
            Err(RenderError::NonFinite { what })
        }
    }

    fn left(&self) -> f32 {
        self.config.layout.padding.min(self.size.width / 2.0)
    }

    fn right(&self) -> f32 {
        self.size.width - self.left()
    }

    fn hline(&self, surface: &mut dyn Surface, y: f32, line: Line) {
        let y = self.transform.snap(y, line.width);
        surface.stroke_line(Point::new(self.left(), y), Point::new(self.right(), y), line);
    }

    fn price_text(&self, price: f64) -> String {
        Price::from_f64_lossy(price).format_truncated(self.snapshot.pip_position)
    }

    fn text(
        &self,
        content: String,
        position: Point,
        color: Color,
        align_x: Alignment,
        align_y: Alignment,
    ) -> Label {
        Label {
            content,
            position,
            color,
            size: self.config.fonts.label_size,
            font: style::MONO,
            align_x,
            align_y,
        }
    }
}

fn paint(
    surface: &mut dyn Surface,
    snapshot: &MarketSnapshot,
    view: &View<'_>,
    layers: Layers,
) -> Result<(), RenderError> {
    let size = surface.size();
    if !(size.width > 0.0 && size.height > 0.0) {
        return Err(RenderError::EmptySurface);
    }

    let config = view.config;
    let (scale, transform) = project(
        snapshot,
        view.scale_config,
        size,
        config.layout.padding,
        surface.device_pixel_ratio(),
    );
    if !(scale.range.is_finite() && scale.range > 0.0) {
        return Err(RenderError::Degenerate(format!(
            "price window {} - {}",
            scale.min, scale.max
        )));
    }

    let ctx = Ctx {
        snapshot,
        scale,
        transform,
        config,
        scale_config: view.scale_config,
        size,
        axis_x: config.layout.axis_x(size.width),
    };
    let features = &config.features;

    if layers.data() {
        if features.background {
            background(surface, &ctx);
        }
        if features.axis {
            axis(surface, &ctx)?;
        }
        if features.center_line {
            center_line(surface, &ctx)?;
        }
        if features.boundaries {
            boundaries(surface, &ctx)?;
        }
        if features.percentage_ladder {
            ladder(surface, &ctx)?;
        }
        if features.range_badge {
            range_badge(surface, &ctx);
        }
        if features.price_labels {
            price_labels(surface, &ctx)?;
        }
    }

    if layers.overlay() {
        if features.markers {
            markers(surface, &ctx, &view.overlay)?;
        }
        if features.measurement
            && let Some(measurement) = view.overlay.measurement
            && measurement.active
        {
            measurement_overlay(surface, &ctx, measurement)?;
        }
        if let Some(menu) = view.overlay.menu {
            context_menu(surface, &ctx, menu);
        }
    }

    Ok(())
}

fn background(surface: &mut dyn Surface, ctx: &Ctx<'_>) {
    surface.fill_rect(Point::ORIGIN, ctx.size, ctx.config.palette.background.into());
}

fn axis(surface: &mut dyn Surface, ctx: &Ctx<'_>) -> Result<(), RenderError> {
    let top = ctx.y(ctx.scale.max, "window top")?;
    let bottom = ctx.y(ctx.scale.min, "window bottom")?;
    let x = ctx.transform.snap(ctx.axis_x, 1.0);

    surface.stroke_line(
        Point::new(x, top),
        Point::new(x, bottom),
        Line::solid(1.0, ctx.config.palette.axis.into()),
    );
    Ok(())
}

fn center_line(surface: &mut dyn Surface, ctx: &Ctx<'_>) -> Result<(), RenderError> {
    let y = ctx.y(ctx.snapshot.mid(), "open")?;
    ctx.hline(
        surface,
        y,
        Line::dashed(1.0, ctx.config.palette.center_line.into(), DASHED),
    );
    Ok(())
}

fn percent_label(expansion: f64) -> String {
    format!("{:.0}%", expansion * 100.0)
}

fn boundaries(surface: &mut dyn Surface, ctx: &Ctx<'_>) -> Result<(), RenderError> {
    let palette = &ctx.config.palette;
    let layout = &ctx.config.layout;
    let scale = &ctx.scale;

    let upper_y = ctx.y(scale.upper_boundary(), "upper boundary")?;
    let lower_y = ctx.y(scale.lower_boundary(), "lower boundary")?;

    for (y, expansion, above) in [
        (upper_y, scale.upper_expansion, true),
        (lower_y, scale.lower_expansion, false),
    ] {
        ctx.hline(surface, y, Line::solid(1.0, palette.boundary.into()));

        if scale.has_adr() {
            let (label_y, align_y) = if above {
                (y - 2.0, Alignment::End)
            } else {
                (y + 2.0, Alignment::Start)
            };
            surface.fill_text(ctx.text(
                percent_label(expansion),
                Point::new(ctx.axis_x - layout.label_gap, label_y),
                palette.boundary.into(),
                Alignment::End,
                align_y,
            ));
        }
    }

    if !(ctx.config.features.reference_lines && scale.is_progressive) {
        return Ok(());
    }

    let base = ctx.scale_config.base_expansion;
    for (expansion, sign, boundary_y) in [
        (scale.upper_expansion, 1.0, upper_y),
        (scale.lower_expansion, -1.0, lower_y),
    ] {
        if expansion <= base + LEVEL_EPSILON {
            continue;
        }

        let y = ctx.y(scale.mid + sign * scale.envelope_unit * base, "reference line")?;
        if (y - boundary_y).abs() < layout.reference_min_gap {
            continue;
        }

        ctx.hline(
            surface,
            y,
            Line::dashed(1.0, palette.reference.into(), DOTTED),
        );
        surface.fill_text(ctx.text(
            percent_label(base),
            Point::new(ctx.right(), y - 2.0),
            palette.reference.into(),
            Alignment::End,
            Alignment::End,
        ));
    }

    Ok(())
}

fn ladder(surface: &mut dyn Surface, ctx: &Ctx<'_>) -> Result<(), RenderError> {
    let scale = &ctx.scale;
    let step = ctx.scale_config.step;
    if !scale.has_adr() || step <= 0.0 {
        return Ok(());
    }

    let layout = &ctx.config.layout;
    let color: Color = ctx.config.palette.ladder.into();
    let tick_start = ctx.axis_x - layout.ladder_tick_length;
    let count = (scale.max_adr_percentage / step + LEVEL_EPSILON).floor() as u32;

    for i in 1..=count {
        let level = f64::from(i) * step;

        for (sign, side_expansion) in [
            (1.0, scale.upper_expansion),
            (-1.0, scale.lower_expansion),
        ] {
            let price = scale.mid + sign * scale.envelope_unit * level;
            if !scale.contains(price) {
                continue;
            }

            let y = ctx.transform.snap(ctx.y(price, "ladder tick")?, 1.0);
            surface.stroke_line(
                Point::new(tick_start, y),
                Point::new(ctx.axis_x, y),
                Line::solid(1.0, color),
            );

            // the boundary already carries this level's label
            if (level - side_expansion).abs() > LEVEL_EPSILON {
                let mut label = ctx.text(
                    percent_label(level),
                    Point::new(tick_start - layout.label_gap, y),
                    color,
                    Alignment::End,
                    Alignment::Center,
                );
                label.size -= 1.0;
                surface.fill_text(label);
            }
        }
    }

    Ok(())
}

fn range_badge(surface: &mut dyn Surface, ctx: &Ctx<'_>) {
    let scale = &ctx.scale;
    if !scale.has_adr() {
        return;
    }

    let pct = (ctx.snapshot.high - ctx.snapshot.low) / scale.adr_value * 100.0;
    if !pct.is_finite() {
        return;
    }

    let palette = &ctx.config.palette;
    let text_size = ctx.config.fonts.badge_size;
    let content = format!("{pct:.1}%");

    let width = content.chars().count() as f32 * text_size * 0.6 + 8.0;
    let height = text_size + 6.0;
    let center = Point::new(
        ctx.axis_x,
        (ctx.config.layout.padding / 2.0).max(height / 2.0),
    );

    surface.fill_rect(
        Point::new(center.x - width / 2.0, center.y - height / 2.0),
        Size::new(width, height),
        palette.badge_background.into(),
    );
    surface.fill_text(Label {
        content,
        position: center,
        color: palette.badge_text.into(),
        size: text_size,
        font: style::MONO,
        align_x: Alignment::Center,
        align_y: Alignment::Center,
    });
}

fn price_labels(surface: &mut dyn Surface, ctx: &Ctx<'_>) -> Result<(), RenderError> {
    let snapshot = ctx.snapshot;
    let layout = &ctx.config.layout;

    // current last so it stays on top
    let labels = [
        snapshot.open.map(|open| (PriceRole::Open, open, "O ", "open")),
        Some((PriceRole::High, snapshot.high, "H ", "session high")),
        Some((PriceRole::Low, snapshot.low, "L ", "session low")),
        Some((PriceRole::Current, snapshot.current, "", "current price")),
    ];

    for (role, price, prefix, what) in labels.into_iter().flatten() {
        let emphasized = role == PriceRole::Current;
        let color = ctx.config.palette.role(role);
        let width = if emphasized { 2.0 } else { 1.0 };
        let tick_end = ctx.axis_x + layout.tick_length * if emphasized { 1.5 } else { 1.0 };

        let y = ctx.y(price, what)?;
        let tick_y = ctx.transform.snap(y, width);
        surface.stroke_line(
            Point::new(ctx.axis_x, tick_y),
            Point::new(tick_end, tick_y),
            Line::solid(width, color),
        );

        let mut label = ctx.text(
            format!("{prefix}{}", ctx.price_text(price)),
            Point::new(tick_end + layout.label_gap, y),
            color,
            Alignment::Start,
            Alignment::Center,
        );
        if emphasized {
            label.size += 2.0;
        }
        surface.fill_text(label);
    }

    Ok(())
}

fn markers(
    surface: &mut dyn Surface,
    ctx: &Ctx<'_>,
    overlay: &Overlay<'_>,
) -> Result<(), RenderError> {
    let palette = &ctx.config.palette;

    if let Some(book) = overlay.markers {
        for marker in book.iter() {
            let price = marker.price.to_f64();
            let y = ctx.y(price, "marker")?;
            if y < 0.0 || y > ctx.size.height {
                continue;
            }

            let color: Color = if overlay.selected == Some(marker.id) {
                palette.marker_selected.into()
            } else {
                palette.marker.into()
            };
            let width = marker.kind.line_width();

            ctx.hline(surface, y, Line::solid(width, color));
            surface.fill_text(ctx.text(
                ctx.price_text(price),
                Point::new(ctx.right(), y - width / 2.0 - 2.0),
                color,
                Alignment::End,
                Alignment::End,
            ));
        }
    }

    if let Some(price) = overlay.hover_price {
        let color: Color = palette.hover.into();
        let y = ctx.y(price, "hover preview")?;

        ctx.hline(surface, y, Line::dashed(1.0, color, DASHED));
        surface.fill_text(ctx.text(
            ctx.price_text(price),
            Point::new(ctx.right(), y - 3.0),
            color,
            Alignment::End,
            Alignment::End,
        ));
    }

    Ok(())
}

fn measurement_overlay(
    surface: &mut dyn Surface,
    ctx: &Ctx<'_>,
    measurement: &DeltaMeasurement,
) -> Result<(), RenderError> {
    let color: Color = ctx.config.palette.measure.into();
    let start_y = ctx.y(measurement.start_price, "measurement start")?;
    let end_y = ctx.y(measurement.current_price, "measurement end")?;

    let x = ctx
        .transform
        .snap(ctx.axis_x + (ctx.size.width - ctx.axis_x) * 0.6, 1.0);
    let cap = 4.0;

    surface.stroke_line(
        Point::new(x, start_y),
        Point::new(x, end_y),
        Line::solid(1.0, color),
    );
    for (price, y) in [
        (measurement.start_price, start_y),
        (measurement.current_price, end_y),
    ] {
        let y_snapped = ctx.transform.snap(y, 1.0);
        surface.stroke_line(
            Point::new(x - cap, y_snapped),
            Point::new(x + cap, y_snapped),
            Line::solid(1.0, color),
        );
        surface.fill_text(ctx.text(
            ctx.price_text(price),
            Point::new(x + cap + 2.0, y),
            color,
            Alignment::Start,
            Alignment::Center,
        ));
    }

    let pct = measurement
        .percent_change()
        .map_or_else(|| "-".to_string(), |p| format_signed(p, 2, "%"));
    let readout = match measurement.pips(ctx.snapshot.pip_size) {
        Some(pips) => format!("{pct}  {}", format_signed(pips, 1, " pips")),
        None => pct,
    };

    surface.fill_text(ctx.text(
        readout,
        Point::new(x - cap - 2.0, (start_y + end_y) / 2.0),
        color,
        Alignment::End,
        Alignment::Center,
    ));

    Ok(())
}

fn context_menu(surface: &mut dyn Surface, ctx: &Ctx<'_>, menu: &ContextMenu) {
    let palette = &ctx.config.palette;
    let bounds = menu.bounds();

    surface.fill_rect(
        bounds.position(),
        bounds.size(),
        palette.menu_background.into(),
    );

    for (idx, item) in ContextMenu::ITEMS.iter().enumerate() {
        let row = menu.row_bounds(idx);
        if menu.hovered == Some(idx) {
            surface.fill_rect(row.position(), row.size(), palette.menu_highlight.into());
        }

        let checked = matches!(
            item,
            super::interaction::MenuItem::Resize(kind) if *kind == menu.current
        );
        let content = if checked {
            format!("* {item}")
        } else {
            format!("  {item}")
        };

        surface.fill_text(ctx.text(
            content,
            Point::new(row.x + 6.0, row.center_y()),
            palette.menu_text.into(),
            Alignment::Start,
            Alignment::Center,
        ));
    }
}

fn paint_status(surface: &mut dyn Surface, config: &RenderConfig, reason: Option<&str>) {
    let content = match reason {
        Some(reason) => format!("Waiting for data: {reason}"),
        None => "Waiting for data…".to_string(),
    };
    paint_message(surface, config, content, config.palette.status_text.into());
}

fn paint_error(surface: &mut dyn Surface, config: &RenderConfig, err: &RenderError) {
    paint_message(
        surface,
        config,
        format!("Render error: {err}"),
        config.palette.error_text.into(),
    );
}

/// Wipes the surface and centers `content` on it.
fn paint_message(surface: &mut dyn Surface, config: &RenderConfig, content: String, color: Color) {
    let size = surface.size();
    surface.fill_rect(Point::ORIGIN, size, config.palette.background.into());
    surface.fill_text(Label {
        content,
        position: Point::new(size.width / 2.0, size.height / 2.0),
        color,
        size: config.fonts.status_size,
        font: style::MONO,
        align_x: Alignment::Center,
        align_y: Alignment::Center,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meter::surface::{Op, Recorder};
    use data::meter::{DisplayId, MarkerKind};
    use exchange::{PriceStep, SnapshotError};

    fn eurusd() -> MarketSnapshot {
        MarketSnapshot {
            symbol: "EURUSD".to_string(),
            current: 1.0560,
            open: Some(1.0550),
            high: 1.0620,
            low: 1.0490,
            adr_high: 1.0650,
            adr_low: 1.0450,
            pip_position: 4,
            pip_size: 0.0001,
        }
    }

    fn draw(status: &Status, config: &RenderConfig, overlay: Overlay<'_>, height: f32) -> Recorder {
        let mut surface = Recorder::new(320.0, height);
        let scale_config = scale::Config::default();
        let view = View {
            status,
            config,
            scale_config: &scale_config,
            overlay,
        };
        render(&mut surface, &view, Layers::All);
        surface
    }

    fn dotted_lines(surface: &Recorder) -> usize {
        surface
            .lines()
            .iter()
            .filter(|(_, _, line)| line.dash == Some(DOTTED))
            .count()
    }

    #[test]
    fn waiting_frame_before_first_snapshot() {
        let surface = draw(&Status::Waiting, &RenderConfig::default(), Overlay::default(), 400.0);

        assert_eq!(surface.texts(), vec!["Waiting for data…"]);
        assert!(surface.lines().is_empty());
    }

    #[test]
    fn rejected_snapshot_names_the_reason() {
        let status = Status::Rejected(SnapshotError::Missing("adrHigh"));
        let surface = draw(&status, &RenderConfig::default(), Overlay::default(), 400.0);

        assert_eq!(
            surface.texts(),
            vec!["Waiting for data: missing field `adrHigh`"]
        );
    }

    #[test]
    fn invalid_ready_snapshot_is_not_painted() {
        let status = Status::Ready(MarketSnapshot {
            high: f64::INFINITY,
            ..eurusd()
        });
        let surface = draw(&status, &RenderConfig::default(), Overlay::default(), 400.0);

        assert!(surface.lines().is_empty());
        assert!(surface.has_text("Waiting for data:"));
    }

    #[test]
    fn full_frame_labels() {
        let surface = draw(
            &Status::Ready(eurusd()),
            &RenderConfig::default(),
            Overlay::default(),
            400.0,
        );

        for expected in ["1.056", "O 1.055", "H 1.062", "L 1.049", "65.0%", "50%", "25%"] {
            assert!(surface.has_text(expected), "missing {expected}");
        }
        assert_eq!(dotted_lines(&surface), 0);
        assert_eq!(surface.ops.first(), Some(&Op::Save));
        assert_eq!(surface.ops.last(), Some(&Op::Restore));
    }

    #[test]
    fn same_input_same_frame() {
        let status = Status::Ready(eurusd());
        let config = RenderConfig::default();

        let a = draw(&status, &config, Overlay::default(), 400.0);
        let b = draw(&status, &config, Overlay::default(), 400.0);

        assert_eq!(a.ops, b.ops);
    }

    #[test]
    fn disabled_layers_are_skipped() {
        let mut config = RenderConfig::default();
        config.features.percentage_ladder = false;
        config.features.range_badge = false;

        let surface = draw(&Status::Ready(eurusd()), &config, Overlay::default(), 400.0);

        assert!(!surface.has_text("25%"));
        assert!(!surface.has_text("65.0%"));
        assert!(surface.has_text("H 1.062"));
    }

    #[test]
    fn progressive_side_gets_reference_line() {
        let status = Status::Ready(MarketSnapshot {
            high: 1.0660,
            ..eurusd()
        });
        let surface = draw(&status, &RenderConfig::default(), Overlay::default(), 400.0);

        assert!(surface.has_text("75%"));
        assert_eq!(dotted_lines(&surface), 1);
    }

    #[test]
    fn reference_line_hidden_when_too_close() {
        let status = Status::Ready(MarketSnapshot {
            high: 1.0660,
            ..eurusd()
        });
        let mut config = RenderConfig::default();
        config.layout.padding = 0.0;

        let surface = draw(&status, &config, Overlay::default(), 10.0);

        assert_eq!(dotted_lines(&surface), 0);
    }

    #[test]
    fn empty_surface_paints_error() {
        let mut surface = Recorder::new(0.0, 0.0);
        let status = Status::Ready(eurusd());
        let config = RenderConfig::default();
        let scale_config = scale::Config::default();
        let view = View {
            status: &status,
            config: &config,
            scale_config: &scale_config,
            overlay: Overlay::default(),
        };

        render(&mut surface, &view, Layers::Data);

        assert_eq!(surface.texts(), vec!["Render error: surface has no area"]);
    }

    #[test]
    fn selected_marker_and_hover_preview() {
        let config = RenderConfig::default();
        let mut book = MarkerBook::new(DisplayId::new());
        let pip = PriceStep::from_f64(0.0001).unwrap();
        let first = book.place(1.0600, pip, MarkerKind::Big).marker().id;
        book.place(1.0500, pip, MarkerKind::Small);

        let overlay = Overlay {
            markers: Some(&book),
            selected: Some(first),
            hover_price: Some(1.0525),
            ..Overlay::default()
        };
        let surface = draw(&Status::Ready(eurusd()), &config, overlay, 400.0);

        let lines = surface.lines();
        let selected: Color = config.palette.marker_selected.into();
        let hover: Color = config.palette.hover.into();

        assert!(lines.iter().any(|(_, _, l)| l.color == selected && l.width == 3.0));
        assert!(lines.iter().any(|(_, _, l)| l.color == hover && l.dash == Some(DASHED)));
        assert!(surface.has_text("1.06"));
        assert!(surface.has_text("1.0525"));
    }

    #[test]
    fn measurement_readout() {
        let mut measurement = DeltaMeasurement::begin(1.0500, 0.0);
        measurement.update(1.0605);

        let overlay = Overlay {
            measurement: Some(&measurement),
            ..Overlay::default()
        };
        let surface = draw(
            &Status::Ready(eurusd()),
            &RenderConfig::default(),
            overlay,
            400.0,
        );

        assert!(surface.has_text("+1.00%  +105.0 pips"));
        assert!(surface.has_text("1.0605"));
    }

    #[test]
    fn zero_adr_paints_without_percentages() {
        let status = Status::Ready(MarketSnapshot {
            adr_high: 1.0450,
            adr_low: 1.0450,
            ..eurusd()
        });
        let surface = draw(&status, &RenderConfig::default(), Overlay::default(), 400.0);

        assert!(!surface.lines().is_empty());
        for expected in ["1.056", "O 1.055", "H 1.062", "L 1.049"] {
            assert!(surface.has_text(expected), "missing {expected}");
        }
        assert!(!surface.has_text("Render error"));
        assert!(
            surface.texts().iter().all(|t| !t.contains('%')),
            "unexpected percentage in {:?}",
            surface.texts()
        );
    }

    #[test]
    fn overlay_pass_skips_data_layers() {
        let mut surface = Recorder::new(320.0, 400.0);
        let status = Status::Ready(eurusd());
        let config = RenderConfig::default();
        let scale_config = scale::Config::default();
        let view = View {
            status: &status,
            config: &config,
            scale_config: &scale_config,
            overlay: Overlay::default(),
        };

        render(&mut surface, &view, Layers::Overlay);

        assert_eq!(surface.ops, vec![Op::Save, Op::Restore]);
    }

    #[test]
    fn menu_marks_current_kind() {
        let mut book = MarkerBook::new(DisplayId::new());
        let pip = PriceStep::from_f64(0.0001).unwrap();
        let id = book.place(1.0550, pip, MarkerKind::Big).marker().id;
        let menu = ContextMenu::new(
            id,
            MarkerKind::Big,
            Point::new(20.0, 40.0),
            Size::new(320.0, 400.0),
        );

        let overlay = Overlay {
            markers: Some(&book),
            menu: Some(&menu),
            ..Overlay::default()
        };
        let surface = draw(
            &Status::Ready(eurusd()),
            &RenderConfig::default(),
            overlay,
            400.0,
        );

        assert!(surface.has_text("* Big"));
        assert!(surface.has_text("  Delete"));
    }
}
