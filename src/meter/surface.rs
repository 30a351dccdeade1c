//! Raster target the meter paints onto.

use iced::widget::canvas::{self, Frame, LineDash, Path, Stroke};
use iced::{Alignment, Color, Font, Point, Size};

pub const DASHED: &[f32] = &[4.0, 3.0];
pub const DOTTED: &[f32] = &[1.0, 3.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub width: f32,
    pub color: Color,
    pub dash: Option<&'static [f32]>,
}

impl Line {
    pub fn solid(width: f32, color: Color) -> Self {
        Self {
            width,
            color,
            dash: None,
        }
    }

    pub fn dashed(width: f32, color: Color, pattern: &'static [f32]) -> Self {
        Self {
            width,
            color,
            dash: Some(pattern),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub content: String,
    pub position: Point,
    pub color: Color,
    pub size: f32,
    pub font: Font,
    pub align_x: Alignment,
    pub align_y: Alignment,
}

pub trait Surface {
    /// Logical size of the drawable area
    fn size(&self) -> Size;

    fn device_pixel_ratio(&self) -> f32;

    fn fill_rect(&mut self, top_left: Point, size: Size, color: Color);

    fn stroke_line(&mut self, from: Point, to: Point, line: Line);

    fn fill_text(&mut self, label: Label);

    fn save(&mut self);

    fn restore(&mut self);
}

/// [`Surface`] over an iced canvas frame.
pub struct FrameSurface<'a> {
    frame: &'a mut Frame,
    dpr: f32,
}

impl<'a> FrameSurface<'a> {
    pub fn new(frame: &'a mut Frame, dpr: f32) -> Self {
        Self { frame, dpr }
    }
}

impl Surface for FrameSurface<'_> {
    fn size(&self) -> Size {
        self.frame.size()
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.dpr
    }

    fn fill_rect(&mut self, top_left: Point, size: Size, color: Color) {
        self.frame.fill_rectangle(top_left, size, color);
    }

    fn stroke_line(&mut self, from: Point, to: Point, line: Line) {
        self.frame.stroke(
            &Path::line(from, to),
            Stroke {
                width: line.width,
                style: canvas::Style::Solid(line.color),
                line_dash: LineDash {
                    segments: line.dash.unwrap_or_default(),
                    offset: 0,
                },
                ..Default::default()
            },
        );
    }

    fn fill_text(&mut self, label: Label) {
        self.frame.fill_text(canvas::Text {
            content: label.content,
            position: label.position,
            color: label.color,
            size: label.size.into(),
            font: label.font,
            align_x: label.align_x.into(),
            align_y: label.align_y.into(),
            ..canvas::Text::default()
        });
    }

    fn save(&mut self) {
        self.frame.push_transform();
    }

    fn restore(&mut self) {
        self.frame.pop_transform();
    }
}

#[cfg(test)]
pub use recorder::{Op, Recorder};
