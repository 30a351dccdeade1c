use iced::widget::{button, container};
use iced::{Border, Color, Font, Theme};

pub const MONO: Font = Font::MONOSPACE;

pub const TOOLBAR_TEXT_SIZE: f32 = 12.0;

pub fn toolbar(theme: &Theme) -> container::Style {
    let palette = theme.extended_palette();

    container::Style {
        background: Some(palette.background.weak.color.into()),
        border: Border {
            width: 1.0,
            color: palette.background.strong.color,
            ..Border::default()
        },
        ..Default::default()
    }
}

/// Flat toolbar button that stays highlighted while `active`.
pub fn toggle_button(theme: &Theme, status: button::Status, active: bool) -> button::Style {
    let palette = theme.extended_palette();

    let background = match (active, status) {
        (true, _) => palette.primary.weak.color,
        (false, button::Status::Hovered) => palette.background.strong.color,
        (false, _) => Color::TRANSPARENT,
    };

    button::Style {
        background: Some(background.into()),
        text_color: palette.background.base.text,
        border: Border {
            radius: 3.0.into(),
            ..Border::default()
        },
        ..Default::default()
    }
}
