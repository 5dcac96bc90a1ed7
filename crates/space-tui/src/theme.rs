//! Color palette and style constants for the Safe Space TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Color palette ─────────────────────────────────────────────────────────────

/// Default page background (no image selected).
pub const C_BG: Color = Color::Rgb(24, 38, 64);
/// Background tint while an image backdrop is applied.
pub const C_BG_IMAGE: Color = Color::Rgb(22, 44, 40);
pub const C_ACCENT: Color = Color::Rgb(255, 170, 120);
pub const C_PLAYING: Color = Color::Rgb(80, 200, 120);
pub const C_ERROR: Color = Color::Rgb(255, 95, 95);
pub const C_MUTED: Color = Color::Rgb(96, 110, 140);
pub const C_SECONDARY: Color = Color::Rgb(150, 165, 190);
pub const C_PRIMARY: Color = Color::Rgb(225, 230, 240);
pub const C_SELECTION_BG: Color = Color::Rgb(44, 62, 96);
pub const C_PANEL_BORDER: Color = Color::Rgb(56, 72, 104);
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb(140, 180, 240);
pub const C_NUMBER_HINT: Color = Color::Rgb(110, 125, 160);
pub const C_FILTER_BG: Color = Color::Rgb(30, 46, 76);
pub const C_FILTER_FG: Color = Color::Rgb(255, 210, 120);
pub const C_FAVORITE: Color = Color::Rgb(255, 120, 160);
pub const C_CIRCLE: Color = Color::Rgb(120, 200, 220);
pub const C_TOAST_INFO: Color = Color::Rgb(80, 160, 220);
pub const C_TOAST_SUCCESS: Color = Color::Rgb(80, 200, 120);
pub const C_TOAST_WARNING: Color = Color::Rgb(255, 184, 80);
pub const C_TOAST_ERROR: Color = Color::Rgb(255, 95, 95);

// ── Predefined styles ─────────────────────────────────────────────────────────

pub fn style_default() -> Style {
    Style::default().fg(C_PRIMARY)
}

pub fn style_secondary() -> Style {
    Style::default().fg(C_SECONDARY)
}

pub fn style_playing() -> Style {
    Style::default().fg(C_PLAYING)
}

pub fn style_error() -> Style {
    Style::default().fg(C_ERROR)
}

pub fn style_selected() -> Style {
    Style::default()
        .bg(C_SELECTION_BG)
        .fg(C_PRIMARY)
        .add_modifier(Modifier::BOLD)
}

pub fn style_focused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER_FOCUSED)
}

pub fn style_unfocused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER)
}

pub fn style_muted() -> Style {
    Style::default().fg(C_MUTED)
}
