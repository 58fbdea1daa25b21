//! Color constants for the TUI.

use ratatui::style::Color;

use crate::sim::event_log::Severity;
use crate::sim::state::Light;

/// Header bar foreground.
pub const HEADER_FG: Color = Color::White;
/// Header bar background.
pub const HEADER_BG: Color = Color::DarkGray;
/// Footer help text color.
pub const FOOTER_FG: Color = Color::DarkGray;
/// Countdown text color.
pub const COUNTDOWN: Color = Color::Cyan;
/// Generator meter gauge color.
pub const METER: Color = Color::Magenta;

/// Status light color: green live, amber in transition, red dead.
pub fn light_color(light: Light) -> Color {
    match light {
        Light::On => Color::Green,
        Light::Standby => Color::Yellow,
        Light::Off => Color::Red,
    }
}

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Gray,
        Severity::Success => Color::Green,
        Severity::Error => Color::Red,
    }
}
