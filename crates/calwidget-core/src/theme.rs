//! Light and dark palettes.
//!
//! A [`Theme`] selects one of the two fixed [`ThemePalette`]s. The active
//! theme is owned by whoever drives rendering and passed down explicitly.

use std::fmt::Write as _;

/// Calendar color identifiers the service documents.
pub const KNOWN_COLOR_IDS: [&str; 11] = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11"];

/// Which palette is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    pub fn palette(self) -> &'static ThemePalette {
        match self {
            Self::Light => &LIGHT,
            Self::Dark => &DARK,
        }
    }
}

/// Literal colors for the event color identifiers that have no palette role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSwatches {
    pub purple: &'static str,
    pub orange: &'static str,
    pub cyan: &'static str,
    pub brown: &'static str,
    pub blue_grey: &'static str,
    pub light_green: &'static str,
    pub teal: &'static str,
}

/// A named set of display colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub primary: &'static str,
    pub danger: &'static str,
    pub warning: &'static str,
    pub success: &'static str,
    /// Card background.
    pub surface: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    /// Window background and separators.
    pub background: &'static str,
    pub swatches: EventSwatches,
}

pub const LIGHT: ThemePalette = ThemePalette {
    primary: "#4285F4",
    danger: "#EA4335",
    warning: "#FBBC05",
    success: "#34A853",
    surface: "#FFFFFF",
    text: "#3C4043",
    text_secondary: "#5F6368",
    background: "#F1F3F4",
    swatches: EventSwatches {
        purple: "#9C27B0",
        orange: "#FF5722",
        cyan: "#00BCD4",
        brown: "#795548",
        blue_grey: "#607D8B",
        light_green: "#8BC34A",
        teal: "#009688",
    },
};

pub const DARK: ThemePalette = ThemePalette {
    primary: "#8AB4F8",
    danger: "#F28B82",
    warning: "#FDD663",
    success: "#81C995",
    surface: "#2D2E30",
    text: "#E8EAED",
    text_secondary: "#9AA0A6",
    background: "#202124",
    swatches: EventSwatches {
        purple: "#CE93D8",
        orange: "#FFAB91",
        cyan: "#80DEEA",
        brown: "#BCAAA4",
        blue_grey: "#B0BEC5",
        light_green: "#C5E1A5",
        teal: "#80CBC4",
    },
};

impl ThemePalette {
    /// Maps a calendar color identifier to a display color.
    ///
    /// Unknown identifiers get `primary`.
    pub fn event_color(&self, color_id: &str) -> &'static str {
        match color_id {
            "1" => self.primary,
            "2" => self.success,
            "3" => self.danger,
            "4" => self.swatches.purple,
            "5" => self.swatches.orange,
            "6" => self.swatches.cyan,
            "7" => self.swatches.brown,
            "8" => self.swatches.blue_grey,
            "9" => self.warning,
            "10" => self.swatches.light_green,
            "11" => self.swatches.teal,
            _ => self.primary,
        }
    }
}

/// CSS class carrying the color of `color_id`.
pub fn event_color_class(color_id: &str) -> String {
    if KNOWN_COLOR_IDS.contains(&color_id) {
        format!("event-color-{color_id}")
    } else {
        "event-color-default".to_string()
    }
}

/// Renders the GTK stylesheet for `palette`.
pub fn stylesheet(palette: &ThemePalette) -> String {
    let mut css = format!(
        "window.agenda-window {{ background-color: {bg}; }}\n\
         .agenda-card {{ background-color: {surface}; padding: 10px; margin: 6px; }}\n\
         .agenda-title {{ color: {primary}; font-weight: bold; font-size: 12pt; }}\n\
         .agenda-icon-glyph {{ color: {primary}; font-size: 14pt; }}\n\
         .agenda-count, .agenda-dark-label, .agenda-close {{ color: {text}; }}\n\
         .agenda-separator {{ background-color: {bg}; min-height: 1px; }}\n\
         .day-header {{ color: {secondary}; font-weight: bold; font-size: 10pt; }}\n\
         .event-title {{ color: {text}; font-size: 10pt; }}\n\
         .event-time {{ color: {secondary}; font-size: 9pt; }}\n\
         .agenda-placeholder {{ color: {text}; }}\n\
         .agenda-error {{ color: {danger}; }}\n\
         .event-color {{ min-width: 4px; }}\n",
        bg = palette.background,
        surface = palette.surface,
        primary = palette.primary,
        text = palette.text,
        secondary = palette.text_secondary,
        danger = palette.danger,
    );

    for id in KNOWN_COLOR_IDS {
        let _ = writeln!(
            css,
            ".event-color-{id} {{ background-color: {}; }}",
            palette.event_color(id)
        );
    }
    let _ = writeln!(
        css,
        ".event-color-default {{ background-color: {}; }}",
        palette.primary
    );

    css
}
