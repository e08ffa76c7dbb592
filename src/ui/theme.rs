use ratatui::style::Color;

use crate::app::config::{Config, Palette};
use crate::wheel::Rgba;

pub fn parse_color(hex: &str) -> Color {
    if hex.starts_with('#') && hex.len() == 7 {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&hex[1..3], 16),
            u8::from_str_radix(&hex[3..5], 16),
            u8::from_str_radix(&hex[5..7], 16),
        ) {
            return Color::Rgb(r, g, b);
        }
    }
    Color::White
}

pub fn to_rgba(color: Color) -> Rgba {
    match color {
        Color::Rgb(r, g, b) => Rgba::rgb(r, g, b),
        Color::White => Rgba::WHITE,
        _ => Rgba::BLACK,
    }
}

pub fn to_color(rgba: Rgba) -> Color {
    Color::Rgb(rgba.r, rgba.g, rgba.b)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeChoice {
    System,
    Dark,
    Light,
}

impl ThemeChoice {
    pub fn key(&self) -> &'static str {
        match self {
            ThemeChoice::System => "system",
            ThemeChoice::Dark => "dark",
            ThemeChoice::Light => "light",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "system" => Some(ThemeChoice::System),
            "dark" => Some(ThemeChoice::Dark),
            "light" => Some(ThemeChoice::Light),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            ThemeChoice::System => ThemeChoice::Dark,
            ThemeChoice::Dark => ThemeChoice::Light,
            ThemeChoice::Light => ThemeChoice::System,
        }
    }

    /// Whether the light palette applies. `colorfgbg` is the terminal's
    /// `COLORFGBG` value, used when following the system.
    pub fn is_light(&self, colorfgbg: Option<&str>) -> bool {
        match self {
            ThemeChoice::Light => true,
            ThemeChoice::Dark => false,
            ThemeChoice::System => colorfgbg.is_some_and(terminal_background_is_light),
        }
    }
}

// COLORFGBG looks like "15;0" or "0;default;15"; the last field is the
// background palette index.
fn terminal_background_is_light(value: &str) -> bool {
    matches!(
        value.rsplit(';').next().map(str::trim),
        Some("7") | Some("15")
    )
}

/// Theme helper that provides colors from the config
pub struct Theme {
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub accent: Color,
    pub accent_2: Color,
    pub danger: Color,
    pub light: bool,
}

impl Theme {
    pub fn from_config(config: &Config, choice: ThemeChoice) -> Self {
        let colorfgbg = std::env::var("COLORFGBG").ok();
        let light = choice.is_light(colorfgbg.as_deref());
        let palette = if light {
            &config.theme.light
        } else {
            &config.theme.dark
        };
        Self::from_palette(palette, light)
    }

    pub fn from_palette(palette: &Palette, light: bool) -> Self {
        Self {
            background: parse_color(&palette.background),
            foreground: parse_color(&palette.foreground),
            muted: parse_color(&palette.muted),
            accent: parse_color(&palette.accent),
            accent_2: parse_color(&palette.accent_2),
            danger: parse_color(&palette.danger),
            light,
        }
    }
}
