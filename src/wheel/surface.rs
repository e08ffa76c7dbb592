use colorsys::{Hsl, Rgb};
use unicode_width::UnicodeWidthStr;

/// Average glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Hue in degrees, saturation and lightness in percent.
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let rgb = Rgb::from(&Hsl::new(hue, saturation, lightness, None));
        Self::rgb(
            channel(rgb.red()),
            channel(rgb.green()),
            channel(rgb.blue()),
        )
    }

    /// Composite `top` at `alpha` opacity over this color.
    pub fn overlay(self, top: Rgba, alpha: f64) -> Self {
        let alpha = alpha.clamp(0.0, 1.0);
        let mix = |below: u8, above: u8| {
            channel(below as f64 * (1.0 - alpha) + above as f64 * alpha)
        };
        Self {
            r: mix(self.r, top.r),
            g: mix(self.g, top.g),
            b: mix(self.b, top.b),
            a: self.a,
        }
    }

    /// Flatten a translucent color onto an opaque background.
    pub fn flatten(self, background: Rgba) -> Self {
        Self {
            a: 1.0,
            ..background.overlay(self, self.a)
        }
    }
}

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Angular wedge from the wheel center, angles in radians (clockwise, y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub start: f64,
    pub end: f64,
    pub radius: f64,
}

/// A fitted label positioned in wheel-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub lines: Vec<String>,
    pub x: f64,
    pub y: f64,
    /// Baseline rotation in radians.
    pub angle: f64,
    pub font_size: f64,
    pub line_height: f64,
    pub color: Rgba,
}

/// Drawing target a wheel is bound to. Coordinates are relative to the wheel
/// center, with y growing downwards.
pub trait Surface {
    /// Side length of the square drawing area.
    fn size(&self) -> f64;
    fn clear(&mut self);
    fn fill_sector(&mut self, sector: Sector, color: Rgba);
    fn stroke_sector(&mut self, sector: Sector, color: Rgba, width: f64);
    fn fill_circle(&mut self, radius: f64, color: Rgba);
    fn measure_text(&self, text: &str, font_size: f64) -> f64;
    fn draw_text(&mut self, text: PlacedText);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillSector { sector: Sector, color: Rgba },
    StrokeSector { sector: Sector, color: Rgba, width: f64 },
    FillCircle { radius: f64, color: Rgba },
    Text(PlacedText),
}

/// Surface that records the commands of the latest render so a terminal
/// widget can replay them.
#[derive(Debug, Clone)]
pub struct DisplayList {
    size: f64,
    commands: Vec<DrawCommand>,
    renders: u64,
}

impl DisplayList {
    pub fn new(size: f64) -> Self {
        Self {
            size,
            commands: Vec::new(),
            renders: 0,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of times the surface has been cleared for a fresh render.
    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn texts(&self) -> impl Iterator<Item = &PlacedText> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text(text) => Some(text),
            _ => None,
        })
    }
}

impl Surface for DisplayList {
    fn size(&self) -> f64 {
        self.size
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.renders += 1;
    }

    fn fill_sector(&mut self, sector: Sector, color: Rgba) {
        self.commands.push(DrawCommand::FillSector { sector, color });
    }

    fn stroke_sector(&mut self, sector: Sector, color: Rgba, width: f64) {
        self.commands
            .push(DrawCommand::StrokeSector { sector, color, width });
    }

    fn fill_circle(&mut self, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::FillCircle { radius, color });
    }

    fn measure_text(&self, text: &str, font_size: f64) -> f64 {
        text.width() as f64 * font_size * GLYPH_ADVANCE
    }

    fn draw_text(&mut self, text: PlacedText) {
        self.commands.push(DrawCommand::Text(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsl_primary_colors() {
        assert_eq!(Rgba::from_hsl(0.0, 100.0, 50.0), Rgba::rgb(255, 0, 0));
        assert_eq!(Rgba::from_hsl(120.0, 100.0, 50.0), Rgba::rgb(0, 255, 0));
        assert_eq!(Rgba::from_hsl(0.0, 0.0, 100.0), Rgba::WHITE);
    }

    #[test]
    fn overlay_blends_towards_top_color() {
        let base = Rgba::rgb(100, 0, 200);
        assert_eq!(base.overlay(Rgba::WHITE, 0.0), base);
        assert_eq!(base.overlay(Rgba::WHITE, 1.0), Rgba::WHITE);
        assert_eq!(base.overlay(Rgba::WHITE, 0.5), Rgba::rgb(178, 128, 228));
    }

    #[test]
    fn flatten_uses_own_alpha() {
        let shade = Rgba::rgba(0, 0, 0, 0.5);
        assert_eq!(shade.flatten(Rgba::rgb(200, 100, 50)), Rgba::rgb(100, 50, 25));
    }

    #[test]
    fn display_list_measures_display_columns() {
        let list = DisplayList::new(400.0);
        assert!((list.measure_text("abcd", 10.0) - 24.0).abs() < 1e-9);
        // wide glyphs take two columns
        assert!((list.measure_text("名", 10.0) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn clear_starts_a_new_render() {
        let mut list = DisplayList::new(100.0);
        list.fill_circle(5.0, Rgba::WHITE);
        list.clear();
        assert!(list.commands().is_empty());
        assert_eq!(list.renders(), 1);
    }
}
