use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Color palette handling
// ---------------------------------------------------------------------------

/// Parse a `#rrggbb` hex string.
pub fn parse_hex(hex: &str) -> Option<RGBColor> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some(RGBColor(r, g, b))
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<RGBColor> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            RGBColor(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Derive a same-hue (data, fit) colour pair from a base colour: the data
/// line at lightness 0.3, the fit line at lightness 0.7 with boosted
/// saturation.
pub fn contrast_pair(base: RGBColor) -> (RGBColor, RGBColor) {
    let srgb = Srgb::new(
        base.0 as f32 / 255.0,
        base.1 as f32 / 255.0,
        base.2 as f32 / 255.0,
    );
    let hsl: Hsl = srgb.into_color();

    let to_rgb = |h: Hsl| {
        let rgb: Srgb = h.into_color();
        RGBColor(
            (rgb.red * 255.0) as u8,
            (rgb.green * 255.0) as u8,
            (rgb.blue * 255.0) as u8,
        )
    };

    let data = to_rgb(Hsl::new(hsl.hue, hsl.saturation, 0.3));
    let fit = to_rgb(Hsl::new(hsl.hue, (hsl.saturation * 1.5).min(1.0), 0.7));
    (data, fit)
}

// ---------------------------------------------------------------------------
// Cycling base colours across series
// ---------------------------------------------------------------------------

/// Endless cycle over the configured base colours, one per plotted series.
pub struct ColorCycle {
    colors: Vec<RGBColor>,
    next: usize,
}

impl ColorCycle {
    /// Build a cycle from configured hex strings; invalid entries are
    /// dropped and an empty result falls back to a generated palette.
    pub fn new(hex_colors: &[String]) -> Self {
        let mut colors: Vec<RGBColor> = hex_colors.iter().filter_map(|h| parse_hex(h)).collect();
        if colors.is_empty() {
            colors = generate_palette(10);
        }
        ColorCycle { colors, next: 0 }
    }

    /// The next base colour, wrapping around.
    pub fn next_color(&mut self) -> RGBColor {
        let color = self.colors[self.next % self.colors.len()];
        self.next += 1;
        color
    }
}
