//! Green-to-red gradient for the elapsed-time display.
//!
//! Elapsed time is mapped onto a linear blend between a green anchor ("on
//! time") and a red anchor ("overdue/slow"). Interpolation happens per HSL
//! channel; conversion to RGB only exists so ratatui can render the result.

use ratatui::style::Color;

/// A color in hue/saturation/lightness form. Hue is in degrees, saturation
/// and lightness are fractions in [0,1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

/// Anchor for a fully "good" (weight 1.0) elapsed time.
pub const GREEN_ANCHOR: Hsl = Hsl {
    hue: 100.0,
    saturation: 0.91,
    lightness: 0.45,
};

/// Anchor for a fully "bad" (weight 0.0) elapsed time.
pub const RED_ANCHOR: Hsl = Hsl {
    hue: 5.0,
    saturation: 0.91,
    lightness: 0.45,
};

/// Elapsed time at or beyond this range renders fully red. Five days.
pub const COLOR_RANGE_MS: i64 = 1000 * 60 * 60 * 24 * 5;

/// Linear blend between the red and green anchors.
///
/// `weight_for_green` of 1.0 yields the green anchor, 0.0 the red anchor.
/// No clamping is performed here: out-of-range weights extrapolate rather
/// than error, so callers clamp first. Pure and deterministic.
pub fn green_red_blend(weight_for_green: f64) -> Hsl {
    let w = weight_for_green;
    Hsl {
        hue: GREEN_ANCHOR.hue * w + RED_ANCHOR.hue * (1.0 - w),
        saturation: GREEN_ANCHOR.saturation * w + RED_ANCHOR.saturation * (1.0 - w),
        lightness: GREEN_ANCHOR.lightness * w + RED_ANCHOR.lightness * (1.0 - w),
    }
}

/// Gradient color for an elapsed duration, clamped to the 5-day range.
pub fn elapsed_color(elapsed_ms: i64) -> Color {
    let weight = (1.0 - elapsed_ms as f64 / COLOR_RANGE_MS as f64).clamp(0.0, 1.0);
    green_red_blend(weight).to_color()
}

impl Hsl {
    /// CSS-style string, `hsl(H,S%,L%)`.
    pub fn css_string(&self) -> String {
        format!(
            "hsl({},{}%,{}%)",
            self.hue,
            self.saturation * 100.0,
            self.lightness * 100.0
        )
    }

    /// Convert to a terminal RGB color.
    pub fn to_color(&self) -> Color {
        let (r, g, b) = hsl_to_rgb(self.hue, self.saturation, self.lightness);
        Color::Rgb(r, g, b)
    }
}

/// Standard HSL to RGB conversion. Hue wraps modulo 360; saturation and
/// lightness are expected in [0,1].
fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (u8, u8, u8) {
    let h = hue.rem_euclid(360.0);
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = lightness - c / 2.0;

    let (r1, g1, b1) = match h as u32 {
        0..=59 => (c, x, 0.0),
        60..=119 => (x, c, 0.0),
        120..=179 => (0.0, c, x),
        180..=239 => (0.0, x, c),
        240..=299 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (
        ((r1 + m) * 255.0).round() as u8,
        ((g1 + m) * 255.0).round() as u8,
        ((b1 + m) * 255.0).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_hits_anchors_at_extremes() {
        assert_eq!(green_red_blend(1.0), GREEN_ANCHOR);
        assert_eq!(green_red_blend(0.0), RED_ANCHOR);
    }

    #[test]
    fn blend_is_monotonic_in_weight() {
        let mut last_hue = RED_ANCHOR.hue;
        for i in 1..=10 {
            let hsl = green_red_blend(i as f64 / 10.0);
            assert!(hsl.hue > last_hue);
            assert!(hsl.hue >= RED_ANCHOR.hue && hsl.hue <= GREEN_ANCHOR.hue);
            last_hue = hsl.hue;
        }
        // Saturation and lightness are equal at both anchors, so they stay flat.
        let mid = green_red_blend(0.5);
        assert!((mid.saturation - 0.91).abs() < 1e-9);
        assert!((mid.lightness - 0.45).abs() < 1e-9);
    }

    #[test]
    fn css_string_shape() {
        assert_eq!(GREEN_ANCHOR.css_string(), "hsl(100,91%,45%)");
        assert_eq!(RED_ANCHOR.css_string(), "hsl(5,91%,45%)");
    }

    #[test]
    fn anchors_convert_to_sensible_rgb() {
        if let Color::Rgb(r, g, _) = GREEN_ANCHOR.to_color() {
            assert!(g > r);
        } else {
            panic!("expected rgb color");
        }
        if let Color::Rgb(r, g, _) = RED_ANCHOR.to_color() {
            assert!(r > g);
        } else {
            panic!("expected rgb color");
        }
    }

    #[test]
    fn elapsed_color_clamps_range() {
        // Far beyond the range must not extrapolate past the red anchor.
        assert_eq!(elapsed_color(COLOR_RANGE_MS * 10), RED_ANCHOR.to_color());
        assert_eq!(elapsed_color(0), GREEN_ANCHOR.to_color());
    }
}
