use std::str::FromStr;

use anyhow::{bail, Result};
use palette::{IntoColor, Lab, Srgb};

/// Per-channel weights of the lightness classifier. Higher values push a
/// channel's perceived brightness up.
const LUM_R: f32 = 0.55;
const LUM_G: f32 = 0.80;
const LUM_B: f32 = 0.30;

/// An 8-bit sRGB triple. No alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn grey(level: u8) -> Self {
        Self::new(level, level, level)
    }

    /// Parse a hex color string like `#ff8800` or `FF8800`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            bail!("invalid hex color {hex:?}: expected 6 hex digits");
        }
        let r = u8::from_str_radix(&digits[0..2], 16)?;
        let g = u8::from_str_radix(&digits[2..4], 16)?;
        let b = u8::from_str_radix(&digits[4..6], 16)?;
        Ok(Self { r, g, b })
    }

    /// Serialize to lowercase hex `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_srgb_u8(self) -> Srgb<u8> {
        Srgb::new(self.r, self.g, self.b)
    }

    /// Convert to CIELAB for perceptual distance comparisons.
    pub fn to_lab(self) -> Lab {
        let srgb_f32: Srgb<f32> = self.to_srgb_u8().into_format();
        srgb_f32.into_color()
    }

    /// Squared CIELAB distance (ΔE² in the CIE76 sense).
    pub fn distance_sq(self, other: Rgb) -> f32 {
        let a = self.to_lab();
        let b = other.to_lab();
        (a.l - b.l).powi(2) + (a.a - b.a).powi(2) + (a.b - b.b).powi(2)
    }

    /// Whether dark ink reads better than light ink on this background.
    ///
    /// Takes the root of the normalized sum of squared, weighted channels and
    /// compares it against 0.5.
    pub fn is_light(self) -> bool {
        let weighted = [
            LUM_R * f32::from(self.r),
            LUM_G * f32::from(self.g),
            LUM_B * f32::from(self.b),
        ];
        let sum: f32 = weighted.iter().map(|x| x * x).sum();
        (sum / 65536.0).sqrt() > 0.5
    }

    /// Linear variant of the lightness weighting, in [0, ~1.1].
    ///
    /// Kept for calibrating the weights; [`Rgb::is_light`] is what callers use.
    pub fn linear_lightness(self) -> f32 {
        (LUM_R * f32::from(self.r) + LUM_G * f32::from(self.g) + LUM_B * f32::from(self.b))
            / 384.0
    }

    /// ITU-R BT.709 luma, truncated to 8 bits.
    pub fn luma(self) -> u8 {
        let y =
            0.2126 * f32::from(self.r) + 0.7152 * f32::from(self.g) + 0.0722 * f32::from(self.b);
        y as u8
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
