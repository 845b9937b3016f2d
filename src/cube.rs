//! The fixed layout of the xterm 256-color palette and the static
//! 6x6x6 color cube quantizer.
//!
//! Index layout:
//! - `0..=15`: the 16 base colors (theme dependent)
//! - `16..=231`: the color cube, `16 + 36*r + 6*g + b` with `r, g, b` in `0..6`
//! - `232..=255`: a 24-step greyscale ramp, excluding black and white

use crate::color::Rgb;

/// Number of theme-dependent base colors at the start of the palette.
pub const BASE_COLORS: usize = 16;
/// Palette index of cube coordinate (0, 0, 0), which is also cube black.
pub const CUBE_START: u8 = 16;
/// Palette index of cube coordinate (5, 5, 5), cube white.
pub const CUBE_END: u8 = 231;
/// First index of the greyscale ramp.
pub const GREY_START: u8 = 232;
/// Number of cells in the cube.
pub const CUBE_SIZE: usize = 216;

/// Channel intensities of the six cube levels.
pub const CUBE_LEVELS: [u8; 6] = [0x00, 0x5f, 0x87, 0xaf, 0xd7, 0xff];

/// Midpoints between consecutive cube levels. A channel's cube coordinate is
/// the number of snap points strictly below it.
pub const SNAPS: [u8; 5] = snap_points();

const fn snap_points() -> [u8; 5] {
    let mut out = [0u8; 5];
    let mut i = 0;
    while i < out.len() {
        out[i] = ((CUBE_LEVELS[i] as u16 + CUBE_LEVELS[i + 1] as u16) / 2) as u8;
        i += 1;
    }
    out
}

/// Stock xterm values of the 16 base colors (X11 rgb.txt / XTerm-col.ad).
pub const XTERM_BASE: [Rgb; 16] = [
    Rgb::new(0, 0, 0),
    Rgb::new(205, 0, 0),
    Rgb::new(0, 205, 0),
    Rgb::new(205, 205, 0),
    Rgb::new(0, 0, 238),
    Rgb::new(205, 0, 205),
    Rgb::new(0, 205, 205),
    Rgb::new(229, 229, 229),
    Rgb::new(127, 127, 127),
    Rgb::new(255, 0, 0),
    Rgb::new(0, 255, 0),
    Rgb::new(255, 255, 0),
    Rgb::new(92, 92, 255),
    Rgb::new(255, 0, 255),
    Rgb::new(0, 255, 255),
    Rgb::new(255, 255, 255),
];

/// Every grey the palette can show in order of brightness: cube black, the
/// 24-step ramp, then cube white.
const ANSI_GREYS: [u8; 26] = [
    16, 232, 233, 234, 235, 236, 237, 238, 239, 240, 241, 242, 243, 244, 245, 246, 247, 248, 249,
    250, 251, 252, 253, 254, 255, 231,
];

/// Cube coordinate (0..=5) of one 8-bit channel.
pub fn quantize_channel(value: u8) -> u8 {
    SNAPS.iter().filter(|&&snap| snap < value).count() as u8
}

/// Palette index (16..=231) of the cube cell an RGB color snaps to.
///
/// Each channel is rounded to its nearest cube level independently. This is
/// not a nearest-color search in any color space: it is piecewise linear per
/// channel, deterministic and needs no luminance weighting. Use
/// [`crate::clut::Clut::nearest`] when the terminal's actual colors matter.
pub fn quantize(rgb: Rgb) -> u8 {
    let [r, g, b] = rgb.channels().map(quantize_channel);
    CUBE_START + r * 36 + g * 6 + b
}

/// Default RGB of a cube cell given as an offset (0..=215) from [`CUBE_START`].
///
/// This is what the cell looks like on an unmodified xterm; the terminal may
/// show something else.
pub fn cube_to_rgb(offset: u8) -> Rgb {
    debug_assert!(usize::from(offset) < CUBE_SIZE, "cube offset {offset} out of range");
    let level = |coord: u8| CUBE_LEVELS[usize::from(coord % 6)];
    Rgb::new(level(offset / 36), level(offset / 6), level(offset))
}

/// Default xterm RGB for any palette index.
pub fn index_to_rgb(index: u8) -> Rgb {
    match index {
        0..=15 => XTERM_BASE[usize::from(index)],
        CUBE_START..=CUBE_END => cube_to_rgb(index - CUBE_START),
        _ => Rgb::grey(8 + 10 * (index - GREY_START)),
    }
}

/// Map an 8-bit grey to one of the palette's greys.
///
/// `levels` is how many distinct greys to use, clamped to `2..=26`; with 26
/// every grey is available, with 2 only cube black and cube white.
pub fn grey_to_ansi(grey: u8, levels: u8) -> u8 {
    let max = ANSI_GREYS.len();
    let levels = usize::from(levels).clamp(2, max);
    let scaled = usize::from(grey) * levels / 256;
    if levels == max {
        return ANSI_GREYS[scaled];
    }
    ANSI_GREYS[scaled * (max - 1) / (levels - 1)]
}
