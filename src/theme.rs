//! Guessing the terminal's color theme from its base colors.
//!
//! Each catalog theme is described by where its 16 base colors land in the
//! color cube. The live base colors are quantized the same way and the theme
//! with the most positions in common wins.

use crate::clut::Clut;
use crate::cube::{self, BASE_COLORS};

/// A theme must match strictly more than this many base colors to be named.
pub const MIN_SCORE_EXCLUSIVE: u8 = 8;

/// A named reference palette, as palette indices (16..=231) of the cube cells
/// its base colors quantize to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub cube: [u8; BASE_COLORS],
}

/// Known themes, in tie-break order.
pub const CATALOG: [Theme; 5] = [
    Theme {
        name: "Solarized",
        cube: [
            23, 166, 100, 136, 32, 168, 36, 145, 59, 166, 60, 66, 102, 62, 109, 231,
        ],
    },
    Theme {
        name: "Tango",
        cube: [
            16, 160, 64, 178, 61, 96, 30, 188, 59, 196, 113, 221, 74, 139, 80, 231,
        ],
    },
    Theme {
        name: "XTerm",
        cube: [
            16, 160, 40, 184, 20, 164, 44, 188, 102, 196, 46, 226, 63, 201, 51, 231,
        ],
    },
    Theme {
        name: "CGA colors",
        cube: [
            16, 124, 34, 130, 19, 127, 37, 145, 59, 203, 83, 227, 63, 207, 87, 231,
        ],
    },
    Theme {
        name: "Pastel",
        cube: [
            59, 59, 72, 180, 110, 175, 116, 188, 66, 181, 79, 223, 111, 212, 116, 231,
        ],
    },
];

/// A recognized theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeGuess {
    pub name: &'static str,
    /// Number of base colors that matched, out of 16.
    pub score: u8,
    /// `score / 16`.
    pub confidence: f32,
}

impl Theme {
    /// Number of positions where `observed` lands on this theme's cube cell.
    pub fn score(&self, observed: &[u8; BASE_COLORS]) -> u8 {
        self.cube
            .iter()
            .zip(observed)
            .filter(|(expected, seen)| expected == seen)
            .count() as u8
    }
}

/// The cube cells the live base colors quantize to.
pub fn observed_cube(clut: &Clut) -> [u8; BASE_COLORS] {
    let mut out = [0u8; BASE_COLORS];
    for (slot, &rgb) in out.iter_mut().zip(clut.base()) {
        *slot = cube::quantize(rgb);
    }
    out
}

/// Every catalog theme with its score, best first. Equal scores keep catalog
/// order.
pub fn rank(clut: &Clut) -> Vec<(&'static str, u8)> {
    let observed = observed_cube(clut);
    let mut scores: Vec<_> = CATALOG
        .iter()
        .map(|theme| (theme.name, theme.score(&observed)))
        .collect();
    scores.sort_by(|a, b| b.1.cmp(&a.1));
    scores
}

/// The best matching catalog theme, if more than half of the base colors
/// match it. Ties go to the theme declared first in [`CATALOG`].
pub fn guess_theme(clut: &Clut) -> Option<ThemeGuess> {
    let (name, score) = rank(clut).into_iter().next()?;
    (score > MIN_SCORE_EXCLUSIVE).then(|| ThemeGuess {
        name,
        score,
        confidence: f32::from(score) / BASE_COLORS as f32,
    })
}
