use std::ops::Index;

use crate::color::Rgb;
use crate::cube::{self, BASE_COLORS};

/// Number of entries in the indexed palette.
pub const PALETTE_SIZE: usize = 256;

/// Color lookup table: what RGB the terminal actually shows for each of its
/// 256 palette indices.
///
/// Starts out all black. Only the probe writes to it, and only at an index the
/// terminal named in its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clut {
    entries: [Rgb; PALETTE_SIZE],
}

impl Clut {
    /// A table with every entry black.
    pub fn new() -> Self {
        Self {
            entries: [Rgb::BLACK; PALETTE_SIZE],
        }
    }

    /// The table of an unmodified xterm.
    pub fn xterm_default() -> Self {
        let mut clut = Self::new();
        for (index, entry) in clut.entries.iter_mut().enumerate() {
            *entry = cube::index_to_rgb(index as u8);
        }
        clut
    }

    pub fn get(&self, index: u8) -> Rgb {
        self.entries[usize::from(index)]
    }

    pub(crate) fn set(&mut self, index: u8, rgb: Rgb) {
        self.entries[usize::from(index)] = rgb;
    }

    /// The 16 theme-dependent base colors.
    pub fn base(&self) -> &[Rgb] {
        &self.entries[..BASE_COLORS]
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, Rgb)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, &rgb)| (index as u8, rgb))
    }

    /// Index of the entry the terminal shows closest to `rgb`, by CIELAB
    /// distance. Ties go to the lower index.
    pub fn nearest(&self, rgb: Rgb) -> u8 {
        let mut best = (0u8, f32::INFINITY);
        for (index, entry) in self.iter() {
            let d = entry.distance_sq(rgb);
            if d < best.1 {
                best = (index, d);
            }
        }
        best.0
    }
}

impl Default for Clut {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<u8> for Clut {
    type Output = Rgb;

    fn index(&self, index: u8) -> &Rgb {
        &self.entries[usize::from(index)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_table_is_black() {
        let clut = Clut::new();
        assert!(clut.iter().all(|(_, rgb)| rgb == Rgb::BLACK));
        assert_eq!(clut.iter().count(), PALETTE_SIZE);
    }

    #[test]
    fn set_and_get() {
        let mut clut = Clut::new();
        clut.set(200, Rgb::new(1, 2, 3));
        assert_eq!(clut.get(200), Rgb::new(1, 2, 3));
        assert_eq!(clut[200], Rgb::new(1, 2, 3));
        assert_eq!(clut.get(199), Rgb::BLACK);
    }

    #[test]
    fn xterm_default_regions() {
        let clut = Clut::xterm_default();
        assert_eq!(clut.base().len(), 16);
        assert_eq!(clut[9], Rgb::new(255, 0, 0));
        assert_eq!(clut[196], Rgb::new(255, 0, 0));
        assert_eq!(clut[244], Rgb::grey(128));
    }

    #[test]
    fn nearest_prefers_exact_match() {
        let clut = Clut::xterm_default();
        // 9 and 196 are both pure red; the lower index wins
        assert_eq!(clut.nearest(Rgb::new(255, 0, 0)), 9);
        assert_eq!(clut.nearest(Rgb::new(0x5f, 0x87, 0xaf)), 67);
        assert_eq!(clut.nearest(Rgb::grey(130)), 244);
    }

    #[test]
    fn nearest_on_black_table_is_zero() {
        assert_eq!(Clut::new().nearest(Rgb::WHITE), 0);
    }
}
