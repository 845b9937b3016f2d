//! Printing palettes and results as colored swatches.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{
    Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};

use crate::clut::Clut;
use crate::color::Rgb;
use crate::cube::{self, BASE_COLORS, CUBE_START, GREY_START};
use crate::theme::{self, ThemeGuess};

/// Cube black, used as ink on light backgrounds.
const INK_DARK: u8 = cube::CUBE_START;
/// Cube white, used as ink on dark backgrounds.
const INK_LIGHT: u8 = cube::CUBE_END;

const LINE_WIDTH: usize = 80;

/// Palette index of the ink that reads best on `background`.
pub fn ink(background: Rgb) -> u8 {
    if background.is_light() {
        INK_DARK
    } else {
        INK_LIGHT
    }
}

/// A swatch of palette entry `index` labelled `label`, centered in `width`.
fn swatch(w: &mut impl Write, index: u8, label: &str, fg: u8, width: usize) -> io::Result<()> {
    queue!(
        w,
        SetForegroundColor(Color::AnsiValue(fg)),
        SetBackgroundColor(Color::AnsiValue(index)),
        Print(format!("{label:^width$}")),
        ResetColor
    )
}

fn index_swatch(w: &mut impl Write, clut: &Clut, index: u8, width: usize) -> io::Result<()> {
    swatch(w, index, &index.to_string(), ink(clut[index]), width)
}

fn centered(w: &mut impl Write, text: &str) -> io::Result<()> {
    writeln!(w, "{text:^LINE_WIDTH$}")
}

/// The 16 base colors with their live hex values, followed by the theme guess.
pub fn hex_colors(w: &mut impl Write, clut: &Clut) -> io::Result<()> {
    writeln!(w)?;
    centered(w, "-:| Your terminal's color scheme |:-")?;
    for (colors, start) in clut.base().chunks(8).zip([0u8, 8]) {
        write!(w, "    ")?;
        for (offset, &rgb) in colors.iter().enumerate() {
            swatch(w, start + offset as u8, &rgb.to_hex(), ink(rgb), 9)?;
        }
        writeln!(w)?;
    }
    writeln!(w)?;
    theme_guess(w, theme::guess_theme(clut).as_ref())
}

pub fn theme_guess(w: &mut impl Write, guess: Option<&ThemeGuess>) -> io::Result<()> {
    let line = match guess {
        Some(guess) => format!(
            "My best guess for this theme is: {} ({:.0}% confidence)",
            guess.name,
            guess.confidence * 100.0
        ),
        None => "I don't recognise the color theme you're using.".to_string(),
    };
    centered(w, &line)?;
    writeln!(w)
}

/// All 256 entries: base colors, the cube in three 6-wide groups, then the
/// greyscale ramp.
pub fn colormap(w: &mut impl Write, clut: &Clut) -> io::Result<()> {
    for index in 0..BASE_COLORS as u8 {
        index_swatch(w, clut, index, 9)?;
        if index % 8 == 7 {
            writeln!(w)?;
        }
    }
    for row in 0..12u8 {
        for group in [0u8, 72, 144] {
            for col in 0..6u8 {
                index_swatch(w, clut, CUBE_START + group + row * 6 + col, 4)?;
            }
        }
        writeln!(w)?;
    }
    for index in GREY_START..=u8::MAX {
        index_swatch(w, clut, index, 6)?;
        if (index - GREY_START) % 12 == 11 {
            writeln!(w)?;
        }
    }
    writeln!(w)
}

/// The live base colors (top row) next to the cube cells they quantize to
/// (bottom row).
pub fn theme_comparison(w: &mut impl Write, clut: &Clut) -> io::Result<()> {
    centered(
        w,
        "Matching your color scheme (top row) to the color cube (bottom row):",
    )?;
    for index in 0..BASE_COLORS as u8 {
        index_swatch(w, clut, index, 5)?;
    }
    writeln!(w)?;
    for cell in theme::observed_cube(clut) {
        index_swatch(w, clut, cell, 5)?;
    }
    writeln!(w)?;
    writeln!(w)
}

/// The cube cell for `rgb`, and the closest entry the terminal actually shows.
pub fn best_match(w: &mut impl Write, rgb: Rgb, clut: &Clut) -> io::Result<()> {
    let cell = cube::quantize(rgb);
    queue!(
        w,
        Print("The best match for the color "),
        SetAttribute(Attribute::Bold),
        Print(rgb.to_hex()),
        SetAttribute(Attribute::NormalIntensity),
        Print(" is ")
    )?;
    index_swatch(w, clut, cell, 5)?;

    let live = clut.nearest(rgb);
    write!(w, "  (closest live entry: ")?;
    index_swatch(w, clut, live, 5)?;
    writeln!(w, " {})", clut[live].to_hex())
}
