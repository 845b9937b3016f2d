pub mod cli;
pub mod clut;
pub mod color;
pub mod cube;
pub mod error;
pub mod probe;
pub mod render;
pub mod theme;

pub use clut::Clut;
pub use color::Rgb;
pub use error::ProbeError;
pub use probe::{probe, ProbeOptions};
pub use theme::{guess_theme, ThemeGuess};
