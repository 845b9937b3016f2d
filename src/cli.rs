use std::time::Duration;

use clap::Parser;

use crate::color::Rgb;
use crate::probe::ProbeOptions;

/// Read the terminal's 256-color palette, match colors against it and guess
/// the color theme in use.
#[derive(Parser, Debug)]
#[command(name = "clutprobe", version, about)]
pub struct Args {
    /// Colors to match against the color cube, as `#rrggbb`. Without any, the
    /// live palette and a theme guess are printed instead.
    #[arg(value_name = "HEXCOLOR")]
    pub colors: Vec<Rgb>,

    /// Give up on the terminal after this many milliseconds without a reply
    /// (0 waits forever)
    #[arg(long, env = "CLUTPROBE_TIMEOUT_MS", default_value_t = 500)]
    pub timeout_ms: u64,

    /// Skip the full 256-color map when printing the live palette
    #[arg(long)]
    pub no_colormap: bool,
}

impl Args {
    pub fn probe_options(&self) -> ProbeOptions {
        ProbeOptions {
            timeout: (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms)),
        }
    }
}
