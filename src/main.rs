use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clutprobe::cli::Args;
use clutprobe::{probe, render};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    eprint!("Reading color map from terminal, please wait... ");
    let clut = probe::probe(&args.probe_options())
        .context("could not read the terminal palette")?;
    eprint!("\r\x1b[K");

    let mut out = io::stdout().lock();
    if args.colors.is_empty() {
        render::hex_colors(&mut out, &clut)?;
        if !args.no_colormap {
            render::colormap(&mut out, &clut)?;
        }
        render::theme_comparison(&mut out, &clut)?;
    } else {
        for &rgb in &args.colors {
            render::best_match(&mut out, rgb, &clut)?;
        }
    }
    out.flush()?;
    Ok(())
}
