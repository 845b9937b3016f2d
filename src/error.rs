use std::io;

use thiserror::Error;

/// Failures that stop a palette probe before it can start.
///
/// Problems with the terminal's replies are not errors; they end the probe
/// early and show up as a [`crate::probe::Termination`].
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("stdin is not a terminal")]
    NotATerminal,

    #[error("failed to switch the terminal to raw mode: {0}")]
    RawMode(#[source] io::Error),

    #[error("failed to send palette queries: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ProbeError>;
