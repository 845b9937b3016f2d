//! Reading the terminal's live palette.
//!
//! One OSC 4 query goes out per palette index, followed by a device status
//! report request. Terminals that ignore OSC 4 still answer the status report,
//! which marks the end of the batch.

pub mod parser;
pub mod reader;

use std::fmt::Write as _;
use std::io::{self, BufReader, IsTerminal, Read, Write};
use std::time::Duration;

use crossterm::terminal;
use tracing::{debug, warn};

use crate::clut::{Clut, PALETTE_SIZE};
use crate::error::{ProbeError, Result};

use parser::{Reply, ReplyParser};
use reader::InputPump;

/// How long to wait for the next reply byte before giving up.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Quiet period that ends the drain of late replies after an early stop.
const SETTLE: Duration = Duration::from_millis(50);

const STATUS_REPORT_QUERY: &str = "\x1b[5n";

/// Probe settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Idle timeout between reply bytes. `None` blocks until the terminal
    /// answers the status report.
    pub timeout: Option<Duration>,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

/// Why reading replies stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The terminal answered the closing status report.
    StatusReport,
    /// The terminal sent an escape sequence other than a color report.
    Unexpected(String),
    /// Nothing arrived within the idle timeout.
    TimedOut,
    /// The input stream closed.
    EndOfInput,
    /// Reading the input stream failed.
    ReadError(String),
}

/// Outcome of one probe.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub clut: Clut,
    /// Number of color reports written into the table, repeats included.
    pub reported: usize,
    /// Which indices were reported at least once.
    pub seen: [bool; PALETTE_SIZE],
    /// Reasons for every color report that was dropped.
    pub discarded: Vec<&'static str>,
    pub termination: Termination,
}

impl ProbeReport {
    /// Number of distinct indices the terminal reported.
    pub fn answered(&self) -> usize {
        self.seen.iter().filter(|&&seen| seen).count()
    }

    /// Whether the terminal answered every index.
    pub fn is_complete(&self) -> bool {
        self.answered() == PALETTE_SIZE && self.discarded.is_empty()
    }

    /// Emit log records describing the probe.
    ///
    /// Call this only once the terminal has left raw mode.
    pub fn log(&self) {
        for reason in &self.discarded {
            warn!(reason, "ignored malformed color report");
        }
        match &self.termination {
            Termination::StatusReport | Termination::EndOfInput => {}
            Termination::Unexpected(tail) => {
                warn!("got {tail:?}, expecting \"]4\"; palette probe stopped early");
            }
            Termination::TimedOut => warn!("terminal stopped replying; palette probe timed out"),
            Termination::ReadError(err) => warn!(error = %err, "palette probe read failed"),
        }
        debug!(
            reported = self.reported,
            discarded = self.discarded.len(),
            termination = ?self.termination,
            "palette probe finished"
        );
    }
}

/// The full query batch: one color query per index, then the status report
/// request.
pub fn query_batch() -> String {
    let mut out = String::with_capacity(PALETTE_SIZE * 12 + STATUS_REPORT_QUERY.len());
    for index in 0..PALETTE_SIZE {
        let _ = write!(out, "\x1b]4;{index};?\x07");
    }
    out.push_str(STATUS_REPORT_QUERY);
    out
}

/// Consume replies until the parser finishes or input stops, filling a fresh
/// table with every well-formed color report.
pub fn read_replies<R: Read>(input: R) -> ProbeReport {
    let mut parser = ReplyParser::new();
    let mut clut = Clut::new();
    let mut reported = 0;
    let mut seen = [false; PALETTE_SIZE];
    let mut discarded = Vec::new();

    let mut termination = Termination::EndOfInput;
    for byte in BufReader::new(input).bytes() {
        let byte = match byte {
            Ok(byte) => byte,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                termination = Termination::TimedOut;
                break;
            }
            Err(e) => {
                termination = Termination::ReadError(e.to_string());
                break;
            }
        };
        match parser.advance(byte) {
            None => {}
            Some(Reply::Color { index, rgb }) => {
                clut.set(index, rgb);
                seen[usize::from(index)] = true;
                reported += 1;
            }
            Some(Reply::Discarded(reason)) => discarded.push(reason),
            Some(Reply::StatusReport) => {
                termination = Termination::StatusReport;
                break;
            }
            Some(Reply::Unexpected(tail)) => {
                termination = Termination::Unexpected(tail.escape_ascii().to_string());
                break;
            }
        }
    }

    ProbeReport {
        clut,
        reported,
        seen,
        discarded,
        termination,
    }
}

/// One query/reply round trip over an arbitrary reader and writer.
pub struct ProbeSession<R, W> {
    input: R,
    output: W,
}

impl<R: Read, W: Write> ProbeSession<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn run(&mut self) -> Result<ProbeReport> {
        self.output.write_all(query_batch().as_bytes())?;
        self.output.flush()?;
        Ok(read_replies(&mut self.input))
    }

    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }
}

/// Switches a terminal between raw and cooked input.
pub trait TerminalMode {
    fn is_raw(&self) -> io::Result<bool>;
    fn set_raw(&self, raw: bool) -> io::Result<()>;
}

/// The controlling terminal, through crossterm.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crossterm;

impl TerminalMode for Crossterm {
    fn is_raw(&self) -> io::Result<bool> {
        terminal::is_raw_mode_enabled()
    }

    fn set_raw(&self, raw: bool) -> io::Result<()> {
        if raw {
            terminal::enable_raw_mode()
        } else {
            terminal::disable_raw_mode()
        }
    }
}

/// Keeps the terminal in raw mode while alive.
///
/// Raw mode is turned off again on drop, including during unwinding, unless
/// it was already on when the guard was taken.
pub struct RawModeGuard<M: TerminalMode = Crossterm> {
    mode: M,
    restore: bool,
}

impl RawModeGuard {
    pub fn acquire() -> Result<Self> {
        if !io::stdin().is_terminal() {
            return Err(ProbeError::NotATerminal);
        }
        Self::acquire_with(Crossterm)
    }
}

impl<M: TerminalMode> RawModeGuard<M> {
    pub fn acquire_with(mode: M) -> Result<Self> {
        let was_raw = mode.is_raw().map_err(ProbeError::RawMode)?;
        if !was_raw {
            mode.set_raw(true).map_err(ProbeError::RawMode)?;
        }
        Ok(Self {
            mode,
            restore: !was_raw,
        })
    }
}

impl<M: TerminalMode> Drop for RawModeGuard<M> {
    fn drop(&mut self) {
        if self.restore {
            let _ = self.mode.set_raw(false);
        }
    }
}

/// Probe the controlling terminal and report what came back.
///
/// Queries go to stderr so stdout stays free for results; replies are read
/// from stdin. Input left over from an early stop is drained before the
/// terminal leaves raw mode, so it never reaches the shell.
pub fn probe_report(options: &ProbeOptions) -> Result<ProbeReport> {
    let (report, stale, leftover) = {
        let _raw = RawModeGuard::acquire()?;
        let pump = InputPump::stdin();
        let stale = pump.discard_pending();
        let mut session = ProbeSession::new(pump.reader(options.timeout), io::stderr());
        let report = session.run()?;
        let settle = match report.termination {
            Termination::StatusReport => Duration::ZERO,
            _ => SETTLE,
        };
        let (mut input, _) = session.into_parts();
        let leftover = input.drain(settle);
        (report, stale, leftover)
    };
    debug!(stale, leftover, "discarded input around palette probe");
    report.log();
    Ok(report)
}

/// Probe the controlling terminal for its live palette.
///
/// Entries the terminal did not report stay black. Only a missing terminal,
/// failing to enter raw mode or failing to send the queries is an error.
pub fn probe(options: &ProbeOptions) -> Result<Clut> {
    probe_report(options).map(|report| report.clut)
}
