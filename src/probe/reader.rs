use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread;
use std::time::Duration;

type Chunk = io::Result<Vec<u8>>;

/// A background thread that pulls chunks off a blocking reader and queues
/// them, so callers can wait for input with a deadline.
///
/// One pump serves every session on its source. Each session borrows the
/// queue through a [`TimeoutReader`] and gives it back on drop, so a later
/// session sees the bytes that arrive after it starts.
pub struct InputPump {
    rx: Mutex<Receiver<Chunk>>,
}

impl InputPump {
    pub fn spawn<R>(mut inner: R) -> Self
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = [0u8; 512];
            loop {
                let msg = match inner.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => Ok(buf[..n].to_vec()),
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => Err(e),
                };
                let failed = msg.is_err();
                if tx.send(msg).is_err() || failed {
                    break;
                }
            }
        });
        Self { rx: Mutex::new(rx) }
    }

    /// The process-wide pump over stdin, started on first use.
    pub fn stdin() -> &'static InputPump {
        static STDIN: OnceLock<InputPump> = OnceLock::new();
        STDIN.get_or_init(|| InputPump::spawn(io::stdin()))
    }

    /// Borrow the queue for one session. `timeout` of `None` waits forever.
    pub fn reader(&self, timeout: Option<Duration>) -> TimeoutReader<'_> {
        TimeoutReader {
            rx: self.rx.lock().unwrap_or_else(PoisonError::into_inner),
            pending: Vec::new(),
            pos: 0,
            timeout,
        }
    }

    /// Throw away whatever is already queued, returning the byte count.
    pub fn discard_pending(&self) -> usize {
        self.reader(None).drain(Duration::ZERO)
    }
}

/// A reader over an [`InputPump`] that gives up when no input arrives within
/// its timeout, with an [`io::ErrorKind::TimedOut`] error.
pub struct TimeoutReader<'a> {
    rx: MutexGuard<'a, Receiver<Chunk>>,
    pending: Vec<u8>,
    pos: usize,
    timeout: Option<Duration>,
}

impl TimeoutReader<'_> {
    fn refill(&mut self) -> io::Result<bool> {
        let msg = match self.timeout {
            Some(timeout) => match self.rx.recv_timeout(timeout) {
                Ok(msg) => msg,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("no reply within {}ms", timeout.as_millis()),
                    ));
                }
                Err(RecvTimeoutError::Disconnected) => return Ok(false),
            },
            None => match self.rx.recv() {
                Ok(msg) => msg,
                Err(_) => return Ok(false),
            },
        };
        self.pending = msg?;
        self.pos = 0;
        Ok(true)
    }

    /// Discard buffered input and anything arriving until the source has been
    /// quiet for `settle`. Returns the number of bytes thrown away.
    pub fn drain(&mut self, settle: Duration) -> usize {
        let mut dropped = self.pending.len() - self.pos;
        self.pending.clear();
        self.pos = 0;
        loop {
            let msg = if settle.is_zero() {
                match self.rx.try_recv() {
                    Ok(msg) => msg,
                    Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
                }
            } else {
                match self.rx.recv_timeout(settle) {
                    Ok(msg) => msg,
                    Err(_) => break,
                }
            };
            match msg {
                Ok(chunk) => dropped += chunk.len(),
                Err(_) => break,
            }
        }
        dropped
    }
}

impl Read for TimeoutReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pos >= self.pending.len() {
            if !self.refill()? {
                return Ok(0);
            }
        }
        let n = buf.len().min(self.pending.len() - self.pos);
        buf[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
