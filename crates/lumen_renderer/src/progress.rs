//! Scanline progress display.
//!
//! The renderer reports through a `ProgressReporter` trait object, so the
//! terminal handling is decided once by the caller and never inside the
//! render loop.

use std::io::{self, IsTerminal, Stderr, Write};
use std::sync::{Mutex, PoisonError};

/// Receives progress updates from a render.
///
/// `line` is called from worker threads, once per finished scanline, with the
/// number of scanlines still outstanding. `done` is called exactly once after
/// every worker has joined.
pub trait ProgressReporter: Send + Sync {
    /// A render of `total` scanlines is starting.
    fn start(&self, total: u32);

    /// A scanline finished; `remaining` are left.
    fn line(&self, remaining: u32);

    /// The render finished.
    fn done(&self);
}

/// Pick a reporter for stderr: ANSI when it is a terminal, plain otherwise.
pub fn detect() -> Box<dyn ProgressReporter> {
    if io::stderr().is_terminal() {
        Box::new(AnsiProgress::new())
    } else {
        Box::new(PlainProgress::new())
    }
}

/// Carriage-return based progress, safe for any output.
pub struct PlainProgress<W = Stderr> {
    out: Mutex<W>,
}

impl PlainProgress<Stderr> {
    pub fn new() -> Self {
        Self::with_writer(io::stderr())
    }
}

impl Default for PlainProgress<Stderr> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> PlainProgress<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        // Progress output is best effort
        let _ = out.write_all(text.as_bytes()).and_then(|_| out.flush());
    }
}

impl<W: Write + Send> ProgressReporter for PlainProgress<W> {
    fn start(&self, total: u32) {
        self.emit(&format!("\rScanlines remaining: {} ", total));
    }

    fn line(&self, remaining: u32) {
        self.emit(&format!("\rScanlines remaining: {} ", remaining));
    }

    fn done(&self) {
        // Pad over the longest counter line
        self.emit("\rDone.                 \n");
    }
}

/// Progress using VT escapes to rewrite only the counter.
pub struct AnsiProgress<W = Stderr> {
    out: Mutex<W>,
}

/// Column where the counter starts, right after "Scanlines remaining: ".
const COUNTER_COLUMN: usize = 22;

impl AnsiProgress<Stderr> {
    pub fn new() -> Self {
        Self::with_writer(io::stderr())
    }
}

impl Default for AnsiProgress<Stderr> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> AnsiProgress<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = out.write_all(text.as_bytes()).and_then(|_| out.flush());
    }
}

impl<W: Write + Send> ProgressReporter for AnsiProgress<W> {
    fn start(&self, total: u32) {
        self.emit(&format!("\r\x1b[0KScanlines remaining: {}", total));
    }

    fn line(&self, remaining: u32) {
        // Move to the counter column and clear the old number
        self.emit(&format!("\x1b[{}G\x1b[0K{}", COUNTER_COLUMN, remaining));
    }

    fn done(&self) {
        self.emit("\r\x1b[0KDone.\n");
    }
}

/// Reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn start(&self, _total: u32) {}
    fn line(&self, _remaining: u32) {}
    fn done(&self) {}
}
