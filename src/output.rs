// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Outputs
//!
//! The destinations a sink writes its formatted records to.  A record arrives as one complete byte
//! buffer and is handed to the destination in a single `write_all`, so readers never observe half a
//! record.
//!
//! ## In-memory capture
//!
//! [`MemoryOutput`] captures records in memory instead of writing them to a process stream.  It can
//! stand in for stdout or stderr via [`Options::capture`](crate::Options::capture), which makes it the
//! tool of choice for:
//!
//! - Unit testing code that logs through sinkwise
//! - Examining log output programmatically
//! - Capturing console output where the process streams are redirected or unavailable
//!
//! The file sink cannot be captured: it always writes to its allocated log file.

use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, Write};
use std::sync::Arc;

#[derive(Debug)]
pub(crate) enum Output {
    File(File),
    Stdout,
    Stderr,
    Memory(MemoryOutput),
}

impl Output {
    /// Writes one complete record.
    pub(crate) fn write_record(&mut self, record: &[u8]) -> io::Result<()> {
        match self {
            Output::File(file) => file.write_all(record),
            Output::Stdout => {
                let mut lock = io::stdout().lock();
                lock.write_all(record)?;
                lock.flush()
            }
            Output::Stderr => io::stderr().lock().write_all(record),
            Output::Memory(memory) => {
                memory.append(record);
                Ok(())
            }
        }
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::File(file) => file.sync_data(),
            Output::Stdout => io::stdout().lock().flush(),
            Output::Stderr => io::stderr().lock().flush(),
            Output::Memory(_) => Ok(()),
        }
    }
}

/// A shared in-memory byte buffer that receives formatted records.
///
/// Clones share the same buffer: keep one clone to read from and hand another to
/// [`Options::capture`](crate::Options::capture).
///
/// # Example
///
/// ```rust
/// use sinkwise::{Decorations, Engine, MemoryOutput, Options, Severity, SinkKind};
///
/// let capture = MemoryOutput::new();
/// let mut options = Options::new();
/// options
///     .set_option(SinkKind::Stdout, Severity::Info, Decorations::NONE)?
///     .capture(SinkKind::Stdout, capture.clone())?;
///
/// let engine = Engine::new();
/// engine.create(Some(&options))?;
/// engine.emit(Severity::Info, file!(), line!(), "main", format_args!("hello {}", 42));
///
/// let logs = capture.drain();
/// assert!(logs.contains("hello 42"));
/// # Ok::<(), sinkwise::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryOutput {
    bytes: Arc<Mutex<Vec<u8>>>,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug: derived, required by Output
// - Clone: derived, and deliberately shallow; a capture is only useful if the
//   reader and the sink see the same buffer
// - Default: derived, an empty buffer
// - PartialEq/Eq/Hash: NOT implemented - contents change under the reader
// - Display: NOT implemented - use contents() or drain()

impl MemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    fn append(&self, record: &[u8]) {
        self.bytes.lock().extend_from_slice(record);
    }

    /// Everything captured so far, leaving the buffer intact.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    /// Everything captured so far, clearing the buffer.
    pub fn drain(&self) -> String {
        let bytes = std::mem::take(&mut *self.bytes.lock());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Captured text split into lines, without line terminators.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.lock().is_empty()
    }
}
