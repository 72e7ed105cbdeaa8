// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine configuration.
//!
//! [`Options`] is built before an engine starts and handed to
//! [`Engine::create`](crate::Engine::create).  The caller owns it; dropping it frees it.  While an engine
//! started from a given `Options` is running, every setter on that `Options` is rejected with
//! [`UsageError::OptionsFrozen`]: configuration cannot change under a running engine.  Once the engine
//! is destroyed the same value may be edited and reused.
//!
//! ```
//! use sinkwise::{Decorations, Options, Severity, SinkKind};
//!
//! let mut options = Options::new();
//! options
//!     .set_option(SinkKind::File, Severity::MAX, Decorations::ALL)?
//!     .set_option(SinkKind::Stderr, Severity::Error, Decorations::TIMESTAMP)?;
//! assert!(options.get(SinkKind::Stdout).is_none());
//! # Ok::<(), sinkwise::UsageError>(())
//! ```

use crate::error::UsageError;
use crate::format::{DEFAULT_CAPACITY, MIN_CAPACITY};
use crate::level::Severity;
use crate::output::MemoryOutput;
use crate::sink::{Decorations, SinkConfig, SinkKind};
use crate::symbolizer::{StdSymbolizer, Symbolizer};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct Options {
    sinks: [Option<SinkConfig>; 3],
    captures: [Option<MemoryOutput>; 3],
    directory: PathBuf,
    buffer_capacity: usize,
    symbolizer: Arc<dyn Symbolizer>,
    /// Running flags of the engines this value started.  Stopped ones are pruned on the next bind.
    started: Mutex<Vec<Arc<AtomicBool>>>,
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl Options {
    /// Options with no sink set.  An engine created from them writes nowhere until sinks are set.
    pub fn new() -> Self {
        Self {
            sinks: [None, None, None],
            captures: [None, None, None],
            directory: PathBuf::from("."),
            buffer_capacity: DEFAULT_CAPACITY,
            symbolizer: Arc::new(StdSymbolizer),
            started: Mutex::new(Vec::new()),
        }
    }

    /**
    The configuration an engine uses when created without options: the file sink only, at maximum
    verbosity, with timestamp and thread id.
    */
    pub fn standard() -> Self {
        let mut options = Self::new();
        options.sinks[SinkKind::File.index()] =
            Some(SinkConfig::new(Severity::MAX, Decorations::ALL));
        options
    }

    /// Enables the sink of `kind` with the given threshold and decorations, replacing earlier settings.
    pub fn set_option(
        &mut self,
        kind: SinkKind,
        threshold: Severity,
        decorations: Decorations,
    ) -> Result<&mut Self, UsageError> {
        self.ensure_editable()?;
        self.sinks[kind.index()] = Some(SinkConfig::new(threshold, decorations));
        Ok(self)
    }

    /// Disables the sink of `kind`.
    pub fn unset_option(&mut self, kind: SinkKind) -> Result<&mut Self, UsageError> {
        self.ensure_editable()?;
        self.sinks[kind.index()] = None;
        Ok(self)
    }

    /**
    Sends what the stdout or stderr sink writes to `capture` instead of the process stream.

    The file sink always writes to its allocated file; capturing it is a usage error.
    */
    pub fn capture(
        &mut self,
        kind: SinkKind,
        capture: MemoryOutput,
    ) -> Result<&mut Self, UsageError> {
        self.ensure_editable()?;
        if kind == SinkKind::File {
            return Err(UsageError::FileNotRedirectable);
        }
        self.captures[kind.index()] = Some(capture);
        Ok(self)
    }

    /// Directory the file sink's log file is created in.  Defaults to the working directory.
    pub fn with_directory(&mut self, directory: impl AsRef<Path>) -> Result<&mut Self, UsageError> {
        self.ensure_editable()?;
        self.directory = directory.as_ref().to_path_buf();
        Ok(self)
    }

    /// Capacity of the format buffer, which bounds the size of one rendered record.
    pub fn with_buffer_capacity(&mut self, capacity: usize) -> Result<&mut Self, UsageError> {
        self.ensure_editable()?;
        if capacity < MIN_CAPACITY {
            return Err(UsageError::CapacityTooSmall {
                requested: capacity,
                minimum: MIN_CAPACITY,
            });
        }
        self.buffer_capacity = capacity;
        Ok(self)
    }

    /// Source of the frames appended to fatal records.
    pub fn with_symbolizer(
        &mut self,
        symbolizer: Arc<dyn Symbolizer>,
    ) -> Result<&mut Self, UsageError> {
        self.ensure_editable()?;
        self.symbolizer = symbolizer;
        Ok(self)
    }

    pub fn get(&self, kind: SinkKind) -> Option<SinkConfig> {
        self.sinks[kind.index()]
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    /// Whether any engine started from these options is still running.
    pub fn is_frozen(&self) -> bool {
        self.started
            .lock()
            .iter()
            .any(|running| running.load(Ordering::Acquire))
    }

    pub(crate) fn captured(&self, kind: SinkKind) -> Option<&MemoryOutput> {
        self.captures[kind.index()].as_ref()
    }

    pub(crate) fn symbolizer(&self) -> Arc<dyn Symbolizer> {
        self.symbolizer.clone()
    }

    /// Ties these options to the running flag of an engine they just started.
    pub(crate) fn bind(&self, running: Arc<AtomicBool>) {
        let mut started = self.started.lock();
        started.retain(|flag| flag.load(Ordering::Acquire));
        if !started.iter().any(|flag| Arc::ptr_eq(flag, &running)) {
            started.push(running);
        }
    }

    fn ensure_editable(&self) -> Result<(), UsageError> {
        if self.is_frozen() {
            Err(UsageError::OptionsFrozen)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_nothing() {
        let options = Options::new();
        for kind in SinkKind::DISPATCH_ORDER {
            assert_eq!(options.get(kind), None);
        }
        assert_eq!(options.buffer_capacity(), DEFAULT_CAPACITY);
        assert_eq!(options.directory(), Path::new("."));
    }

    #[test]
    fn standard_is_verbose_decorated_file() {
        let options = Options::standard();
        assert_eq!(
            options.get(SinkKind::File),
            Some(SinkConfig::new(Severity::Debug, Decorations::ALL))
        );
        assert_eq!(options.get(SinkKind::Stdout), None);
        assert_eq!(options.get(SinkKind::Stderr), None);
    }

    #[test]
    fn set_and_unset() {
        let mut options = Options::new();
        options
            .set_option(SinkKind::Stderr, Severity::Error, Decorations::NONE)
            .unwrap()
            .set_option(SinkKind::Stderr, Severity::Warning, Decorations::THREAD_ID)
            .unwrap();
        assert_eq!(
            options.get(SinkKind::Stderr),
            Some(SinkConfig::new(Severity::Warning, Decorations::THREAD_ID))
        );
        options.unset_option(SinkKind::Stderr).unwrap();
        assert_eq!(options.get(SinkKind::Stderr), None);
    }

    #[test]
    fn file_sink_cannot_be_captured() {
        let mut options = Options::new();
        assert_eq!(
            options
                .capture(SinkKind::File, MemoryOutput::new())
                .unwrap_err(),
            UsageError::FileNotRedirectable
        );
        assert!(options.capture(SinkKind::Stdout, MemoryOutput::new()).is_ok());
        assert!(options.captured(SinkKind::Stdout).is_some());
    }

    #[test]
    fn tiny_buffer_is_rejected() {
        let mut options = Options::new();
        assert_eq!(
            options.with_buffer_capacity(8).unwrap_err(),
            UsageError::CapacityTooSmall {
                requested: 8,
                minimum: MIN_CAPACITY
            }
        );
        options.with_buffer_capacity(MIN_CAPACITY).unwrap();
        assert_eq!(options.buffer_capacity(), MIN_CAPACITY);
    }

    #[test]
    fn frozen_follows_running_flag() {
        let mut options = Options::new();
        let running = Arc::new(AtomicBool::new(true));
        options.bind(running.clone());
        assert!(options.is_frozen());
        assert_eq!(
            options
                .set_option(SinkKind::Stdout, Severity::Info, Decorations::NONE)
                .unwrap_err(),
            UsageError::OptionsFrozen
        );
        assert_eq!(
            options.with_directory("/tmp").unwrap_err(),
            UsageError::OptionsFrozen
        );

        running.store(false, Ordering::Release);
        assert!(!options.is_frozen());
        assert!(
            options
                .set_option(SinkKind::Stdout, Severity::Info, Decorations::NONE)
                .is_ok()
        );
    }

    #[test]
    fn frozen_until_every_engine_stops() {
        let options = Options::new();
        let first = Arc::new(AtomicBool::new(true));
        let second = Arc::new(AtomicBool::new(true));
        options.bind(first.clone());
        options.bind(second.clone());

        second.store(false, Ordering::Release);
        assert!(options.is_frozen());
        first.store(false, Ordering::Release);
        assert!(!options.is_frozen());

        // stopped flags are dropped when the value is reused
        options.bind(second.clone());
        second.store(true, Ordering::Release);
        assert_eq!(options.started.lock().len(), 1);
    }
}
