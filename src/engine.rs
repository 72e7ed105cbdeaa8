// SPDX-License-Identifier: MIT OR Apache-2.0

//! The engine: lifecycle and dispatch.
//!
//! # Architecture
//!
//! An [`Engine`] is a handle.  Its state lives behind one `parking_lot::Mutex`:
//! - `None` while the engine is uninitialized
//! - `Some(Session)` while it runs
//!
//! A session owns the sink table, the format buffer and the backtrace source.  Because all three are
//! only reachable through the lock guard, formatting and writing a record is a single critical section:
//! records of concurrent callers never interleave, in any sink, and the output order of every sink is
//! the order in which callers acquired the lock.  Among callers blocked at the same time that order is
//! unspecified.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --create--> Running --destroy--> Uninitialized
//! ```
//!
//! Misuse (creating twice, logging before create, destroying twice) is reported on the diagnostic
//! channel and otherwise ignored; the engine never panics the host.
//!
//! The lock is not reentrant.  A thread already dispatching into an engine (say, from the `Display`
//! impl of a message argument, possibly by way of other engines) cannot emit into it, create or
//! destroy it, or inspect its sinks: those calls fail with [`UsageError::Reentrant`] or return `None`
//! instead of blocking.

use crate::clock::{Clock, LocalClock};
use crate::diagnostic;
use crate::error::{Error, UsageError, WriteError};
use crate::format::{self, FormatBuffer, Stamp};
use crate::level::Severity;
use crate::options::Options;
use crate::record::Record;
use crate::sink::{SinkConfig, SinkKind, SinkRegistry};
use crate::symbolizer::Symbolizer;
use crate::thread_id::ThreadId;
use parking_lot::Mutex;
use std::cell::RefCell;
use std::fmt::Arguments;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
struct Session {
    registry: SinkRegistry,
    buffer: FormatBuffer,
    symbolizer: Arc<dyn Symbolizer>,
    clock: LocalClock,
}

impl Session {
    fn start(options: &Options) -> Result<Self, Error> {
        let clock = LocalClock::detect();
        let registry = SinkRegistry::build(options, &clock)?;
        Ok(Self {
            registry,
            buffer: FormatBuffer::with_capacity(options.buffer_capacity()),
            symbolizer: options.symbolizer(),
            clock,
        })
    }

    /// Formats and writes `record` to every sink that accepts it.  Returns how many sinks were written.
    fn dispatch(&mut self, record: &Record<'_>) -> usize {
        let Session {
            registry,
            buffer,
            symbolizer,
            clock,
        } = self;
        let stamp = Stamp {
            time: clock.now(),
            thread: ThreadId::current(),
        };
        let mut frames: Option<Vec<String>> = None;
        let mut written = 0;

        for (kind, sink) in registry.enabled_mut() {
            if !sink.config.accepts(record.severity()) {
                continue;
            }
            if record.severity() == Severity::Fatal && frames.is_none() {
                frames = Some(symbolizer.frames());
            }
            buffer.clear();
            format::render(
                buffer,
                record,
                sink.config.decorations,
                &stamp,
                frames.as_deref(),
            );
            match sink.output.write_record(buffer.as_bytes()) {
                Ok(()) => written += 1,
                Err(source) => diagnostic::report_error(&WriteError { kind, source }),
            }
        }
        written
    }
}

thread_local! {
    /// Addresses of the engines this thread is dispatching into, outermost first.
    static DISPATCHING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

fn address(engine: &Engine) -> usize {
    engine as *const Engine as usize
}

/// Whether the current thread is inside a dispatch of `engine`, at any depth.
fn is_dispatching(engine: &Engine) -> bool {
    let this = address(engine);
    DISPATCHING.with(|stack| stack.borrow().contains(&this))
}

/// Marks the current thread as dispatching into one engine until dropped.
struct DispatchGuard;

impl DispatchGuard {
    fn enter(engine: &Engine) -> Result<Self, UsageError> {
        if is_dispatching(engine) {
            return Err(UsageError::Reentrant);
        }
        DISPATCHING.with(|stack| stack.borrow_mut().push(address(engine)));
        Ok(DispatchGuard)
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/**
A logging engine with three independently filtered sinks.

Engines are independent of each other; most programs use the process-wide one behind the
[`fatal!`](crate::fatal) … [`debug!`](crate::debug) macros, while tests and libraries that want isolation
hold their own.

# Example

```
use sinkwise::{Decorations, Engine, MemoryOutput, Options, Severity, SinkKind};

let stderr = MemoryOutput::new();
let mut options = Options::new();
options
    .set_option(SinkKind::Stderr, Severity::Warning, Decorations::NONE)?
    .capture(SinkKind::Stderr, stderr.clone())?;

let engine = Engine::new();
engine.create(Some(&options))?;
sinkwise::warning!(engine: &engine, "disk {}% full", 91);
sinkwise::info!(engine: &engine, "not written: below the threshold");
engine.destroy()?;

let lines = stderr.lines();
assert_eq!(lines.len(), 1);
assert!(lines[0].starts_with("[WARNING]"));
assert!(lines[0].ends_with("disk 91% full"));
# Ok::<(), sinkwise::Error>(())
```
*/
#[derive(Debug)]
pub struct Engine {
    state: Mutex<Option<Session>>,
    running: Arc<AtomicBool>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// An uninitialized engine.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /**
    Starts the engine.

    Without options the engine uses [`Options::standard`]: a unique log file in the working directory,
    every severity, timestamp and thread id.

    # Errors

    - [`UsageError::AlreadyRunning`] if the engine runs already; the running session is left untouched.
    - [`StartupError`](crate::StartupError) if the log file cannot be allocated.  The engine stays
      uninitialized and everything opened so far is closed.
    */
    pub fn create(&self, options: Option<&Options>) -> Result<(), Error> {
        self.ensure_not_dispatching()?;
        let mut state = self.state.lock();
        if state.is_some() {
            diagnostic::report(UsageError::AlreadyRunning);
            return Err(UsageError::AlreadyRunning.into());
        }

        let standard;
        let options = match options {
            Some(options) => options,
            None => {
                standard = Options::standard();
                &standard
            }
        };

        let session = Session::start(options).inspect_err(|e| diagnostic::report_error(e))?;
        *state = Some(session);
        self.running.store(true, Ordering::Release);
        options.bind(self.running.clone());
        Ok(())
    }

    /**
    Stops the engine, flushing and closing every output.

    A later [`create`](Self::create) starts from a clean state.

    # Errors

    [`UsageError::NotRunning`] if the engine was not running.  Also reported on the diagnostic channel.
    */
    pub fn destroy(&self) -> Result<(), UsageError> {
        self.ensure_not_dispatching()?;
        let mut state = self.state.lock();
        let Some(mut session) = state.take() else {
            diagnostic::report(UsageError::NotRunning);
            return Err(UsageError::NotRunning);
        };
        self.running.store(false, Ordering::Release);
        for failure in session.registry.flush() {
            diagnostic::report_error(&failure);
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Path of the file sink's log file, if the engine runs with a file sink.
    ///
    /// `None` when asked from inside a dispatch of this engine.
    pub fn log_file_path(&self) -> Option<PathBuf> {
        if is_dispatching(self) {
            return None;
        }
        self.state
            .lock()
            .as_ref()
            .and_then(|session| session.registry.log_file().cloned())
    }

    /// Configuration of the sink of `kind`, if the engine runs and that sink is enabled.
    ///
    /// `None` when asked from inside a dispatch of this engine.
    pub fn sink_config(&self, kind: SinkKind) -> Option<SinkConfig> {
        if is_dispatching(self) {
            return None;
        }
        self.state
            .lock()
            .as_ref()
            .and_then(|session| session.registry.config(kind))
    }

    /**
    Logs one message.

    `args` is usually built with `format_args!`; the macros do that, and fill in `file`, `line` and
    `function`, for you.  Logging is best effort: nothing is returned, failures are reported on the
    diagnostic channel.
    */
    pub fn emit(&self, severity: Severity, file: &str, line: u32, function: &str, args: Arguments<'_>) {
        self.submit(&Record::new(severity, file, line, function, args));
    }

    /// Logs a prepared record.  See [`emit`](Self::emit).
    pub fn submit(&self, record: &Record<'_>) {
        if let Err(e) = self.dispatch(record) {
            diagnostic::report(e);
        }
    }

    /// The engine lock is not reentrant; every locking entry point checks this first.
    fn ensure_not_dispatching(&self) -> Result<(), UsageError> {
        if is_dispatching(self) {
            diagnostic::report(UsageError::Reentrant);
            Err(UsageError::Reentrant)
        } else {
            Ok(())
        }
    }

    fn dispatch(&self, record: &Record<'_>) -> Result<usize, UsageError> {
        let _guard = DispatchGuard::enter(self)?;
        let mut state = self.state.lock();
        let session = state.as_mut().ok_or(UsageError::NotRunning)?;
        Ok(session.dispatch(record))
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(mut session) = self.state.get_mut().take() {
            self.running.store(false, Ordering::Release);
            for failure in session.registry.flush() {
                diagnostic::report_error(&failure);
            }
        }
    }
}

/*
Boilerplate notes.

Clone: no.  Two handles to one engine is what `&Engine` / `Arc<Engine>` are for.
PartialEq/Hash: an engine has identity, not value.
Default: an uninitialized engine.
Send/Sync: automatic; the session sits behind the mutex.
*/
