// SPDX-License-Identifier: MIT OR Apache-2.0

//! The process-wide engine.
//!
//! Most programs want one engine for the whole process, reachable from anywhere without passing a
//! handle around.  This module provides it: a single [`Engine`] created lazily on first access, plus free
//! functions mirroring its lifecycle.  The logging macros target it unless given an explicit
//! `engine: <expr>,` argument.
//!
//! The global engine is an ordinary [`Engine`]; everything documented there applies.  It still has to
//! be [`create`]d before anything is logged.
//!
//! # Examples
//!
//! ```no_run
//! fn main() -> Result<(), sinkwise::Error> {
//!     // A unique log file in the working directory, every severity, fully decorated.
//!     sinkwise::create(None)?;
//!
//!     sinkwise::info!("started with {} workers", 4);
//!
//!     sinkwise::destroy()?;
//!     Ok(())
//! }
//! ```
//!
//! # Test isolation
//!
//! Tests touching the global engine share it.  Serialize them with a static mutex, or use a private
//! [`Engine`] per test.

use crate::engine::Engine;
use crate::error::{Error, UsageError};
use crate::level::Severity;
use crate::options::Options;
use std::fmt::Arguments;
use std::sync::OnceLock;

static GLOBAL_ENGINE: OnceLock<Engine> = OnceLock::new();

/// The process-wide engine.  Constructed, uninitialized, on first call.
pub fn global_engine() -> &'static Engine {
    GLOBAL_ENGINE.get_or_init(Engine::new)
}

/// Starts the process-wide engine.  See [`Engine::create`].
pub fn create(options: Option<&Options>) -> Result<(), Error> {
    global_engine().create(options)
}

/// Stops the process-wide engine.  See [`Engine::destroy`].
pub fn destroy() -> Result<(), UsageError> {
    global_engine().destroy()
}

/// Logs one message to the process-wide engine.  See [`Engine::emit`].
pub fn emit(severity: Severity, file: &str, line: u32, function: &str, args: Arguments<'_>) {
    global_engine().emit(severity, file, line, function, args);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemoryOutput;
    use crate::sink::{Decorations, SinkKind};
    use parking_lot::Mutex;

    static GLOBAL_ENGINE_GUARD: Mutex<()> = Mutex::new(());

    #[test]
    fn global_lifecycle() {
        let _guard = GLOBAL_ENGINE_GUARD.lock();
        let capture = MemoryOutput::new();
        let mut options = Options::new();
        options
            .set_option(SinkKind::Stderr, Severity::Warning, Decorations::NONE)
            .unwrap()
            .capture(SinkKind::Stderr, capture.clone())
            .unwrap();

        emit(Severity::Fatal, "g.rs", 1, "f", format_args!("before create"));
        create(Some(&options)).unwrap();
        assert!(global_engine().is_running());
        emit(Severity::Warning, "g.rs", 2, "f", format_args!("kept"));
        emit(Severity::Info, "g.rs", 3, "f", format_args!("filtered"));
        destroy().unwrap();
        assert_eq!(destroy(), Err(UsageError::NotRunning));

        let lines = capture.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("[g.rs:2 f] kept"), "{lines:?}");
    }

    #[test]
    fn same_engine_every_time() {
        assert!(std::ptr::eq(global_engine(), global_engine()));
    }
}
