// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types.
//!
//! Only [`Engine::create`](crate::Engine::create) returns an actionable error.  Everything that goes
//! wrong while logging is reported on the diagnostic channel (process stderr) and the record is dropped.

use crate::sink::SinkKind;
use std::io;
use std::path::PathBuf;

/// Misuse of the API.  Non-fatal: the call is dropped and the engine keeps its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("engine is already running; destroy it before creating it again")]
    AlreadyRunning,
    #[error("engine is not running; create it first")]
    NotRunning,
    #[error("options cannot change while an engine they started is running")]
    OptionsFrozen,
    #[error("the file sink always writes to an allocated log file and cannot be redirected")]
    FileNotRedirectable,
    #[error("format buffer capacity {requested} is below the minimum of {minimum} bytes")]
    CapacityTooSmall { requested: usize, minimum: usize },
    #[error("emit called while this thread is already emitting into the same engine")]
    Reentrant,
}

/// The engine could not be started.  It stays uninitialized.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("no free log file name in {directory} after {tries} attempts")]
    NamesExhausted { directory: PathBuf, tries: u32 },
    #[error("cannot create log file {path}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot format log file name")]
    Naming(#[from] time::error::Format),
}

/// A sink rejected a record.
#[derive(Debug, thiserror::Error)]
#[error("write to {kind} sink failed")]
pub struct WriteError {
    pub kind: SinkKind,
    #[source]
    pub source: io::Error,
}

/// Returned by [`Engine::create`](crate::Engine::create).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error(transparent)]
    Startup(#[from] StartupError),
}
