//SPDX-License-Identifier: MIT OR Apache-2.0
/*!
# sinkwise

sinkwise is a leveled logging engine that writes every record to up to three independently configured
sinks: a log file with a unique, time-derived name, stdout, and stderr.

# The model

Six severities, most severe first:

| Severity   | Use                                                        |
|------------|------------------------------------------------------------|
| `FATAL`    | the application cannot continue; the record gets a backtrace |
| `CRITICAL` | system or hardware failure, a retry may help               |
| `ERROR`    | a failure the caller's layer handles                       |
| `WARNING`  | suspicious, execution continues                            |
| `INFO`     | progress that matters to the user                          |
| `DEBUG`    | programmer detail                                          |

Each sink has a *threshold*: it writes records at that severity or a more severe one.  Each sink also
chooses its *decorations*, a timestamp and/or the emitting thread's id.  A record looks like

```text
[WARNING]  [09:30:12.000123] [7] [src/net.rs:88 connect] retrying in 5s
```

The level tag is padded so messages line up.  A message that does not end in a newline gets one.

# The engine

An [`Engine`] is started once with [`Engine::create`], logged to with [`Engine::emit`] (or the macros),
and stopped with [`Engine::destroy`].  Configuration is fixed for the lifetime of a session.

```
use sinkwise::{Decorations, Engine, Options, Severity, SinkKind};

# let dir = tempfile::tempdir()?;
let mut options = Options::new();
options
    .set_option(SinkKind::File, Severity::MAX, Decorations::ALL)?
    .set_option(SinkKind::Stderr, Severity::Error, Decorations::TIMESTAMP)?
#   .with_directory(dir.path())?
    ;

let engine = Engine::new();
engine.create(Some(&options))?;
sinkwise::info!(engine: &engine, "file only: {} is below the stderr threshold", "INFO");
sinkwise::error!(engine: &engine, "both sinks");
let log_file = engine.log_file_path().expect("file sink is enabled");
engine.destroy()?;

let text = std::fs::read_to_string(log_file)?;
assert_eq!(text.lines().count(), 2);
# Ok::<(), Box<dyn std::error::Error>>(())
```

The file sink's file is created at start-up in the configured directory (the working directory by
default), named after the local time, e.g. `2026:Oct:15-09:30:12.log`.  If that name is taken the engine
waits a second and tries again, switching to microsecond names after a few collisions.

# Concurrency

Every [`Engine::emit`] formats and writes under one lock, so records from concurrent threads never
interleave and every sink sees them in the same order.  Each sink receives a record in a single write.

# The process-wide engine

[`create`], [`destroy`] and [`emit`] operate on one lazily constructed engine, as do the macros
[`fatal!`], [`critical!`], [`error!`], [`warning!`], [`info!`], [`debug!`] and [`log!`] unless given an
`engine: <expr>,` argument.

# Errors

Only [`Engine::create`] returns an error you are expected to act on.  Logging is best effort: misuse and
failed writes are reported on stderr, prefixed with `sinkwise:`, and the record is dropped.
*/

mod clock;
mod diagnostic;
mod engine;
mod error;
mod format;
pub mod global;
mod level;
mod macros;
mod options;
mod output;
mod record;
mod sink;
mod symbolizer;
mod thread_id;
mod unique_file;

pub use engine::Engine;
pub use error::{Error, StartupError, UsageError, WriteError};
pub use format::{DEFAULT_CAPACITY, FormatBuffer, MIN_CAPACITY};
pub use global::{create, destroy, emit, global_engine};
pub use level::{ParseSeverityError, Severity};
pub use options::Options;
pub use output::MemoryOutput;
pub use record::Record;
pub use sink::{Decorations, SinkConfig, SinkKind};
pub use symbolizer::{StdSymbolizer, Symbolizer};
pub use thread_id::ThreadId;
pub use unique_file::MAX_TRIES;

#[doc(hidden)]
pub mod hidden {
    pub use crate::macros::{compiled_in, trim_function_name};
}
