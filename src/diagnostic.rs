// SPDX-License-Identifier: MIT OR Apache-2.0

//! The engine's own diagnostic channel.
//!
//! Usage errors, file name collisions and failed sink writes are reported here as one
//! `sinkwise: ...` line on process stderr.  Reporting never fails: if stderr itself is gone there is
//! nowhere left to complain to.

use std::fmt::Display;
use std::io::Write;

pub(crate) fn report(message: impl Display) {
    let mut lock = std::io::stderr().lock();
    let _ = writeln!(lock, "sinkwise: {message}");
}

/// Reports an error together with its chain of sources.
pub(crate) fn report_error(error: &dyn std::error::Error) {
    let mut line = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        line.push_str(": ");
        line.push_str(&cause.to_string());
        source = cause.source();
    }
    report(line);
}
