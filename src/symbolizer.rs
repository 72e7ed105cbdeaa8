// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backtrace capture for fatal records.
//!
//! The formatter only needs "a list of frame strings".  How those are produced is platform business,
//! so it sits behind [`Symbolizer`].

use std::backtrace::Backtrace;
use std::fmt::Debug;

/**
Produces the call stack of the current thread as printable frames, innermost first.

Called at most once per fatal record, while the engine lock is held.
*/
pub trait Symbolizer: Debug + Send + Sync {
    fn frames(&self) -> Vec<String>;
}

/// Captures frames with [`std::backtrace::Backtrace`], regardless of `RUST_BACKTRACE`.
///
/// Symbol names require debug info in the binary; without it frames may be unnamed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StdSymbolizer;

impl Symbolizer for StdSymbolizer {
    fn frames(&self) -> Vec<String> {
        split_frames(&Backtrace::force_capture().to_string())
    }
}

/// Folds the `at file:line` lines of a rendered backtrace into the frame above them.
fn split_frames(rendered: &str) -> Vec<String> {
    let mut frames: Vec<String> = Vec::new();
    for line in rendered.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match (line.strip_prefix("at "), frames.last_mut()) {
            (Some(location), Some(frame)) => {
                frame.push_str(" (");
                frame.push_str(location);
                frame.push(')');
            }
            _ => frames.push(line.to_string()),
        }
    }
    frames
}
