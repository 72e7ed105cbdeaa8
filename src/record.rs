// SPDX-License-Identifier: MIT OR Apache-2.0

//! The record submitted by one logging call.
//!
//! A [`Record`] borrows everything it describes: the source location and the unformatted message
//! arguments.  It exists only for the duration of the call that carries it; the engine formats it
//! once per matching sink and never stores it.
//!
//! # Example
//!
//! ```rust
//! use sinkwise::{Record, Severity};
//!
//! fn describe(record: &Record<'_>) -> String {
//!     format!("{} at {}:{} says {}", record.severity(), record.file(), record.line(), record)
//! }
//!
//! let answer = 42;
//! let text = describe(&Record::new(Severity::Info, "src/main.rs", 7, "main", format_args!("answer={answer}")));
//! assert_eq!(text, "INFO at src/main.rs:7 says answer=42");
//! ```

use crate::level::Severity;
use std::fmt::{Arguments, Display};

#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    severity: Severity,
    file: &'a str,
    line: u32,
    function: &'a str,
    args: Arguments<'a>,
}

impl<'a> Record<'a> {
    pub fn new(
        severity: Severity,
        file: &'a str,
        line: u32,
        function: &'a str,
        args: Arguments<'a>,
    ) -> Self {
        Self {
            severity,
            file,
            line,
            function,
            args,
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn file(&self) -> &'a str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn function(&self) -> &'a str {
        self.function
    }

    pub fn args(&self) -> Arguments<'a> {
        self.args
    }
}

/// Displays the user message only, without decoration.
impl Display for Record<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(self.args)
    }
}

/*
Boilerplate notes for Record:

IMPLEMENTED:
- Debug/Clone/Copy: every field is Copy, Arguments included
- Display: the expanded message

NOT IMPLEMENTED:
- PartialEq/Eq/Hash: Arguments has no equality; comparing the rendered text
  would format the message, which is the expensive part we defer
- Default: a record without a location is not meaningful
- Send/Sync: Arguments may borrow non-Sync values; records never cross threads
*/
