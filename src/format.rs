// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of one record into the shared format buffer.
//!
//! A rendered record reads
//!
//! ```text
//! [WARNING]  [09:30:12.000123] [7] [src/net.rs:88 connect] retrying in 5s
//! ```
//!
//! The level tag is padded to a fixed width so messages line up whatever their severity.  Timestamp and
//! thread id are present only when the sink asks for them.  Fatal records are followed by a
//! `Backtrace:` line and one line per frame.
//!
//! # Truncation
//!
//! The buffer never grows past its capacity.  Content is clipped at `capacity - 1` bytes, on a UTF-8
//! character boundary, which keeps one byte in reserve for the line terminator: every record leaves
//! here newline-terminated, truncated or not.

use crate::level::{Severity, TAG_WIDTH};
use crate::record::Record;
use crate::sink::Decorations;
use crate::thread_id::ThreadId;
use std::fmt::{self, Write};
use time::OffsetDateTime;

/// Capacity used unless [`Options::with_buffer_capacity`](crate::Options::with_buffer_capacity) says otherwise.
pub const DEFAULT_CAPACITY: usize = 32 * 1024;
/// Smallest capacity an engine accepts.
pub const MIN_CAPACITY: usize = 64;

/// A byte buffer with a hard capacity that clips instead of growing.
#[derive(Debug)]
pub struct FormatBuffer {
    bytes: Vec<u8>,
    capacity: usize,
    truncated: bool,
}

impl FormatBuffer {
    /// `capacity` is raised to [`MIN_CAPACITY`] if smaller.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_CAPACITY);
        Self {
            bytes: Vec::with_capacity(capacity),
            capacity,
            truncated: false,
        }
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        self.truncated = false;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether anything was clipped since the last [`clear`](Self::clear).
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Bytes content may still occupy.  One byte stays reserved for the terminator.
    fn room(&self) -> usize {
        (self.capacity - 1).saturating_sub(self.bytes.len())
    }

    /// Appends `\n` unless the buffer already ends with one.
    pub fn terminate_line(&mut self) {
        if self.bytes.last() != Some(&b'\n') && self.bytes.len() < self.capacity {
            self.bytes.push(b'\n');
        }
    }
}

impl Write for FormatBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.room();
        if s.len() <= room {
            self.bytes.extend_from_slice(s.as_bytes());
        } else {
            let mut cut = room;
            while !s.is_char_boundary(cut) {
                cut -= 1;
            }
            self.bytes.extend_from_slice(&s.as_bytes()[..cut]);
            self.truncated = true;
        }
        Ok(())
    }
}

/// Per-call facts shared by every sink the record goes to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Stamp {
    pub(crate) time: OffsetDateTime,
    pub(crate) thread: ThreadId,
}

/**
Renders `record` into `buffer`, which the caller has cleared.

`frames` is only consulted for fatal records.
*/
pub(crate) fn render(
    buffer: &mut FormatBuffer,
    record: &Record<'_>,
    decorations: Decorations,
    stamp: &Stamp,
    frames: Option<&[String]>,
) {
    // FormatBuffer never fails; an Err can only come from a Display impl in the user's arguments,
    // and whatever was written before it is kept.
    let _ = write_record(buffer, record, decorations, stamp);
    buffer.terminate_line();

    if record.severity() == Severity::Fatal {
        if let Some(frames) = frames {
            let _ = buffer.write_str("Backtrace:\n");
            for frame in frames {
                let _ = buffer.write_str(frame);
                let _ = buffer.write_char('\n');
            }
            buffer.terminate_line();
        }
    }
}

fn write_record(
    buffer: &mut FormatBuffer,
    record: &Record<'_>,
    decorations: Decorations,
    stamp: &Stamp,
) -> fmt::Result {
    let tag = record.severity().tag();
    write!(buffer, "[{tag}]{:pad$}", "", pad = TAG_WIDTH - tag.len() - 2)?;

    if decorations.contains(Decorations::TIMESTAMP) {
        let time = stamp.time;
        write!(
            buffer,
            "[{:02}:{:02}:{:02}.{:06}] ",
            time.hour(),
            time.minute(),
            time.second(),
            time.microsecond()
        )?;
    }
    if decorations.contains(Decorations::THREAD_ID) {
        write!(buffer, "[{}] ", stamp.thread)?;
    }
    write!(
        buffer,
        "[{}:{} {}] ",
        record.file(),
        record.line(),
        record.function()
    )?;
    buffer.write_fmt(record.args())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn stamp() -> Stamp {
        Stamp {
            time: datetime!(2026-10-15 09:30:12.000123 UTC),
            thread: ThreadId::current(),
        }
    }

    fn rendered(
        severity: Severity,
        decorations: Decorations,
        args: fmt::Arguments<'_>,
        frames: Option<&[String]>,
    ) -> String {
        let mut buffer = FormatBuffer::with_capacity(DEFAULT_CAPACITY);
        let record = Record::new(severity, "src/net.rs", 88, "connect", args);
        render(&mut buffer, &record, decorations, &stamp(), frames);
        String::from_utf8(buffer.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn undecorated_record() {
        assert_eq!(
            rendered(
                Severity::Warning,
                Decorations::NONE,
                format_args!("retrying in {}s", 5),
                None
            ),
            "[WARNING]  [src/net.rs:88 connect] retrying in 5s\n"
        );
    }

    #[test]
    fn fully_decorated_record() {
        let id = ThreadId::current();
        assert_eq!(
            rendered(Severity::Info, Decorations::ALL, format_args!("up"), None),
            format!("[INFO]     [09:30:12.000123] [{id}] [src/net.rs:88 connect] up\n")
        );
    }

    #[test]
    fn messages_start_at_the_same_column() {
        let columns: Vec<usize> = Severity::ALL
            .into_iter()
            .map(|severity| {
                rendered(severity, Decorations::NONE, format_args!("same body"), None)
                    .find("same body")
                    .unwrap()
            })
            .collect();
        assert!(columns.iter().all(|c| *c == columns[0]), "{columns:?}");
    }

    #[test]
    fn newline_is_idempotent() {
        let with = rendered(Severity::Info, Decorations::NONE, format_args!("done\n"), None);
        let without = rendered(Severity::Info, Decorations::NONE, format_args!("done"), None);
        assert_eq!(with, without);
        assert!(with.ends_with("done\n"));
        assert!(!with.ends_with("\n\n"));
    }

    #[test]
    fn backtrace_only_on_fatal() {
        let frames = vec!["0: app::crash".to_string(), "1: app::main".to_string()];
        for severity in Severity::ALL {
            let text = rendered(severity, Decorations::NONE, format_args!("boom"), Some(&frames));
            if severity == Severity::Fatal {
                assert!(text.ends_with("boom\nBacktrace:\n0: app::crash\n1: app::main\n"), "{text}");
            } else {
                assert!(!text.contains("Backtrace:"), "{text}");
                assert_eq!(text.lines().count(), 1);
            }
        }
    }

    #[test]
    fn printf_style_width_and_precision() {
        let text = rendered(
            Severity::Debug,
            Decorations::NONE,
            format_args!("{:>5}|{:<4}|{:.2}|{:05}|{}", "ab", 'c', 1.23456, 42, -7),
            None,
        );
        assert!(text.ends_with("   ab|c   |1.23|00042|-7\n"), "{text}");
    }

    #[test]
    fn truncation_stays_within_capacity_and_ends_with_newline() {
        let long = "x".repeat(1000);
        let mut buffer = FormatBuffer::with_capacity(MIN_CAPACITY);
        render(
            &mut buffer,
            &Record::new(Severity::Error, "a.rs", 1, "f", format_args!("{long}")),
            Decorations::ALL,
            &stamp(),
            None,
        );
        assert!(buffer.is_truncated());
        assert_eq!(buffer.len(), MIN_CAPACITY);
        assert_eq!(buffer.as_bytes().last(), Some(&b'\n'));
    }

    #[test]
    fn truncated_fatal_record_still_fits() {
        let long = "y".repeat(200);
        let frames = vec!["0: frame".to_string(); 50];
        let mut buffer = FormatBuffer::with_capacity(MIN_CAPACITY);
        render(
            &mut buffer,
            &Record::new(Severity::Fatal, "a.rs", 1, "f", format_args!("{long}")),
            Decorations::NONE,
            &stamp(),
            Some(&frames),
        );
        assert!(buffer.len() <= buffer.capacity());
        assert_eq!(buffer.as_bytes().last(), Some(&b'\n'));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let mut buffer = FormatBuffer::with_capacity(MIN_CAPACITY);
        let filler = "a".repeat(MIN_CAPACITY - 3);
        buffer.write_str(&filler).unwrap();
        // Two bytes of room left, the snowman needs three.
        buffer.write_str("\u{2603}").unwrap();
        assert!(buffer.is_truncated());
        assert_eq!(buffer.len(), MIN_CAPACITY - 3);
        buffer.terminate_line();
        assert!(std::str::from_utf8(buffer.as_bytes()).is_ok());
    }

    #[test]
    fn clear_resets_truncation() {
        let mut buffer = FormatBuffer::with_capacity(1);
        assert_eq!(buffer.capacity(), MIN_CAPACITY);
        buffer.write_str(&"z".repeat(MIN_CAPACITY * 2)).unwrap();
        assert!(buffer.is_truncated());
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(!buffer.is_truncated());
    }
}
