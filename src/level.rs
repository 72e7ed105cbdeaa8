// SPDX-License-Identifier: MIT OR Apache-2.0
use std::fmt::Display;
use std::str::FromStr;

/**
The severity of a log record.

Severities are ordered by rank, and rank is the only ordering key: [Severity::Fatal] is the most severe
(rank 0) and [Severity::Debug] the least (rank 5).  A sink configured with threshold `T` emits every record
whose rank is less than or equal to the rank of `T`.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// The application cannot continue.  Records at this level carry a backtrace.
    Fatal = 0,
    /// System or hardware level failure; the application may retry.
    Critical = 1,
    /// Failure the calling layer can handle or report.
    Error = 2,
    /// Something looks wrong, execution continues.
    Warning = 3,
    /// Information that matters to the user of the application.
    Info = 4,
    /// Programmer-facing detail.
    Debug = 5,
}

impl Severity {
    /// The most verbose severity.  Used as a threshold, it enables every record.
    pub const MAX: Severity = Severity::Debug;

    /// Every severity, most severe first.
    pub const ALL: [Severity; 6] = [
        Severity::Fatal,
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Info,
        Severity::Debug,
    ];

    pub const fn rank(self) -> u8 {
        self as u8
    }

    pub const fn from_rank(rank: u8) -> Option<Severity> {
        match rank {
            0 => Some(Severity::Fatal),
            1 => Some(Severity::Critical),
            2 => Some(Severity::Error),
            3 => Some(Severity::Warning),
            4 => Some(Severity::Info),
            5 => Some(Severity::Debug),
            _ => None,
        }
    }

    /// The tag printed inside the leading brackets of a record.
    pub const fn tag(self) -> &'static str {
        match self {
            Severity::Fatal => "FATAL",
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }

    /**
    Whether a record at this severity passes a sink whose threshold is `threshold`.
    */
    pub const fn passes(self, threshold: Severity) -> bool {
        self.rank() <= threshold.rank()
    }
}

/// Width of the padded tag block: the longest tag, its brackets, and one space.
pub(crate) const TAG_WIDTH: usize = longest_tag() + 3;

const fn longest_tag() -> usize {
    let mut longest = 0;
    let mut i = 0;
    while i < Severity::ALL.len() {
        let len = Severity::ALL[i].tag().len();
        if len > longest {
            longest = len;
        }
        i += 1;
    }
    longest
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Returned when a string names no [Severity].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity {0:?}")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("warn") {
            return Ok(Severity::Warning);
        }
        Severity::ALL
            .into_iter()
            .find(|severity| severity.tag().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseSeverityError(s.to_string()))
    }
}

/*
Boilerplate notes.

Copy/Clone/Eq/Hash: a fieldless enum.
Ord is derived from declaration order, which is rank order.  Fatal < Debug.
Default is not implemented.  There is no severity a caller should get without choosing one.
*/
