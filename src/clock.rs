// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wall-clock time in the local offset.
//!
//! The local UTC offset is resolved once, when an engine starts.  Resolving it later can fail on
//! unix once other threads exist, so the engine never asks again; when it cannot be determined the
//! clock reports UTC.

use time::{OffsetDateTime, UtcOffset};

/// A source of wall-clock time.
pub(crate) trait Clock {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LocalClock {
    offset: UtcOffset,
}

impl LocalClock {
    pub(crate) fn detect() -> Self {
        Self {
            offset: UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        }
    }

    #[cfg(test)]
    pub(crate) fn utc() -> Self {
        Self {
            offset: UtcOffset::UTC,
        }
    }
}

impl Clock for LocalClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }
}
