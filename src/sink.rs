// SPDX-License-Identifier: MIT OR Apache-2.0

//! The sink table.
//!
//! There are exactly three sinks, one per [`SinkKind`].  Each is either unset, in which case it is
//! never written to and has no output at all, or set with a [`SinkConfig`] and an open output.
//! The table is built once when the engine starts and never changes shape afterwards.

use crate::clock::LocalClock;
use crate::error::StartupError;
use crate::level::Severity;
use crate::options::Options;
use crate::output::Output;
use crate::unique_file::UniqueFileAllocator;
use std::fmt::Display;
use std::ops::{BitOr, BitOrAssign};
use std::path::PathBuf;
use std::time::Duration;

/// One of the three output destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    /// A log file created by the engine with a unique, time-derived name.
    File,
    /// Process standard error.
    Stderr,
    /// Process standard output.
    Stdout,
}

impl SinkKind {
    /// The order in which sinks receive each record.
    pub const DISPATCH_ORDER: [SinkKind; 3] = [SinkKind::File, SinkKind::Stderr, SinkKind::Stdout];

    pub(crate) const fn index(self) -> usize {
        match self {
            SinkKind::File => 0,
            SinkKind::Stderr => 1,
            SinkKind::Stdout => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SinkKind::File => "file",
            SinkKind::Stderr => "stderr",
            SinkKind::Stdout => "stdout",
        }
    }
}

impl Display for SinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/**
Optional metadata attached to each record a sink writes.

Flags combine with `|`:

```
use sinkwise::Decorations;

let both = Decorations::TIMESTAMP | Decorations::THREAD_ID;
assert!(both.contains(Decorations::TIMESTAMP));
assert_eq!(both, Decorations::ALL);
```
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Decorations(u32);

impl Decorations {
    pub const NONE: Decorations = Decorations(0);
    /// `[HH:MM:SS.ffffff]` in local time.
    pub const TIMESTAMP: Decorations = Decorations(1 << 0);
    /// `[<id>]` of the emitting thread.
    pub const THREAD_ID: Decorations = Decorations(1 << 1);
    pub const ALL: Decorations = Decorations(Self::TIMESTAMP.0 | Self::THREAD_ID.0);

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Builds a set from raw bits, dropping bits that name no decoration.
    pub const fn from_bits_truncate(bits: u32) -> Decorations {
        Decorations(bits & Self::ALL.0)
    }

    pub const fn contains(self, other: Decorations) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Decorations {
    type Output = Decorations;

    fn bitor(self, rhs: Decorations) -> Decorations {
        Decorations(self.0 | rhs.0)
    }
}

impl BitOrAssign for Decorations {
    fn bitor_assign(&mut self, rhs: Decorations) {
        self.0 |= rhs.0;
    }
}

/// Filtering and decoration settings of one enabled sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkConfig {
    pub threshold: Severity,
    pub decorations: Decorations,
}

impl SinkConfig {
    pub const fn new(threshold: Severity, decorations: Decorations) -> Self {
        Self {
            threshold,
            decorations,
        }
    }

    /// Whether a record at `severity` is written to this sink.
    pub const fn accepts(&self, severity: Severity) -> bool {
        severity.passes(self.threshold)
    }
}

#[derive(Debug)]
pub(crate) struct Sink {
    pub(crate) config: SinkConfig,
    pub(crate) output: Output,
}

/// The three sink slots of a running engine.
#[derive(Debug)]
pub(crate) struct SinkRegistry {
    slots: [Option<Sink>; 3],
    log_file: Option<PathBuf>,
}

/// Pause between attempts when the unique file name is taken.
const COLLISION_PAUSE: Duration = Duration::from_secs(1);

impl SinkRegistry {
    /**
    Opens an output for every sink `options` fills.

    The file sink always gets a freshly allocated file.  If allocation fails, outputs opened so far
    are dropped with the partially built table.
    */
    pub(crate) fn build(options: &Options, clock: &LocalClock) -> Result<Self, StartupError> {
        let mut slots: [Option<Sink>; 3] = [None, None, None];
        let mut log_file = None;
        for kind in SinkKind::DISPATCH_ORDER {
            let Some(config) = options.get(kind) else {
                continue;
            };
            let output = match kind {
                SinkKind::File => {
                    let allocated =
                        UniqueFileAllocator::new(options.directory(), clock, COLLISION_PAUSE)
                            .allocate()?;
                    log_file = Some(allocated.path);
                    Output::File(allocated.file)
                }
                SinkKind::Stderr | SinkKind::Stdout => match options.captured(kind) {
                    Some(memory) => Output::Memory(memory.clone()),
                    None if kind == SinkKind::Stderr => Output::Stderr,
                    None => Output::Stdout,
                },
            };
            slots[kind.index()] = Some(Sink { config, output });
        }
        Ok(Self { slots, log_file })
    }

    #[cfg(test)]
    pub(crate) fn from_sinks(slots: [Option<Sink>; 3]) -> Self {
        Self {
            slots,
            log_file: None,
        }
    }

    pub(crate) fn config(&self, kind: SinkKind) -> Option<SinkConfig> {
        self.slots[kind.index()].as_ref().map(|sink| sink.config)
    }

    pub(crate) fn log_file(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Enabled sinks in dispatch order.
    pub(crate) fn enabled_mut(&mut self) -> impl Iterator<Item = (SinkKind, &mut Sink)> {
        SinkKind::DISPATCH_ORDER
            .into_iter()
            .zip(self.slots.iter_mut())
            .filter_map(|(kind, slot)| slot.as_mut().map(|sink| (kind, sink)))
    }

    /// Flushes every output.  Failures are returned per sink so the caller can report them.
    pub(crate) fn flush(&mut self) -> Vec<crate::error::WriteError> {
        self.enabled_mut()
            .filter_map(|(kind, sink)| {
                sink.output
                    .flush()
                    .err()
                    .map(|source| crate::error::WriteError { kind, source })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemoryOutput;

    #[test]
    fn dispatch_order_matches_slot_index() {
        for (i, kind) in SinkKind::DISPATCH_ORDER.into_iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn decorations_combine() {
        let mut decorations = Decorations::NONE;
        assert!(!decorations.contains(Decorations::TIMESTAMP));
        decorations |= Decorations::THREAD_ID;
        assert!(decorations.contains(Decorations::THREAD_ID));
        assert!(!decorations.contains(Decorations::ALL));
        assert_eq!(Decorations::from_bits_truncate(0xff), Decorations::ALL);
        assert_eq!(Decorations::ALL.bits(), 0b11);
    }

    #[test]
    fn config_accepts_at_or_above_threshold() {
        let config = SinkConfig::new(Severity::Warning, Decorations::NONE);
        assert!(config.accepts(Severity::Fatal));
        assert!(config.accepts(Severity::Warning));
        assert!(!config.accepts(Severity::Info));
        assert!(!config.accepts(Severity::Debug));
    }

    #[test]
    fn build_leaves_unset_sinks_empty() {
        let capture = MemoryOutput::new();
        let mut options = Options::new();
        options
            .set_option(SinkKind::Stdout, Severity::Info, Decorations::TIMESTAMP)
            .unwrap()
            .capture(SinkKind::Stdout, capture)
            .unwrap();
        let mut registry = SinkRegistry::build(&options, &LocalClock::utc()).unwrap();
        assert_eq!(registry.config(SinkKind::File), None);
        assert_eq!(registry.config(SinkKind::Stderr), None);
        assert_eq!(
            registry.config(SinkKind::Stdout),
            Some(SinkConfig::new(Severity::Info, Decorations::TIMESTAMP))
        );
        assert!(registry.log_file().is_none());
        let kinds: Vec<SinkKind> = registry.enabled_mut().map(|(kind, _)| kind).collect();
        assert_eq!(kinds, vec![SinkKind::Stdout]);
    }

    #[test]
    fn build_allocates_file_for_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = Options::standard();
        options.with_directory(dir.path()).unwrap();
        let registry = SinkRegistry::build(&options, &LocalClock::utc()).unwrap();
        let path = registry.log_file().unwrap();
        assert!(path.starts_with(dir.path()));
        assert!(path.exists());
        assert!(path.to_string_lossy().ends_with(".log"));
    }
}
