// SPDX-License-Identifier: MIT OR Apache-2.0

//! Allocation of the file sink's log file.
//!
//! The file name is derived from local wall-clock time, `2026:Oct:15-09:30:12.log`.  If that name is
//! already taken, the allocator waits and tries again with a fresh timestamp.  After half of the
//! attempts have collided it switches to microsecond names, `2026:Oct:15-09:30:12.123456.log`, which
//! practically never collide.
//!
//! The file is created exclusively: a name that appears between the existence probe and creation is
//! treated as one more collision.  The allocator therefore never hands out a file it did not create.

use crate::clock::Clock;
use crate::diagnostic;
use crate::error::StartupError;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::format_description;

/// Attempts before allocation gives up.
pub const MAX_TRIES: u32 = 10;

/// Permissions of a new log file: owner and group rwx, others r-x.  Subject to the umask.
#[cfg(unix)]
const LOG_FILE_MODE: u32 = 0o775;

/// A log file the allocator created, with the path it was created at.
#[derive(Debug)]
pub struct AllocatedFile {
    pub path: PathBuf,
    pub file: File,
}

pub(crate) struct UniqueFileAllocator<'a, C: Clock> {
    directory: &'a Path,
    clock: &'a C,
    pause: Duration,
    max_tries: u32,
}

impl<'a, C: Clock> UniqueFileAllocator<'a, C> {
    pub(crate) fn new(directory: &'a Path, clock: &'a C, pause: Duration) -> Self {
        Self {
            directory,
            clock,
            pause,
            max_tries: MAX_TRIES,
        }
    }

    pub(crate) fn allocate(&self) -> Result<AllocatedFile, StartupError> {
        let mut collisions = 0;
        while collisions < self.max_tries {
            let escalated = collisions >= self.max_tries / 2;
            let name = file_name(self.clock.now(), escalated)?;
            let path = self.directory.join(name);

            if path.symlink_metadata().is_ok() {
                collisions += 1;
                diagnostic::report(format_args!(
                    "log file {} already exists, retrying ({collisions}/{})",
                    path.display(),
                    self.max_tries
                ));
                self.wait();
                continue;
            }

            match create_exclusive(&path) {
                Ok(file) => return Ok(AllocatedFile { path, file }),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    collisions += 1;
                    diagnostic::report(format_args!(
                        "log file {} appeared while creating it, retrying ({collisions}/{})",
                        path.display(),
                        self.max_tries
                    ));
                    self.wait();
                }
                Err(source) => return Err(StartupError::CreateFile { path, source }),
            }
        }
        Err(StartupError::NamesExhausted {
            directory: self.directory.to_path_buf(),
            tries: self.max_tries,
        })
    }

    fn wait(&self) {
        if !self.pause.is_zero() {
            std::thread::sleep(self.pause);
        }
    }
}

/// The candidate name for `now`.  `escalated` adds microseconds.
pub(crate) fn file_name(now: OffsetDateTime, escalated: bool) -> Result<String, time::error::Format> {
    if escalated {
        now.format(format_description!(
            "[year]:[month repr:short]:[day]-[hour]:[minute]:[second].[subsecond digits:6].log"
        ))
    } else {
        now.format(format_description!(
            "[year]:[month repr:short]:[day]-[hour]:[minute]:[second].log"
        ))
    }
}

fn create_exclusive(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(LOG_FILE_MODE);
    }
    options.open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use time::macros::datetime;

    /// Returns the same instant on every call.
    struct FrozenClock(OffsetDateTime);

    impl Clock for FrozenClock {
        fn now(&self) -> OffsetDateTime {
            self.0
        }
    }

    /// Advances one second per call.
    struct SteppingClock {
        start: OffsetDateTime,
        calls: Cell<i64>,
    }

    impl Clock for SteppingClock {
        fn now(&self) -> OffsetDateTime {
            let n = self.calls.get();
            self.calls.set(n + 1);
            self.start + time::Duration::seconds(n)
        }
    }

    const INSTANT: OffsetDateTime = datetime!(2026-10-15 09:30:12.000123 UTC);

    #[test]
    fn names_follow_the_time_pattern() {
        assert_eq!(file_name(INSTANT, false).unwrap(), "2026:Oct:15-09:30:12.log");
        assert_eq!(
            file_name(INSTANT, true).unwrap(),
            "2026:Oct:15-09:30:12.000123.log"
        );
    }

    #[test]
    fn free_name_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let clock = FrozenClock(INSTANT);
        let allocated = UniqueFileAllocator::new(dir.path(), &clock, Duration::ZERO)
            .allocate()
            .unwrap();
        assert_eq!(allocated.path, dir.path().join("2026:Oct:15-09:30:12.log"));
        assert_eq!(allocated.file.metadata().unwrap().len(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn created_file_has_no_write_bit_for_others() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let clock = FrozenClock(INSTANT);
        let allocated = UniqueFileAllocator::new(dir.path(), &clock, Duration::ZERO)
            .allocate()
            .unwrap();
        let mode = allocated.file.metadata().unwrap().permissions().mode();
        assert_eq!(mode & 0o002, 0);
        assert_eq!(mode & 0o700, 0o700);
    }

    #[test]
    fn collision_escalates_to_microseconds() {
        let dir = tempfile::tempdir().unwrap();
        let taken = dir.path().join("2026:Oct:15-09:30:12.log");
        std::fs::write(&taken, b"someone else's").unwrap();

        let clock = FrozenClock(INSTANT);
        let allocated = UniqueFileAllocator::new(dir.path(), &clock, Duration::ZERO)
            .allocate()
            .unwrap();
        assert_eq!(
            allocated.path,
            dir.path().join("2026:Oct:15-09:30:12.000123.log")
        );
        assert_eq!(std::fs::read(&taken).unwrap(), b"someone else's");
    }

    #[test]
    fn retry_picks_up_the_next_second() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2026:Oct:15-09:30:12.log"), b"").unwrap();
        std::fs::write(dir.path().join("2026:Oct:15-09:30:13.log"), b"").unwrap();

        let clock = SteppingClock {
            start: INSTANT,
            calls: Cell::new(0),
        };
        let allocated = UniqueFileAllocator::new(dir.path(), &clock, Duration::ZERO)
            .allocate()
            .unwrap();
        assert_eq!(allocated.path, dir.path().join("2026:Oct:15-09:30:14.log"));
        assert_eq!(clock.calls.get(), 3);
    }

    #[test]
    fn gives_up_after_max_tries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2026:Oct:15-09:30:12.log"), b"").unwrap();
        std::fs::write(dir.path().join("2026:Oct:15-09:30:12.000123.log"), b"").unwrap();

        let clock = FrozenClock(INSTANT);
        let err = UniqueFileAllocator::new(dir.path(), &clock, Duration::ZERO)
            .allocate()
            .unwrap_err();
        match err {
            StartupError::NamesExhausted { tries, .. } => assert_eq!(tries, MAX_TRIES),
            other => panic!("expected NamesExhausted, got {other:?}"),
        }
    }

    #[test]
    fn missing_directory_is_a_create_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not-there");
        let clock = FrozenClock(INSTANT);
        let err = UniqueFileAllocator::new(&missing, &clock, Duration::ZERO)
            .allocate()
            .unwrap_err();
        assert!(matches!(err, StartupError::CreateFile { .. }), "{err:?}");
    }
}
