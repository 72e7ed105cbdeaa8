// SPDX-License-Identifier: MIT OR Apache-2.0

//! Numeric thread identifiers for the thread-id decoration.
//!
//! On Linux this is the kernel thread id, the number `top -H`, gdb and `/proc/<pid>/task` show.
//! Elsewhere a process-wide counter stands in.

use std::fmt::Display;

thread_local! {
    static CURRENT: ThreadId = ThreadId(os_thread_id());
}

#[cfg(target_os = "linux")]
fn os_thread_id() -> u64 {
    // SAFETY: gettid takes no arguments, cannot fail, and touches no memory of ours.
    let tid = unsafe { libc::syscall(libc::SYS_gettid) };
    tid as u64
}

#[cfg(not(target_os = "linux"))]
fn os_thread_id() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);
    NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed)
}

/// Identifier of an emitting thread.
///
/// Resolved once per thread and cached.  Distinct for threads alive at the same time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ThreadId(u64);

impl ThreadId {
    pub fn current() -> ThreadId {
        CURRENT.with(|id| *id)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
