/*!
 * Core Types
 * Common types used across the process tree
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Event timestamp, monotonically assigned by the event source
pub type Timestamp = u64;

/// Process identity
///
/// The numeric `pid` is reused by the OS over time; `pid_version` tells the
/// reuses apart. Both fields must match for two identities to be equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pid {
    pub pid: i32,
    pub pid_version: u64,
}

impl Pid {
    #[inline]
    #[must_use]
    pub const fn new(pid: i32, pid_version: u64) -> Self {
        Self { pid, pid_version }
    }

    /// Same numeric pid, different version
    #[inline]
    #[must_use]
    pub const fn with_version(self, pid_version: u64) -> Self {
        Self {
            pid: self.pid,
            pid_version,
        }
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.pid, self.pid_version)
    }
}
