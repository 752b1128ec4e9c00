/*!
 * Process Sources
 *
 * Enumeration of the processes running right now, used to backfill a tree
 * at startup.
 */

#[cfg(target_os = "linux")]
mod procfs;

#[cfg(target_os = "linux")]
pub use self::procfs::ProcfsSource;

use crate::core::errors::TreeResult;
use crate::process::ProcessInfo;

/// Snapshot provider for running processes
///
/// Any `Fn() -> TreeResult<Vec<ProcessInfo>>` closure is a source, which is
/// handy for tests and for platforms this crate has no enumerator for.
pub trait ProcessSource: Send + Sync {
    /// Every process running at this moment, or `TreeError::Collection`
    fn snapshot(&self) -> TreeResult<Vec<ProcessInfo>>;
}

impl<F> ProcessSource for F
where
    F: Fn() -> TreeResult<Vec<ProcessInfo>> + Send + Sync,
{
    fn snapshot(&self) -> TreeResult<Vec<ProcessInfo>> {
        self()
    }
}
