/*!
 * Procfs Source
 * Linux process enumeration through /proc
 */

use super::ProcessSource;
use crate::core::errors::TreeResult;
use crate::core::types::Pid;
use crate::process::{Cred, ProcessInfo, Program};
use procfs::process::Process as ProcProcess;
use procfs::ProcResult;
use tracing::{debug, trace};

/// Enumerates `/proc`
///
/// The start time (clock ticks since boot) is used as `pid_version`, which
/// differs between two processes that were handed the same numeric pid.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcfsSource;

impl ProcfsSource {
    pub fn new() -> Self {
        Self
    }

    fn load(process: &ProcProcess) -> ProcResult<ProcessInfo> {
        let stat = process.stat()?;
        let status = process.status()?;

        // Kernel threads and processes we may not inspect have no readable exe
        let executable = process
            .exe()
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_else(|_| stat.comm.clone());
        let arguments = process.cmdline().unwrap_or_default();

        Ok(ProcessInfo::new(
            Pid::new(stat.pid, stat.starttime),
            stat.ppid,
            Program {
                executable,
                arguments,
            },
            Cred {
                uid: status.ruid,
                gid: status.rgid,
                euid: status.euid,
                egid: status.egid,
            },
        ))
    }
}

impl ProcessSource for ProcfsSource {
    fn snapshot(&self) -> TreeResult<Vec<ProcessInfo>> {
        let mut snapshot = Vec::new();
        for entry in procfs::process::all_processes()? {
            // Processes exit while we walk; skip whatever is already gone
            let loaded = entry.and_then(|process| Self::load(&process));
            match loaded {
                Ok(info) => snapshot.push(info),
                Err(e) => trace!(error = %e, "Skipping process during enumeration"),
            }
        }
        debug!(processes = snapshot.len(), "Enumerated /proc");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_contains_self() {
        let snapshot = ProcfsSource::new().snapshot().unwrap();
        let me = std::process::id() as i32;

        let info = snapshot.iter().find(|info| info.pid.pid == me).unwrap();
        assert!(info.pid.pid_version > 0);
        assert!(!info.program.executable.is_empty());
    }
}
