/*!
 * Debug Dump
 * Human-readable rendering of the whole tree, one process per line
 */

use super::ProcessTree;
use crate::core::types::Pid;
use crate::process::Process;
use ahash::RandomState;
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::sync::Arc;

type Children = HashMap<Pid, Vec<Arc<Process>>, RandomState>;

impl ProcessTree {
    /// Write every process indented by its depth below a root
    ///
    /// Processes whose parent has already been evicted are shown as roots.
    pub fn debug_dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut processes = self.state.lock().processes();
        processes.sort_by_key(|p| p.pid);

        let present: HashSet<Pid, RandomState> = processes.iter().map(|p| p.pid).collect();
        let mut roots = Vec::new();
        let mut children = Children::default();
        for process in processes {
            match process.parent() {
                Some(parent) if present.contains(&parent.pid) => {
                    children.entry(parent.pid).or_default().push(process);
                }
                _ => roots.push(process),
            }
        }

        for root in &roots {
            dump_subtree(out, root, &children, 0)?;
        }
        Ok(())
    }
}

fn dump_subtree<W: Write>(
    out: &mut W,
    process: &Arc<Process>,
    children: &Children,
    depth: usize,
) -> io::Result<()> {
    writeln!(
        out,
        "{:indent$}{} {}",
        "",
        process.pid,
        process.program.executable,
        indent = depth * 2
    )?;
    if let Some(kids) = children.get(&process.pid) {
        for kid in kids {
            dump_subtree(out, kid, children, depth + 1)?;
        }
    }
    Ok(())
}
