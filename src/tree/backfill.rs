/*!
 * Backfill
 *
 * One-shot reconstruction of the tree from a flat snapshot of running
 * processes. Roots are inserted first and children breadth-first below
 * them, so every parent link points at an already-inserted process.
 */

use super::ProcessTree;
use crate::core::errors::TreeResult;
use crate::process::{Process, ProcessInfo};
use crate::source::ProcessSource;
use ahash::RandomState;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::{info, warn};

type ChildMap = HashMap<i32, Vec<ProcessInfo>, RandomState>;

/// Split a snapshot into roots and children grouped by parent pid
///
/// A process is a root if its parent is absent from the snapshot, is one of
/// the platform root ppids, or is the process itself.
fn group_by_parent(
    snapshot: Vec<ProcessInfo>,
    platform_root_ppids: &[i32],
) -> (Vec<ProcessInfo>, ChildMap) {
    let present: HashSet<i32, RandomState> = snapshot.iter().map(|info| info.pid.pid).collect();

    let mut roots = Vec::new();
    let mut children = ChildMap::default();
    for info in snapshot {
        let is_root = info.ppid == info.pid.pid
            || platform_root_ppids.contains(&info.ppid)
            || !present.contains(&info.ppid);
        if is_root {
            roots.push(info);
        } else {
            children.entry(info.ppid).or_default().push(info);
        }
    }
    (roots, children)
}

/// Link a grouped snapshot into processes, parents before children
///
/// Groups never reached from a root (a parent cycle in a racy snapshot) are
/// promoted to roots rather than dropped.
fn link(roots: Vec<ProcessInfo>, mut children: ChildMap) -> Vec<Arc<Process>> {
    let mut linked = Vec::new();
    let mut queue: VecDeque<(ProcessInfo, Option<Arc<Process>>)> =
        roots.into_iter().map(|info| (info, None)).collect();

    loop {
        while let Some((info, parent)) = queue.pop_front() {
            let process = Arc::new(Process::new(
                info.pid,
                Arc::new(info.program),
                Arc::new(info.cred),
                parent,
            ));
            if let Some(kids) = children.remove(&info.pid.pid) {
                queue.extend(kids.into_iter().map(|kid| (kid, Some(Arc::clone(&process)))));
            }
            linked.push(process);
        }

        let Some(&ppid) = children.keys().next() else {
            break;
        };
        if let Some(orphans) = children.remove(&ppid) {
            warn!(ppid, count = orphans.len(), "Unresolvable parent during backfill, inserting as roots");
            queue.extend(orphans.into_iter().map(|orphan| (orphan, None)));
        }
    }
    linked
}

impl ProcessTree {
    /// Populate the tree with the processes currently running
    ///
    /// Fails only if `source` cannot produce a snapshot; partial ancestry
    /// degrades to extra roots.
    pub(crate) fn backfill(&self, source: &dyn ProcessSource) -> TreeResult<()> {
        let snapshot = source.snapshot()?;
        let total = snapshot.len();

        let (roots, children) = group_by_parent(snapshot, &self.config.platform_root_ppids);
        let root_count = roots.len();
        let linked = link(roots, children);

        {
            let mut state = self.state.lock();
            // Backfill runs before any event, so displaced entries age out with the first window
            for process in &linked {
                state.insert(0, Arc::clone(process));
            }
        }

        // Parents precede children, so inherited annotations are already set
        for process in &linked {
            for annotator in &self.annotators {
                if let Some(parent) = process.parent() {
                    annotator.annotate_fork(self, parent, process);
                }
                annotator.annotate_exec(self, process, process);
            }
        }

        info!(processes = total, roots = root_count, "Backfilled process tree");
        Ok(())
    }
}
