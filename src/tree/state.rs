/*!
 * Tree State
 *
 * Everything guarded by the tree's single mutex: the live map, the index of
 * current versions per numeric pid, the pending-removal queue, the seen
 * window, and retention bookkeeping.
 */

use super::window::SeenWindow;
use crate::core::types::{Pid, Timestamp};
use crate::process::Process;
use ahash::RandomState;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

pub(crate) struct TreeState {
    map: HashMap<Pid, Arc<Process>, RandomState>,
    /// Version of each numeric pid that has not exited yet
    live: HashMap<i32, Pid, RandomState>,
    /// Exited pids and the timestamp of their exit
    remove_at: Vec<(Timestamp, Pid)>,
    seen: SeenWindow,
    retained: HashMap<Pid, usize, RandomState>,
    /// Aged out while retained; removed when the last retention is released
    tombstoned: HashSet<Pid, RandomState>,
}

impl TreeState {
    pub(crate) fn new(window_capacity: usize) -> Self {
        Self {
            map: HashMap::default(),
            live: HashMap::default(),
            remove_at: Vec::new(),
            seen: SeenWindow::new(window_capacity),
            retained: HashMap::default(),
            tombstoned: HashSet::default(),
        }
    }

    /// Dedup gate, then apply every pending removal that has aged out
    ///
    /// Returns `false` if the event was already processed.
    pub(crate) fn step(&mut self, timestamp: Timestamp) -> bool {
        if !self.seen.observe(timestamp) {
            debug!(timestamp, "Skipping already processed event");
            return false;
        }

        let Some(cutoff) = self.seen.cutoff() else {
            return true;
        };

        let mut expired = Vec::new();
        self.remove_at.retain(|&(exited_at, pid)| {
            if exited_at < cutoff {
                expired.push(pid);
                false
            } else {
                true
            }
        });

        for pid in expired {
            if self.retained.contains_key(&pid) {
                debug!(%pid, "Deferring eviction of retained process");
                self.tombstoned.insert(pid);
            } else {
                self.evict(pid);
            }
        }
        true
    }

    /// Lookup by exact identity; stale versions of a reused pid miss
    pub(crate) fn get(&self, target: &Pid) -> Option<&Arc<Process>> {
        if let Some(current) = self.live.get(&target.pid) {
            if current != target {
                return None;
            }
        }
        self.map.get(target)
    }

    /// Add a new process, keeping any entry that already has its identity
    ///
    /// A different version of the same numeric pid that never reported an
    /// exit is queued for removal as if it had exited at `timestamp`.
    /// Returns whether `process` was stored.
    pub(crate) fn insert(&mut self, timestamp: Timestamp, process: Arc<Process>) -> bool {
        let pid = process.pid;
        if self.map.contains_key(&pid) {
            warn!(%pid, "Process with the same identity already in tree, keeping it");
            return false;
        }

        if let Some(displaced) = self.live.insert(pid.pid, pid) {
            debug!(%displaced, %pid, "Pid reused without an exit, queueing old version for removal");
            self.remove_at.push((timestamp, displaced));
        }
        self.map.insert(pid, process);
        true
    }

    /// Swap an exec'ing process for its new image
    pub(crate) fn replace(&mut self, timestamp: Timestamp, old: Pid, process: Arc<Process>) -> bool {
        if process.pid != old && self.map.contains_key(&process.pid) {
            warn!(%old, new = %process.pid, "Exec target already in tree, keeping it");
            return false;
        }

        self.map.remove(&old);
        self.tombstoned.remove(&old);
        if self.live.get(&old.pid) == Some(&old) {
            self.live.remove(&old.pid);
        }
        self.insert(timestamp, process)
    }

    pub(crate) fn mark_exited(&mut self, timestamp: Timestamp, pid: Pid) {
        if self.live.get(&pid.pid) == Some(&pid) {
            self.live.remove(&pid.pid);
        }
        self.remove_at.push((timestamp, pid));
    }

    pub(crate) fn retain(&mut self, pid: Pid) {
        *self.retained.entry(pid).or_insert(0) += 1;
    }

    pub(crate) fn release(&mut self, pid: Pid) {
        let Some(count) = self.retained.get_mut(&pid) else {
            warn!(%pid, "Released a process that was not retained");
            return;
        };

        *count -= 1;
        if *count == 0 {
            self.retained.remove(&pid);
            if self.tombstoned.contains(&pid) {
                self.evict(pid);
            }
        }
    }

    fn evict(&mut self, pid: Pid) {
        debug!(%pid, "Evicting exited process");
        self.map.remove(&pid);
        self.tombstoned.remove(&pid);
        if self.live.get(&pid.pid) == Some(&pid) {
            self.live.remove(&pid.pid);
        }
    }

    pub(crate) fn processes(&self) -> Vec<Arc<Process>> {
        self.map.values().cloned().collect()
    }

    /// Every entry in the map, including stale versions `get` hides
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    pub(crate) fn pending_removals(&self) -> usize {
        self.remove_at.len() + self.tombstoned.len()
    }

    pub(crate) fn retention_count(&self, pid: &Pid) -> usize {
        self.retained.get(pid).copied().unwrap_or(0)
    }

    pub(crate) fn window_capacity(&self) -> usize {
        self.seen.capacity()
    }
}
