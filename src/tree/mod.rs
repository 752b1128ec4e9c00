/*!
 * Process Tree
 *
 * Concurrent model of every process on the machine, updated from fork, exec
 * and exit notifications and read by independent, asynchronously paced
 * consumers.
 *
 * ## Locking
 *
 * One mutex guards the live map, the pending-removal queue, the seen window
 * and retention counts as a single unit. It is held only for map and queue
 * manipulation, never while annotator hooks or `iterate` callbacks run.
 *
 * ## Lifetime
 *
 * An exited process stays resolvable by `get` until its exit timestamp has
 * fallen out of the seen window and no [`ProcessToken`] retains it. Ancestry
 * is carried by owning parent links, so `root_slice` keeps working on handles
 * whose pids have already been evicted.
 */

mod backfill;
mod builder;
mod dump;
mod state;
mod token;
mod window;

pub use builder::{create_tree, ProcessTreeBuilder, TreeConfig};
pub use token::ProcessToken;

use crate::annotations::{Annotations, Annotator};
use crate::core::types::{Pid, Timestamp};
use crate::process::{Cred, Process, Program};
use parking_lot::Mutex;
use state::TreeState;
use std::sync::Arc;
use tracing::{debug, trace, warn};

pub struct ProcessTree {
    annotators: Vec<Box<dyn Annotator>>,
    config: TreeConfig,
    state: Mutex<TreeState>,
}

impl ProcessTree {
    /// Empty tree; use [`create_tree`] or the builder to get a backfilled one
    pub(crate) fn new(annotators: Vec<Box<dyn Annotator>>, config: TreeConfig) -> Self {
        let state = Mutex::new(TreeState::new(config.window_capacity));
        Self {
            annotators,
            config,
            state,
        }
    }

    /// Create a builder for constructing a ProcessTree
    pub fn builder() -> ProcessTreeBuilder {
        ProcessTreeBuilder::new()
    }

    #[inline]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Get the process with exactly this identity
    ///
    /// Misses if the pid is unknown, has been evicted, or a different version
    /// of the same numeric pid is currently live.
    pub fn get(&self, target: Pid) -> Option<Arc<Process>> {
        self.state.lock().get(&target).cloned()
    }

    /// Parent of `process`; needs no lock since the link never changes
    #[inline]
    pub fn get_parent(&self, process: &Process) -> Option<Arc<Process>> {
        process.parent().cloned()
    }

    /// `process` followed by each of its ancestors up to a root
    ///
    /// There may be several roots, e.g. init and kthreadd on Linux.
    pub fn root_slice(&self, process: Arc<Process>) -> Vec<Arc<Process>> {
        let _state = self.state.lock();
        let mut slice = Vec::new();
        let mut current = Some(process);
        while let Some(p) = current {
            current = p.parent().cloned();
            slice.push(p);
        }
        slice
    }

    /// Call `f` for every process in the tree
    ///
    /// The set of processes is captured before `f` runs, so `f` may mutate
    /// the tree.
    pub fn iterate<F>(&self, mut f: F)
    where
        F: FnMut(Arc<Process>),
    {
        let processes = self.state.lock().processes();
        for process in processes {
            f(process);
        }
    }

    /// Number of map entries, including exited processes not yet evicted and
    /// stale versions of reused pids that `get` no longer returns
    pub fn len(&self) -> usize {
        self.state.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exited processes whose map entry has not been removed yet
    pub fn pending_removals(&self) -> usize {
        self.state.lock().pending_removals()
    }

    /// Outstanding retentions on `pid`
    pub fn retention_count(&self, pid: Pid) -> usize {
        self.state.lock().retention_count(&pid)
    }

    // =========================================================================
    // Event handlers
    // =========================================================================

    /// Inform the tree that `parent` forked a child identified by `new_pid`
    ///
    /// The child inherits the parent's program and credentials. If `parent`
    /// is no longer in the tree the child becomes a root.
    pub fn handle_fork(&self, timestamp: Timestamp, parent: &Process, new_pid: Pid) {
        let child = {
            let mut state = self.state.lock();
            if !state.step(timestamp) {
                return;
            }

            let parent_ref = state.get(&parent.pid).cloned();
            if parent_ref.is_none() {
                warn!(parent = %parent.pid, child = %new_pid, "Fork parent not in tree, recording child as root");
            }

            let child = Arc::new(Process::new(
                new_pid,
                Arc::clone(&parent.program),
                Arc::clone(&parent.cred),
                parent_ref,
            ));
            if !state.insert(timestamp, Arc::clone(&child)) {
                return;
            }
            child
        };
        trace!(timestamp, parent = %parent.pid, child = %new_pid, "Handled fork");

        for annotator in &self.annotators {
            annotator.annotate_fork(self, parent, &child);
        }
    }

    /// Inform the tree that `process` exec'd `program` with `cred`
    ///
    /// # Panics
    ///
    /// If `new_pid.pid != process.pid.pid`; exec only changes the version.
    pub fn handle_exec(
        &self,
        timestamp: Timestamp,
        process: &Process,
        new_pid: Pid,
        program: Program,
        cred: Cred,
    ) {
        assert_eq!(
            new_pid.pid, process.pid.pid,
            "exec must keep the numeric pid ({} -> {})",
            process.pid, new_pid
        );

        let new_process = {
            let mut state = self.state.lock();
            if !state.step(timestamp) {
                return;
            }

            let new_process = Arc::new(Process::new(
                new_pid,
                Arc::new(program),
                Arc::new(cred),
                process.parent().cloned(),
            ));
            if !state.replace(timestamp, process.pid, Arc::clone(&new_process)) {
                return;
            }
            new_process
        };
        trace!(timestamp, old = %process.pid, new = %new_pid, "Handled exec");

        for annotator in &self.annotators {
            annotator.annotate_exec(self, process, &new_process);
        }
    }

    /// Inform the tree that `process` exited
    ///
    /// Removal is deferred until the exit has aged out of the seen window and
    /// nothing retains the pid.
    pub fn handle_exit(&self, timestamp: Timestamp, process: &Process) {
        let mut state = self.state.lock();
        if !state.step(timestamp) {
            return;
        }
        state.mark_exited(timestamp, process.pid);
        trace!(timestamp, pid = %process.pid, "Handled exit");
    }

    // =========================================================================
    // Retention
    // =========================================================================

    /// Keep `pids` resolvable until a matching [`release_process`](Self::release_process)
    ///
    /// Prefer [`ProcessToken`], which releases on drop.
    pub fn retain_process(&self, pids: &[Pid]) {
        let mut state = self.state.lock();
        for &pid in pids {
            state.retain(pid);
        }
    }

    /// Drop one retention per pid, evicting any that were only kept alive by it
    pub fn release_process(&self, pids: &[Pid]) {
        let mut state = self.state.lock();
        for &pid in pids {
            state.release(pid);
        }
    }

    // =========================================================================
    // Annotations
    // =========================================================================

    /// Attach `annotation` to `process` under its concrete type
    ///
    /// A type that is already set on the process is left untouched.
    pub fn annotate_process(&self, process: &Process, annotation: Arc<dyn Annotator>) {
        let name = (*annotation).annotation_name();
        if !process.set_annotation(annotation) {
            debug!(pid = %process.pid, annotation = name, "Annotation already set");
        }
    }

    /// Annotation of type `T` on `process`, if set
    pub fn get_annotation<T: Annotator>(&self, process: &Process) -> Option<Arc<T>> {
        process.annotation::<T>()
    }

    /// Merged export record of every annotation on `pid`
    ///
    /// `None` only if `pid` does not resolve.
    pub fn export_annotations(&self, pid: Pid) -> Option<Annotations> {
        let process = self.get(pid)?;
        let mut merged = Annotations::default();
        for annotation in process.annotations() {
            if let Some(record) = annotation.export() {
                merged.merge(record);
            }
        }
        Some(merged)
    }
}

impl std::fmt::Debug for ProcessTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ProcessTree")
            .field("processes", &state.len())
            .field("pending_removals", &state.pending_removals())
            .field("window_capacity", &state.window_capacity())
            .field("annotators", &self.annotators.len())
            .finish()
    }
}
