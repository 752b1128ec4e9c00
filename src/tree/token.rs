/*!
 * Process Tokens
 *
 * RAII retention of processes in a tree across asynchronous processing
 */

use super::ProcessTree;
use crate::core::types::Pid;
use std::sync::Arc;

/// Keeps a set of pids resolvable in a [`ProcessTree`] while alive
///
/// Creating a token retains its pids; dropping it releases them exactly
/// once, on every exit path including unwinding. Moving a token (for example
/// into a spawned task) transfers the retention without touching the counts.
/// Cloning retains the pids again.
///
/// # Example
///
/// ```ignore
/// let token = ProcessToken::new(Arc::clone(&tree), vec![event.pid]);
/// tokio::spawn(async move {
///     let process = token.tree().get(event.pid); // still resolvable
///     drop(token);
/// });
/// ```
#[must_use = "dropping a token immediately releases its processes"]
pub struct ProcessToken {
    tree: Arc<ProcessTree>,
    pids: Vec<Pid>,
}

impl ProcessToken {
    pub fn new(tree: Arc<ProcessTree>, pids: Vec<Pid>) -> Self {
        tree.retain_process(&pids);
        Self { tree, pids }
    }

    #[inline]
    pub fn pids(&self) -> &[Pid] {
        &self.pids
    }

    #[inline]
    pub fn tree(&self) -> &Arc<ProcessTree> {
        &self.tree
    }
}

impl Clone for ProcessToken {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.tree), self.pids.clone())
    }
}

impl Drop for ProcessToken {
    fn drop(&mut self) {
        self.tree.release_process(&self.pids);
    }
}

impl std::fmt::Debug for ProcessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessToken").field("pids", &self.pids).finish()
    }
}
