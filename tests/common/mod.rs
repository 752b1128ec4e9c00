/*!
 * Shared Test Fixtures
 */

#![allow(dead_code)]

use process_tree::{
    create_tree, Cred, Pid, Process, ProcessInfo, ProcessTree, Program, Timestamp, TreeResult,
};
use std::sync::Arc;

pub const PID1: Pid = Pid::new(1, 1);
pub const PID2: Pid = Pid::new(2, 1);

pub fn info(pid: Pid, ppid: i32, executable: &str) -> ProcessInfo {
    ProcessInfo::new(pid, ppid, Program::new(executable), Cred::new(0, 0))
}

/// A source that always returns `rows`
pub fn snapshot_of(
    rows: Vec<ProcessInfo>,
) -> impl Fn() -> TreeResult<Vec<ProcessInfo>> + Send + Sync {
    move || Ok(rows.clone())
}

/// init (1) with a single child (2)
pub fn basic_tree() -> Arc<ProcessTree> {
    process_tree::init_tracing();
    let source = snapshot_of(vec![info(PID1, 0, "/sbin/init"), info(PID2, 1, "/bin/sh")]);
    create_tree(Vec::new(), &source).unwrap()
}

pub fn get(tree: &ProcessTree, pid: Pid) -> Arc<Process> {
    tree.get(pid)
        .unwrap_or_else(|| panic!("{pid} should be in the tree"))
}

/// Feed one fork of init per timestamp so the seen window moves forward
pub fn advance(tree: &ProcessTree, timestamps: impl IntoIterator<Item = Timestamp>) {
    let init = get(tree, PID1);
    for ts in timestamps {
        tree.handle_fork(ts, &init, Pid::new(100_000 + ts as i32, 1));
    }
}

/// (pid, parent pid, executable) for every process, sorted
pub fn shape(tree: &ProcessTree) -> Vec<(Pid, Option<Pid>, String)> {
    let mut shape = Vec::new();
    tree.iterate(|p| {
        shape.push((p.pid, p.parent().map(|parent| parent.pid), p.program.executable.clone()));
    });
    shape.sort();
    shape
}
