/*!
 * Backfill Tests
 * Tree construction from running-process snapshots
 */

mod common;

use common::{get, info, snapshot_of, PID1, PID2};
use pretty_assertions::assert_eq;
use process_tree::{create_tree, Pid, ProcessInfo, ProcessTree, TreeConfig, TreeError, TreeResult};
use std::sync::Arc;

fn slice_pids(tree: &ProcessTree, pid: Pid) -> Vec<i32> {
    tree.root_slice(get(tree, pid)).iter().map(|p| p.pid.pid).collect()
}

#[test]
fn test_backfill_links_ancestry() {
    let source = snapshot_of(vec![
        info(Pid::new(300, 1), 200, "/usr/bin/vim"),
        info(Pid::new(200, 1), 100, "/bin/bash"),
        info(Pid::new(100, 1), 1, "/usr/sbin/sshd"),
        info(PID1, 0, "/sbin/init"),
        info(PID2, 0, "[kthreadd]"),
        info(Pid::new(3, 1), 2, "[rcu_gp]"),
    ]);
    let tree = create_tree(Vec::new(), &source).unwrap();

    assert_eq!(tree.len(), 6);
    assert_eq!(slice_pids(&tree, Pid::new(300, 1)), vec![300, 200, 100, 1]);
    assert_eq!(slice_pids(&tree, Pid::new(3, 1)), vec![3, 2]);
    assert!(get(&tree, PID2).is_root());
}

#[test]
fn test_missing_parent_becomes_root() {
    let source = snapshot_of(vec![info(PID1, 0, "/sbin/init"), info(Pid::new(40, 1), 39, "/bin/orphan")]);
    let tree = create_tree(Vec::new(), &source).unwrap();

    assert!(get(&tree, Pid::new(40, 1)).is_root());
}

#[test]
fn test_parent_cycle_does_not_drop_processes() {
    let source = snapshot_of(vec![
        info(PID1, 0, "/sbin/init"),
        info(Pid::new(7, 1), 8, "/bin/a"),
        info(Pid::new(8, 1), 7, "/bin/b"),
    ]);
    let tree = create_tree(Vec::new(), &source).unwrap();

    assert_eq!(tree.len(), 3);
    for pid in [Pid::new(7, 1), Pid::new(8, 1)] {
        let len = tree.root_slice(get(&tree, pid)).len();
        assert!(len <= 2);
    }
}

#[test]
fn test_collection_failure_is_fatal() {
    let source = || -> TreeResult<Vec<ProcessInfo>> {
        Err(TreeError::Collection("permission denied".into()))
    };
    let result = create_tree(Vec::new(), &source);
    assert_eq!(
        result.unwrap_err(),
        TreeError::Collection("permission denied".into())
    );
}

#[test]
fn test_empty_snapshot() {
    let source = snapshot_of(Vec::new());
    let tree = create_tree(Vec::new(), &source).unwrap();
    assert!(tree.is_empty());
}

#[test]
fn test_custom_platform_roots() {
    let source = snapshot_of(vec![
        info(PID1, 0, "/sbin/launchd"),
        info(Pid::new(60, 1), 1, "/usr/libexec/logd"),
    ]);
    let config = TreeConfig {
        platform_root_ppids: vec![0, 1],
        ..TreeConfig::default()
    };
    let tree: Arc<ProcessTree> = ProcessTree::builder().with_config(config).build(&source).unwrap();

    assert!(get(&tree, Pid::new(60, 1)).is_root());
}

#[test]
fn test_invalid_config_rejected() {
    let source = snapshot_of(vec![info(PID1, 0, "/sbin/init")]);
    let result = ProcessTree::builder().with_window_capacity(0).build(&source);
    assert!(matches!(result, Err(TreeError::InvalidConfig(_))));
}

#[cfg(target_os = "linux")]
#[test]
fn test_backfill_from_procfs() {
    let tree = create_tree(Vec::new(), &process_tree::ProcfsSource::new()).unwrap();
    let me = std::process::id() as i32;

    let mut found = None;
    tree.iterate(|p| {
        if p.pid.pid == me {
            found = Some(p);
        }
    });

    let me = found.expect("test process should be backfilled");
    let slice = tree.root_slice(me);
    assert!(slice.last().unwrap().is_root());
}
