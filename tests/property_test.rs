/*!
 * Property Tests
 * Idempotent redelivery and bounded ancestry over random event sequences
 */

mod common;

use common::{basic_tree, shape};
use proptest::prelude::*;
use process_tree::{Cred, Pid, Process, ProcessTree, Program};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Event {
    Fork(usize),
    Exec(usize),
    Exit(usize),
}

fn event() -> impl Strategy<Value = Event> {
    prop_oneof![
        3 => any::<usize>().prop_map(Event::Fork),
        1 => any::<usize>().prop_map(Event::Exec),
        1 => any::<usize>().prop_map(Event::Exit),
    ]
}

fn pick(tree: &ProcessTree, index: usize) -> Option<Arc<Process>> {
    let mut processes = Vec::new();
    tree.iterate(|p| processes.push(p));
    if processes.is_empty() {
        return None;
    }
    processes.sort_by_key(|p| p.pid);
    Some(Arc::clone(&processes[index % processes.len()]))
}

/// Apply `events` with timestamps 1.., delivering each one `deliveries` times
fn apply(tree: &ProcessTree, events: &[Event], deliveries: usize) {
    for (i, event) in events.iter().enumerate() {
        let ts = i as u64 + 1;
        let index = match event {
            Event::Fork(n) | Event::Exec(n) | Event::Exit(n) => *n,
        };
        let Some(target) = pick(tree, index) else {
            continue;
        };
        for _ in 0..deliveries {
            match event {
                Event::Fork(_) => tree.handle_fork(ts, &target, Pid::new(1000 + i as i32, 1)),
                Event::Exec(_) => tree.handle_exec(
                    ts,
                    &target,
                    target.pid.with_version(target.pid.pid_version + 1),
                    Program::new(format!("/bin/e{i}")),
                    Cred::new(1, 1),
                ),
                Event::Exit(_) => tree.handle_exit(ts, &target),
            }
        }
    }
}

proptest! {
    #[test]
    fn redelivery_is_idempotent(events in prop::collection::vec(event(), 1..80)) {
        let once = basic_tree();
        let twice = basic_tree();
        apply(&once, &events, 1);
        apply(&twice, &events, 2);

        prop_assert_eq!(shape(&once), shape(&twice));
        prop_assert_eq!(once.pending_removals(), twice.pending_removals());
    }

    #[test]
    fn root_slices_terminate(events in prop::collection::vec(event(), 1..80)) {
        let tree = basic_tree();
        apply(&tree, &events, 1);

        let forks = events.iter().filter(|e| matches!(e, Event::Fork(_))).count();
        tree.iterate(|p| {
            let slice = tree.root_slice(p);
            assert!(slice.len() <= forks + 2);
            assert!(slice.last().unwrap().is_root());
        });
    }
}
