/*!
 * Process Tree Library
 *
 * Live, queryable model of every process on a machine for a security
 * monitoring agent:
 * - Backfill from a snapshot of running processes
 * - Incremental fork/exec/exit updates with duplicate suppression
 * - Deferred eviction so slow consumers can still resolve exited processes
 * - Retention tokens that pin processes across asynchronous processing
 * - Type-identified annotations merged into a structured export record
 */

pub mod annotations;
pub mod core;
pub mod monitoring;
pub mod process;
pub mod source;
pub mod tree;

// Re-exports
pub use annotations::{Annotations, Annotator, Originator, OriginatorAnnotator};
pub use crate::core::{Pid, Timestamp, TreeError, TreeResult};
pub use monitoring::init_tracing;
pub use process::{Cred, Process, ProcessInfo, Program};
pub use source::ProcessSource;
#[cfg(target_os = "linux")]
pub use source::ProcfsSource;
pub use tree::{create_tree, ProcessToken, ProcessTree, ProcessTreeBuilder, TreeConfig};
