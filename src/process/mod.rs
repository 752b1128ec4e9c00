/*!
 * Process Module
 * Process identity, program, credentials and the shared process record
 */

pub mod types;

// Re-export for convenience
pub use types::{Cred, Process, ProcessInfo, Program};
