/*!
 * Process Tree Limits and Constants
 *
 * Tuning values for deduplication and deferred eviction, plus the
 * environment variables that override them.
 */

// =============================================================================
// EVENT WINDOW
// =============================================================================

/// Number of distinct recent event timestamps remembered by the tree
/// Also the grace period, in events, before an exited process is evicted
pub const DEFAULT_SEEN_WINDOW: usize = 32;

/// Smallest usable window (a zero-sized window could never dedup or evict)
pub const MIN_SEEN_WINDOW: usize = 1;

// =============================================================================
// BACKFILL
// =============================================================================

/// Parent pid reported for processes started directly by the kernel
/// On Linux both init (1) and kthreadd (2) report PPID 0
pub const PLATFORM_ROOT_PPID: i32 = 0;

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Overrides [`DEFAULT_SEEN_WINDOW`]
pub const ENV_SEEN_WINDOW: &str = "PROCESS_TREE_WINDOW";

/// Enables JSON log output when set to `1` or `true`
pub const ENV_TRACE_JSON: &str = "PROCESS_TREE_TRACE_JSON";
