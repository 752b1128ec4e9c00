/*!
 * Tree Builder
 * Configuration, annotator validation and the backfilled constructor
 */

use super::ProcessTree;
use crate::annotations::Annotator;
use crate::core::errors::{TreeError, TreeResult};
use crate::core::limits::{DEFAULT_SEEN_WINDOW, ENV_SEEN_WINDOW, MIN_SEEN_WINDOW, PLATFORM_ROOT_PPID};
use crate::source::ProcessSource;
use ahash::RandomState;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Process tree configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Distinct recent timestamps remembered for dedup and eviction
    pub window_capacity: usize,
    /// Parent pids that mark a backfilled process as a root
    pub platform_root_ppids: Vec<i32>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            window_capacity: DEFAULT_SEEN_WINDOW,
            platform_root_ppids: vec![PLATFORM_ROOT_PPID],
        }
    }
}

impl TreeConfig {
    /// Defaults, overridden by `PROCESS_TREE_WINDOW` when set
    pub fn from_env() -> TreeResult<Self> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(ENV_SEEN_WINDOW) {
            config.window_capacity = parse_window(&raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TreeResult<()> {
        if self.window_capacity < MIN_SEEN_WINDOW {
            return Err(TreeError::InvalidConfig(format!(
                "window capacity must be at least {MIN_SEEN_WINDOW}, got {}",
                self.window_capacity
            )));
        }
        Ok(())
    }
}

fn parse_window(raw: &str) -> TreeResult<usize> {
    raw.trim().parse().map_err(|_| {
        TreeError::InvalidConfig(format!("{ENV_SEEN_WINDOW}={raw:?} is not a window size"))
    })
}

/// Builder for ProcessTree
///
/// `build` is the only way to obtain a tree: it validates the configuration
/// and annotators, then backfills from the given source.
pub struct ProcessTreeBuilder {
    config: TreeConfig,
    annotators: Vec<Box<dyn Annotator>>,
}

impl ProcessTreeBuilder {
    pub fn new() -> Self {
        Self {
            config: TreeConfig::default(),
            annotators: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: TreeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_window_capacity(mut self, window_capacity: usize) -> Self {
        self.config.window_capacity = window_capacity;
        self
    }

    /// Register an annotation producer
    pub fn with_annotator(mut self, annotator: Box<dyn Annotator>) -> Self {
        self.annotators.push(annotator);
        self
    }

    pub fn with_annotators(mut self, annotators: Vec<Box<dyn Annotator>>) -> Self {
        self.annotators.extend(annotators);
        self
    }

    /// Validate, construct and backfill
    pub fn build(self, source: &dyn ProcessSource) -> TreeResult<Arc<ProcessTree>> {
        self.config.validate()?;
        validate_annotators(&self.annotators)?;

        let annotator_count = self.annotators.len();
        let tree = ProcessTree::new(self.annotators, self.config);
        tree.backfill(source)?;

        info!(
            processes = tree.len(),
            annotators = annotator_count,
            window = tree.config().window_capacity,
            "Process tree initialized"
        );
        Ok(Arc::new(tree))
    }
}

impl Default for ProcessTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a backfilled tree with the given annotation producers
pub fn create_tree(
    annotators: Vec<Box<dyn Annotator>>,
    source: &dyn ProcessSource,
) -> TreeResult<Arc<ProcessTree>> {
    ProcessTreeBuilder::new().with_annotators(annotators).build(source)
}

fn validate_annotators(annotators: &[Box<dyn Annotator>]) -> TreeResult<()> {
    let mut seen = HashSet::with_hasher(RandomState::new());
    for annotator in annotators {
        let annotator: &dyn Annotator = &**annotator;
        if !seen.insert(annotator.annotation_type()) {
            return Err(TreeError::DuplicateAnnotator(
                annotator.annotation_name().to_string(),
            ));
        }
        annotator.validate()?;
    }
    Ok(())
}
