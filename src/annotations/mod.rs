/*!
 * Annotation Subsystem
 *
 * Type-identified, immutable data attached to processes by pluggable
 * producers.
 *
 * ## Producers and values
 *
 * An [`Annotator`] plays two roles. Registered on the tree, it is a producer
 * whose hooks run after every fork and exec. Attached to a process, it is the
 * annotation value itself, keyed by its concrete type. A process holds at
 * most one value per type.
 *
 * ## Example
 *
 * ```ignore
 * tree.annotate_process(&process, Arc::new(OriginatorAnnotator::new(Originator::Login)));
 * let originator = tree.get_annotation::<OriginatorAnnotator>(&process);
 * let record = tree.export_annotations(process.pid);
 * ```
 */

mod originator;

pub use originator::OriginatorAnnotator;

use crate::core::errors::TreeResult;
use crate::process::Process;
use crate::tree::ProcessTree;
use serde::{Deserialize, Serialize};
use std::any::{type_name, Any, TypeId};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Concrete type identity for annotation values
///
/// Implemented for every `Send + Sync + 'static` type; never implement it by hand.
pub trait AnnotationAny: Any + Send + Sync {
    fn annotation_type(&self) -> TypeId;

    fn annotation_name(&self) -> &'static str;

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AnnotationAny for T {
    #[inline]
    fn annotation_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    #[inline]
    fn annotation_name(&self) -> &'static str {
        type_name::<T>()
    }

    #[inline]
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Annotation producer and value
///
/// Hooks are called outside the tree lock, so they may call back into the
/// tree (typically `get_annotation` and `annotate_process`).
pub trait Annotator: AnnotationAny {
    /// Called after a novel fork has been applied
    fn annotate_fork(&self, _tree: &ProcessTree, _parent: &Process, _child: &Process) {}

    /// Called after a novel exec has been applied
    fn annotate_exec(&self, _tree: &ProcessTree, _original: &Process, _new: &Process) {}

    /// Contribution of this value to the merged export record
    fn export(&self) -> Option<Annotations>;

    /// Checked once when the producer is registered with a tree
    fn validate(&self) -> TreeResult<()> {
        Ok(())
    }
}

/// Where a process tree originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Originator {
    Login,
    Cron,
}

/// Structured export record merged from every annotation on a process
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originator: Option<Originator>,
    /// Fields contributed by producers outside this crate
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Annotations {
    #[must_use]
    pub fn with_originator(originator: Originator) -> Self {
        Self {
            originator: Some(originator),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Overlay every field set in `other`
    pub fn merge(&mut self, other: Annotations) {
        if other.originator.is_some() {
            self.originator = other.originator;
        }
        self.extra.extend(other.extra);
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.originator.is_none() && self.extra.is_empty()
    }
}
