/*!
 * Process Types
 * The process record shared between the tree and its consumers
 */

use crate::annotations::{AnnotationAny, Annotator};
use crate::core::types::Pid;
use ahash::RandomState;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Executable identity of a process at a point in time
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Program {
    pub executable: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
}

impl Program {
    #[must_use]
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            arguments: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }
}

/// Credential set of a process at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cred {
    /// Real user id
    pub uid: u32,
    /// Real group id
    pub gid: u32,
    /// Effective user id
    pub euid: u32,
    /// Effective group id
    pub egid: u32,
}

impl Cred {
    /// Credentials whose real and effective ids are the same
    #[must_use]
    pub const fn new(uid: u32, gid: u32) -> Self {
        Self {
            uid,
            gid,
            euid: uid,
            egid: gid,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.euid == 0
    }
}

/// One row of a running-process snapshot, before it is linked into a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: Pid,
    pub ppid: i32,
    pub program: Program,
    pub cred: Cred,
}

impl ProcessInfo {
    #[must_use]
    pub fn new(pid: Pid, ppid: i32, program: Program, cred: Cred) -> Self {
        Self {
            pid,
            ppid,
            program,
            cred,
        }
    }
}

pub(crate) type AnnotationMap = HashMap<TypeId, Arc<dyn Annotator>, RandomState>;

/// A process as recorded in the tree
///
/// Identity, program, credentials and parent link never change after
/// construction; an exec produces a new `Process`. The parent link is an
/// owning reference, so ancestry stays walkable after the parent has left
/// the tree's map. Annotations are append-only.
pub struct Process {
    pub pid: Pid,
    pub program: Arc<Program>,
    pub cred: Arc<Cred>,
    parent: Option<Arc<Process>>,
    annotations: RwLock<AnnotationMap>,
}

impl Process {
    pub(crate) fn new(
        pid: Pid,
        program: Arc<Program>,
        cred: Arc<Cred>,
        parent: Option<Arc<Process>>,
    ) -> Self {
        Self {
            pid,
            program,
            cred,
            parent,
            annotations: RwLock::new(AnnotationMap::default()),
        }
    }

    /// Parent process, or `None` for a root
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<Process>> {
        self.parent.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Store `annotation` under its concrete type unless that type is already set
    ///
    /// Returns whether the annotation was stored.
    pub(crate) fn set_annotation(&self, annotation: Arc<dyn Annotator>) -> bool {
        let key = (*annotation).annotation_type();
        let mut annotations = self.annotations.write();
        if annotations.contains_key(&key) {
            return false;
        }
        annotations.insert(key, annotation);
        true
    }

    /// Type-checked annotation lookup
    #[must_use]
    pub fn annotation<T: Annotator>(&self) -> Option<Arc<T>> {
        let stored = self.annotations.read().get(&TypeId::of::<T>()).cloned()?;
        AnnotationAny::into_any_arc(stored).downcast::<T>().ok()
    }

    /// Snapshot of every attached annotation
    #[must_use]
    pub fn annotations(&self) -> Vec<Arc<dyn Annotator>> {
        self.annotations.read().values().cloned().collect()
    }
}

impl fmt::Debug for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Process")
            .field("pid", &self.pid)
            .field("program", &self.program.executable)
            .field("parent", &self.parent.as_ref().map(|p| p.pid))
            .field("annotations", &self.annotations.read().len())
            .finish()
    }
}
