/*!
 * Originator Annotation
 * Tags processes descending from a login session or a cron job
 */

use super::{Annotations, Annotator, Originator};
use crate::process::Process;
use crate::tree::ProcessTree;
use std::sync::Arc;
use tracing::trace;

/// Programs that start a new originator lineage
const ORIGINATOR_PROGRAMS: &[(&str, Originator)] = &[
    ("/usr/bin/login", Originator::Login),
    ("/usr/sbin/cron", Originator::Cron),
    ("/usr/sbin/crond", Originator::Cron),
];

/// Producer and value for [`Originator`] annotations
///
/// Registered on a tree (with [`OriginatorAnnotator::producer`]) it propagates
/// an existing originator from parent to child on fork and across exec, and
/// starts a new one when a process execs one of the originator programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OriginatorAnnotator {
    originator: Option<Originator>,
}

impl OriginatorAnnotator {
    #[must_use]
    pub const fn new(originator: Originator) -> Self {
        Self {
            originator: Some(originator),
        }
    }

    /// The unvalued instance registered as a producer
    #[must_use]
    pub const fn producer() -> Self {
        Self { originator: None }
    }

    #[inline]
    #[must_use]
    pub const fn originator(&self) -> Option<Originator> {
        self.originator
    }

    fn originator_for(executable: &str) -> Option<Originator> {
        ORIGINATOR_PROGRAMS
            .iter()
            .find(|(program, _)| *program == executable)
            .map(|(_, originator)| *originator)
    }
}

impl Annotator for OriginatorAnnotator {
    fn annotate_fork(&self, tree: &ProcessTree, parent: &Process, child: &Process) {
        if let Some(annotation) = tree.get_annotation::<OriginatorAnnotator>(parent) {
            tree.annotate_process(child, annotation);
        }
    }

    fn annotate_exec(&self, tree: &ProcessTree, original: &Process, new: &Process) {
        if let Some(annotation) = tree.get_annotation::<OriginatorAnnotator>(original) {
            tree.annotate_process(new, annotation);
            return;
        }

        if let Some(originator) = Self::originator_for(&new.program.executable) {
            trace!(pid = %new.pid, ?originator, "Originator program executed");
            tree.annotate_process(new, Arc::new(OriginatorAnnotator::new(originator)));
        }
    }

    fn export(&self) -> Option<Annotations> {
        self.originator.map(Annotations::with_originator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_originator_programs() {
        assert_eq!(
            OriginatorAnnotator::originator_for("/usr/bin/login"),
            Some(Originator::Login)
        );
        assert_eq!(
            OriginatorAnnotator::originator_for("/usr/sbin/cron"),
            Some(Originator::Cron)
        );
        assert_eq!(OriginatorAnnotator::originator_for("/bin/bash"), None);
    }

    #[test]
    fn test_producer_exports_nothing() {
        assert!(OriginatorAnnotator::producer().export().is_none());
        assert_eq!(
            OriginatorAnnotator::new(Originator::Login).export(),
            Some(Annotations::with_originator(Originator::Login))
        );
    }
}
