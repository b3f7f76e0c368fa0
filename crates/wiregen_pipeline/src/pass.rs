//! The driver-facing generation pass for one service.

use std::collections::BTreeSet;

use wiregen_emit::render_input_class;
use wiregen_model::{ClassNamer, ShapeGraph};

use crate::error::PipelineError;
use crate::orphan::OrphanCollector;
use crate::placement::OutputPlacement;
use crate::stage::{FileStager, WriteOutcome};

/// Counts reported by one generation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Classes the pass produced.
    pub generated: usize,
    /// Files that were stale and got rewritten.
    pub rewritten: usize,
    /// Files that were clean and skipped.
    pub skipped: usize,
    /// Orphaned files deleted from bucket directories.
    pub orphans_removed: usize,
}

/// Runs one full generation pass over a service's shape graph.
///
/// Renders every payload root, stages each class through the freshness
/// check and staged write, sweeps the bucket directories for orphans, and
/// persists fingerprints. Any failure aborts the pass; fingerprints are
/// only persisted after a fully successful run, so a failed run never
/// marks files clean.
pub struct GenerationPass<'a> {
    graph: &'a ShapeGraph,
    namer: &'a dyn ClassNamer,
    placement: &'a OutputPlacement,
    stager: FileStager,
}

impl<'a> GenerationPass<'a> {
    /// Creates a pass over `graph` with the run's shared namer, placement,
    /// and stager.
    pub fn new(
        graph: &'a ShapeGraph,
        namer: &'a dyn ClassNamer,
        placement: &'a OutputPlacement,
        stager: FileStager,
    ) -> Self {
        Self {
            graph,
            namer,
            placement,
            stager,
        }
    }

    /// Executes the pass and returns its summary.
    pub fn run(mut self) -> Result<PassSummary, PipelineError> {
        let mut summary = PassSummary::default();
        let mut generated: BTreeSet<String> = BTreeSet::new();

        for (root, shape) in self.graph.payload_roots() {
            tracing::debug!(shape = %shape.name, "rendering payload root");
            let class = render_input_class(self.graph, root, self.namer)?;
            let path = self.placement.place(&class.class)?;
            generated.insert(class.class.fully_qualified());
            match self.stager.write(&path, &class.source)? {
                WriteOutcome::Rewritten => summary.rewritten += 1,
                WriteOutcome::Unchanged => summary.skipped += 1,
            }
            summary.generated += 1;
        }

        let collector = OrphanCollector::new(self.namer, self.placement);
        summary.orphans_removed = collector.collect(&generated)?;

        self.stager.persist()?;
        tracing::info!(
            generated = summary.generated,
            rewritten = summary.rewritten,
            skipped = summary.skipped,
            orphans_removed = summary.orphans_removed,
            "generation pass complete"
        );
        Ok(summary)
    }
}
