//! The file pipeline of the wiregen code generator.
//!
//! Takes rendered source text from `wiregen_emit` and puts it on disk
//! safely and incrementally:
//!
//! - [`OutputPlacement`] maps a generated class identity to its output
//!   directory and final path.
//! - [`FileStager`] decides per file whether a rewrite is needed (against
//!   the cross-process build cache), then writes through a staged path that
//!   is syntax-checked before an atomic rename. The final path never holds
//!   invalid content.
//! - [`OrphanCollector`] deletes previously generated files no longer
//!   produced, scoped strictly to resolver-derived bucket directories.
//! - [`GenerationPass`] is the driver-facing orchestrator tying the pieces
//!   together for one service's shape graph.

#![warn(missing_docs)]

mod checker;
mod config;
mod error;
mod orphan;
mod pass;
mod placement;
mod stage;

pub use checker::{NullChecker, PhpLintChecker, SyntaxChecker};
pub use config::{
    CacheConfig, CacheStorageKind, CheckerConfig, ConfigError, GeneratorConfig, OutputConfig,
};
pub use error::PipelineError;
pub use orphan::OrphanCollector;
pub use pass::{GenerationPass, PassSummary};
pub use placement::OutputPlacement;
pub use stage::{FileStager, WriteOutcome};
