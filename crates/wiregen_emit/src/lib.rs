//! Source-text emission for the wiregen code generator.
//!
//! Three layers, all pure functions over the read-only shape graph:
//!
//! - [`types`]: maps a shape to its PHP runtime type, phpdoc type, and the
//!   generated class it references (if any).
//! - [`docs`]: renders the phpdoc array-shape block documenting a
//!   structure's member layout, with the input/result nullability asymmetry.
//! - [`xml`]: compiles a payload-root structure into PHP statements that
//!   marshal an instance into a complete XML document.
//!
//! [`class`] wraps the emitted body and doc block into a committable PHP
//! input class for the staging pipeline.
//!
//! Every shape/member combination outside the emission rules is a fatal
//! [`EmitError::SchemaUnsupported`] — an incomplete rule set is a generation
//! bug, never a runtime condition.

#![warn(missing_docs)]

mod class;
mod docs;
mod error;
mod types;
mod xml;

pub use class::{render_input_class, GeneratedClass};
pub use docs::{document_members, DocOptions};
pub use error::EmitError;
pub use types::{map_type, MappedType};
pub use xml::emit_document;
