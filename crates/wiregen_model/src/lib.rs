//! The shape model consumed by the wiregen code generator.
//!
//! A service's API is described as a graph of typed *shapes* (scalars,
//! structures, lists, maps) connected by named *member* edges. The graph may
//! be cyclic (a taggable resource can contain nested tags of its own shape),
//! so shapes live in an arena and reference each other by stable [`ShapeId`]
//! rather than by ownership.
//!
//! This crate also defines the naming-resolver seam ([`ClassNamer`]) that
//! maps a shape to the class identity and package path of the code generated
//! for it. Generation and orphan collection share one resolver instance so
//! both passes agree on every path.

#![warn(missing_docs)]

mod arena;
mod graph;
mod ids;
mod naming;
mod shape;

pub use arena::{Arena, ArenaId};
pub use graph::ShapeGraph;
pub use ids::ShapeId;
pub use naming::{ClassName, ClassNamer, ClassRole, ServiceNamer};
pub use shape::{Member, Shape, ShapeKind, WireType, XmlNamespace};
