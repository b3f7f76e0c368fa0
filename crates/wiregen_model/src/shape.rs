//! Shape and member definitions for the service type graph.
//!
//! A [`Shape`] is one node in the graph: a scalar, a structure, a list, or a
//! map. Structures own named [`Member`] edges; lists and maps own the member
//! describing their element slot. All edges point at other shapes by
//! [`ShapeId`], so a structure can contain itself transitively.

use crate::ids::ShapeId;
use serde::{Deserialize, Serialize};

/// The wire type tag carried by a shape.
///
/// Scalar shapes carry one of the scalar tags; the aggregate tags exist so a
/// shape's tag can always be reported in diagnostics even when the loader
/// produced an inconsistent node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireType {
    /// A UTF-8 string.
    String,
    /// A 32-bit integer.
    Integer,
    /// A 64-bit integer.
    Long,
    /// A 32-bit float.
    Float,
    /// A 64-bit float.
    Double,
    /// A boolean.
    Boolean,
    /// An opaque byte blob.
    Blob,
    /// A date-time value.
    Timestamp,
    /// A list aggregate.
    List,
    /// A map aggregate.
    Map,
    /// A structure aggregate.
    Structure,
}

impl WireType {
    /// Returns the tag name as it appears in service definitions.
    pub fn as_str(self) -> &'static str {
        match self {
            WireType::String => "string",
            WireType::Integer => "integer",
            WireType::Long => "long",
            WireType::Float => "float",
            WireType::Double => "double",
            WireType::Boolean => "boolean",
            WireType::Blob => "blob",
            WireType::Timestamp => "timestamp",
            WireType::List => "list",
            WireType::Map => "map",
            WireType::Structure => "structure",
        }
    }
}

/// An XML namespace declaration attached to a shape or member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlNamespace {
    /// The namespace URI.
    pub uri: String,
    /// Optional namespace prefix (`xmlns:<prefix>` instead of `xmlns`).
    pub prefix: Option<String>,
}

impl XmlNamespace {
    /// Returns the attribute name this namespace is stamped with.
    pub fn attribute_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        }
    }
}

/// A named, possibly-required edge from a structure (or the element slot of
/// a list/map) to another shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// The member name as declared on the owning structure.
    pub name: String,
    /// The shape this member points at.
    pub target: ShapeId,
    /// Whether the member must be present when serializing.
    pub required: bool,
    /// Wire location-name override; falls back to `name` when absent.
    pub location_name: Option<String>,
    /// Whether the member serializes as an XML attribute instead of a child
    /// element.
    pub xml_attribute: bool,
    /// Flattened-list flag; only meaningful when `target` is a list shape.
    pub flattened: bool,
    /// Member-level XML namespace; takes priority over the target shape's.
    pub xml_namespace: Option<XmlNamespace>,
}

impl Member {
    /// Creates a member edge with no overrides.
    pub fn new(name: impl Into<String>, target: ShapeId, required: bool) -> Self {
        Self {
            name: name.into(),
            target,
            required,
            location_name: None,
            xml_attribute: false,
            flattened: false,
            xml_namespace: None,
        }
    }

    /// The element/attribute name this member serializes under: the wire
    /// location-name override when present, otherwise the member name.
    pub fn wire_name(&self) -> &str {
        self.location_name.as_deref().unwrap_or(&self.name)
    }
}

/// One node in the service's type graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Shape name, unique within a service.
    pub name: String,
    /// Whether this shape carries a streamed payload.
    pub streaming: bool,
    /// Shape-level XML namespace declaration.
    pub xml_namespace: Option<XmlNamespace>,
    /// The shape's structural kind.
    pub kind: ShapeKind,
}

/// The closed set of shape kinds.
///
/// Dispatch over shape kinds is always an exhaustive `match`; an unhandled
/// kind in a given position is a generation-time error, never a silent
/// fallthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// A scalar leaf carrying one of the scalar wire tags.
    Scalar {
        /// The scalar's wire type tag.
        wire: WireType,
    },
    /// A structure with named members.
    Structure {
        /// The structure's member edges, in declaration order.
        members: Vec<Member>,
        /// Whether this structure is the root of a wire payload and gets a
        /// serializer emitted for it.
        payload_root: bool,
    },
    /// A homogeneous list.
    List {
        /// The element slot: naming and target shape for each item.
        member: Member,
        /// Shape-level flattening: serialize items as siblings with no
        /// wrapper element.
        flattened: bool,
    },
    /// A map from scalar keys to values.
    Map {
        /// The key slot.
        key: Member,
        /// The value slot.
        value: Member,
    },
}

impl Shape {
    /// Creates a scalar shape.
    pub fn scalar(name: impl Into<String>, wire: WireType) -> Self {
        Self {
            name: name.into(),
            streaming: false,
            xml_namespace: None,
            kind: ShapeKind::Scalar { wire },
        }
    }

    /// Creates a structure shape.
    pub fn structure(name: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            name: name.into(),
            streaming: false,
            xml_namespace: None,
            kind: ShapeKind::Structure {
                members,
                payload_root: false,
            },
        }
    }

    /// Creates a list shape.
    pub fn list(name: impl Into<String>, member: Member, flattened: bool) -> Self {
        Self {
            name: name.into(),
            streaming: false,
            xml_namespace: None,
            kind: ShapeKind::List { member, flattened },
        }
    }

    /// Returns the wire type tag for this shape.
    pub fn wire_type(&self) -> WireType {
        match &self.kind {
            ShapeKind::Scalar { wire } => *wire,
            ShapeKind::Structure { .. } => WireType::Structure,
            ShapeKind::List { .. } => WireType::List,
            ShapeKind::Map { .. } => WireType::Map,
        }
    }

    /// Returns the structure members, or an empty slice for non-structures.
    pub fn members(&self) -> &[Member] {
        match &self.kind {
            ShapeKind::Structure { members, .. } => members,
            _ => &[],
        }
    }

    /// Returns `true` if this is a structure marked as a wire payload root.
    pub fn is_payload_root(&self) -> bool {
        matches!(
            self.kind,
            ShapeKind::Structure {
                payload_root: true,
                ..
            }
        )
    }
}
