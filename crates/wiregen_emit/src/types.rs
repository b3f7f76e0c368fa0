//! Shape-to-PHP type mapping.
//!
//! Scalars go through a fixed table; structures map to the class the naming
//! resolver assigns; lists and maps map recursively through their element
//! shape, forming an "array of X" type.

use wiregen_model::{ClassName, ClassNamer, ClassRole, ShapeGraph, ShapeId, ShapeKind, WireType};

use crate::error::EmitError;

/// The PHP mapping of one shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    /// The runtime type hint (`string`, `array`, a class short name, ...).
    pub runtime_type: String,
    /// The phpdoc type, with an array suffix for list/map element classes.
    pub doc_type: String,
    /// The generated class this type refers to, when the shape (or its
    /// element shape) is a structure.
    pub referenced_class: Option<ClassName>,
}

/// Looks up the fixed scalar table: `(runtime type, doc type)`.
///
/// Returns `None` for non-scalar wire tags, which have no table entry.
pub(crate) fn scalar_php_type(wire: WireType) -> Option<(&'static str, &'static str)> {
    match wire {
        WireType::String => Some(("string", "string")),
        WireType::Integer | WireType::Long => Some(("int", "int")),
        WireType::Float | WireType::Double => Some(("float", "float")),
        WireType::Boolean => Some(("bool", "bool")),
        WireType::Blob => Some(("string", "string")),
        WireType::Timestamp => Some(("\\DateTimeImmutable", "\\DateTimeImmutable")),
        WireType::List | WireType::Map | WireType::Structure => None,
    }
}

/// Maps a shape to its PHP runtime type, doc type, and referenced class.
///
/// Fatal `SchemaUnsupported` for a scalar carrying a wire tag with no table
/// entry — an unknown tag means the table is incomplete, not that the shape
/// should degrade to `mixed`.
pub fn map_type(
    graph: &ShapeGraph,
    id: ShapeId,
    namer: &dyn ClassNamer,
) -> Result<MappedType, EmitError> {
    let shape = graph.shape(id);
    match &shape.kind {
        ShapeKind::Scalar { wire } => {
            let (runtime, doc) = scalar_php_type(*wire).ok_or_else(|| {
                EmitError::unsupported(
                    &shape.name,
                    "<root>",
                    format!("scalar shape carries non-scalar wire tag `{}`", wire.as_str()),
                )
            })?;
            Ok(MappedType {
                runtime_type: runtime.to_string(),
                doc_type: doc.to_string(),
                referenced_class: None,
            })
        }
        ShapeKind::Structure { .. } => {
            let class = namer.resolve(&shape.name, ClassRole::Object);
            Ok(MappedType {
                runtime_type: class.name.clone(),
                doc_type: class.name.clone(),
                referenced_class: Some(class),
            })
        }
        ShapeKind::List { member, .. } => {
            let inner = map_type(graph, member.target, namer)?;
            Ok(MappedType {
                runtime_type: "array".to_string(),
                doc_type: format!("{}[]", inner.doc_type),
                referenced_class: inner.referenced_class,
            })
        }
        ShapeKind::Map { value, .. } => {
            let inner = map_type(graph, value.target, namer)?;
            Ok(MappedType {
                runtime_type: "array".to_string(),
                doc_type: format!("{}[]", inner.doc_type),
                referenced_class: inner.referenced_class,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiregen_model::{Member, ServiceNamer, Shape};

    fn namer() -> ServiceNamer {
        ServiceNamer::new("S3")
    }

    #[test]
    fn scalar_table() {
        let mut g = ShapeGraph::new();
        let cases = [
            (WireType::String, "string"),
            (WireType::Integer, "int"),
            (WireType::Long, "int"),
            (WireType::Float, "float"),
            (WireType::Double, "float"),
            (WireType::Boolean, "bool"),
            (WireType::Blob, "string"),
            (WireType::Timestamp, "\\DateTimeImmutable"),
        ];
        for (wire, expected) in cases {
            let id = g.add(Shape::scalar(format!("S{}", wire.as_str()), wire));
            let mapped = map_type(&g, id, &namer()).unwrap();
            assert_eq!(mapped.runtime_type, expected);
            assert!(mapped.referenced_class.is_none());
        }
    }

    #[test]
    fn scalar_with_aggregate_tag_is_unsupported() {
        let mut g = ShapeGraph::new();
        let id = g.add(Shape::scalar("Broken", WireType::Map));
        let err = map_type(&g, id, &namer()).unwrap_err();
        assert!(err.to_string().contains("Broken"));
        assert!(err.to_string().contains("map"));
    }

    #[test]
    fn structure_maps_to_resolver_class() {
        let mut g = ShapeGraph::new();
        let id = g.add(Shape::structure("Tag", vec![]));
        let mapped = map_type(&g, id, &namer()).unwrap();
        assert_eq!(mapped.runtime_type, "Tag");
        let class = mapped.referenced_class.unwrap();
        assert_eq!(class.fully_qualified(), "S3\\ValueObject\\Tag");
    }

    #[test]
    fn list_of_structures_gets_array_suffix() {
        let mut g = ShapeGraph::new();
        let tag = g.add(Shape::structure("Tag", vec![]));
        let list = g.add(Shape::list("TagList", Member::new("member", tag, false), false));
        let mapped = map_type(&g, list, &namer()).unwrap();
        assert_eq!(mapped.runtime_type, "array");
        assert_eq!(mapped.doc_type, "Tag[]");
        assert!(mapped.referenced_class.is_some());
    }

    #[test]
    fn list_of_scalars_gets_array_suffix() {
        let mut g = ShapeGraph::new();
        let s = g.add(Shape::scalar("Str", WireType::String));
        let list = g.add(Shape::list("StrList", Member::new("member", s, false), false));
        let mapped = map_type(&g, list, &namer()).unwrap();
        assert_eq!(mapped.doc_type, "string[]");
        assert!(mapped.referenced_class.is_none());
    }

    #[test]
    fn nested_list_of_lists() {
        let mut g = ShapeGraph::new();
        let s = g.add(Shape::scalar("Str", WireType::String));
        let inner = g.add(Shape::list("Inner", Member::new("member", s, false), false));
        let outer = g.add(Shape::list("Outer", Member::new("member", inner, false), false));
        let mapped = map_type(&g, outer, &namer()).unwrap();
        assert_eq!(mapped.doc_type, "string[][]");
    }
}
