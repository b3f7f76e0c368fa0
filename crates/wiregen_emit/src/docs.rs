//! phpdoc array-shape documentation for a structure's member layout.
//!
//! The rendering differs by direction on purpose: on the input side an
//! absent member is an optional key (`Name?: type`, the caller may simply
//! not construct it), while on the result side it is a nullable value
//! (`Name: null|type`, the key always exists but may hold null). Collapsing
//! the two would misdocument one direction.

use wiregen_model::{ClassNamer, ClassRole, Member, ShapeGraph, ShapeId, ShapeKind, WireType};

use crate::error::EmitError;
use crate::types::{map_type, scalar_php_type};

/// Options controlling how a structure's members are documented.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocOptions {
    /// Document structure members as a class-or-array union (`Tag|array`),
    /// for input positions that accept either form.
    pub allow_alternate_class: bool,
    /// Force every member nullable regardless of its required flag.
    pub force_all_nullable: bool,
    /// Render result-side nullability (`null|type`) instead of input-side
    /// optional keys (`Name?:`).
    pub result_context: bool,
}

/// Renders the phpdoc array-shape block for a structure's members.
///
/// A structure with no members documents the raw-map fallback
/// `array<string, mixed>` instead of an empty shape block.
pub fn document_members(
    graph: &ShapeGraph,
    structure: ShapeId,
    namer: &dyn ClassNamer,
    opts: DocOptions,
) -> Result<String, EmitError> {
    let shape = graph.shape(structure);
    let ShapeKind::Structure { members, .. } = &shape.kind else {
        return Err(EmitError::unsupported(
            &shape.name,
            "<root>",
            "only structures have documentable member layouts",
        ));
    };

    if members.is_empty() {
        return Ok("array<string, mixed>".to_string());
    }

    let mut out = String::from("array{\n");
    for member in members {
        let ty = member_doc_type(graph, &shape.name, member, namer, opts)?;
        let nullable = !member.required || opts.force_all_nullable;
        let line = match (opts.result_context, nullable) {
            (false, true) => format!("  {}?: {ty},\n", member.name),
            (true, true) => format!("  {}: null|{ty},\n", member.name),
            (_, false) => format!("  {}: {ty},\n", member.name),
        };
        out.push_str(&line);
    }
    out.push('}');
    Ok(out)
}

/// Picks the documentation fragment for one member, by kind.
fn member_doc_type(
    graph: &ShapeGraph,
    owner_shape: &str,
    member: &Member,
    namer: &dyn ClassNamer,
    opts: DocOptions,
) -> Result<String, EmitError> {
    let target = graph.shape(member.target);
    match &target.kind {
        ShapeKind::Structure { .. } => {
            let class = namer.resolve(&target.name, ClassRole::Object);
            if opts.allow_alternate_class {
                Ok(format!("{}|array", class.name))
            } else {
                Ok(class.name)
            }
        }
        ShapeKind::List { .. } | ShapeKind::Map { .. } => {
            Ok(map_type(graph, member.target, namer)?.doc_type)
        }
        ShapeKind::Scalar { wire } => {
            if target.streaming {
                return Ok(if opts.result_context {
                    "string".to_string()
                } else {
                    "string|resource|callable".to_string()
                });
            }
            if *wire == WireType::Timestamp {
                return Ok(if opts.result_context {
                    "\\DateTimeImmutable".to_string()
                } else {
                    "\\DateTimeImmutable|string".to_string()
                });
            }
            let (_, doc) = scalar_php_type(*wire).ok_or_else(|| {
                EmitError::unsupported(
                    owner_shape,
                    &member.name,
                    format!("no documentation fragment for wire tag `{}`", wire.as_str()),
                )
            })?;
            Ok(doc.to_string())
        }
    }
}
