//! XML serializer emission.
//!
//! Compiles one payload-root structure into PHP statements that build a
//! complete `\DOMDocument` from an instance. Emission is recursive descent
//! over the member edges; the recursion is keyed on
//! `(member, shape, output_var, input_var)` and each level derives fresh
//! variable names by suffixing the parent names with the member name (or
//! the generic `item` placeholder inside list loops), so no two nesting
//! levels can collide.

use wiregen_model::{
    ClassName, ClassNamer, ClassRole, Member, ShapeGraph, ShapeId, ShapeKind, WireType,
    XmlNamespace,
};

use crate::error::EmitError;

/// Generic element name for anonymous list items.
const ITEM_PLACEHOLDER: &str = "member";

/// How a member's value is obtained at the current recursion level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadMode {
    /// Read from the owning instance through a getter; requiredness decides
    /// between a missing-parameter guard and a skip-if-absent wrapper.
    FromInstance,
    /// The input variable already holds the dereferenced value (a list
    /// item); trusted non-null, no guard.
    Dereferenced,
}

struct Emitter<'a> {
    graph: &'a ShapeGraph,
    namer: &'a dyn ClassNamer,
    /// Structures currently being inlined, to catch schema cycles.
    inlining: Vec<ShapeId>,
}

/// Emits the PHP body serializing a payload-root structure to XML.
///
/// The returned text assumes an `$input` variable holding the instance and
/// produces `return $document->saveXML();` as its final statement.
pub fn emit_document(
    graph: &ShapeGraph,
    root: ShapeId,
    namer: &dyn ClassNamer,
) -> Result<String, EmitError> {
    let shape = graph.shape(root);
    let ShapeKind::Structure { members, .. } = &shape.kind else {
        return Err(EmitError::unsupported(
            &shape.name,
            "<root>",
            "only structures can be wire payload roots",
        ));
    };

    let mut emitter = Emitter {
        graph,
        namer,
        inlining: vec![root],
    };
    let owner = namer.resolve(&shape.name, ClassRole::Input);

    let mut buf = String::new();
    line(&mut buf, 0, "$document = new \\DOMDocument('1.0', 'UTF-8');");
    line(&mut buf, 0, "$document->formatOutput = false;");
    line(
        &mut buf,
        0,
        &format!("$root = $document->createElement('{}');", shape.name),
    );
    line(&mut buf, 0, "$document->appendChild($root);");
    if let Some(ns) = &shape.xml_namespace {
        stamp_namespace(&mut buf, 0, "root", ns);
    }
    for member in members {
        emitter.member(&mut buf, 0, &owner, member, "root", "input", ReadMode::FromInstance)?;
    }
    line(&mut buf, 0, "");
    line(&mut buf, 0, "return $document->saveXML();");
    Ok(buf)
}

impl Emitter<'_> {
    /// Emits one member edge: obtains the value per `mode`, then hands the
    /// value to [`Self::value`].
    #[allow(clippy::too_many_arguments)]
    fn member(
        &mut self,
        buf: &mut String,
        depth: usize,
        owner: &ClassName,
        member: &Member,
        output_var: &str,
        input_var: &str,
        mode: ReadMode,
    ) -> Result<(), EmitError> {
        match mode {
            ReadMode::Dereferenced => {
                // The loop variable already holds the item; no guard.
                self.value(buf, depth, member, output_var, input_var)
            }
            ReadMode::FromInstance => {
                let value_var = format!("{input_var}_{}", member.name);
                let getter = format!("${input_var}->get{}()", member.name);
                if member.required {
                    line(buf, depth, &format!("if (null === ${value_var} = {getter}) {{"));
                    line(
                        buf,
                        depth + 1,
                        &format!(
                            "throw new MissingParameter(sprintf('Missing parameter \"{}\" for \"%s\". The value cannot be null.', \\{}::class));",
                            member.name,
                            owner.fully_qualified(),
                        ),
                    );
                    line(buf, depth, "}");
                    self.value(buf, depth, member, output_var, &value_var)
                } else {
                    // Absent optional members emit nothing, not an empty tag.
                    line(buf, depth, &format!("if (null !== ${value_var} = {getter}) {{"));
                    self.value(buf, depth + 1, member, output_var, &value_var)?;
                    line(buf, depth, "}");
                    Ok(())
                }
            }
        }
    }

    /// Emits the serialization of a non-null member value, dispatching on
    /// the target shape's kind.
    fn value(
        &mut self,
        buf: &mut String,
        depth: usize,
        member: &Member,
        output_var: &str,
        value_var: &str,
    ) -> Result<(), EmitError> {
        let shape = self.graph.shape(member.target);
        match &shape.kind {
            ShapeKind::Structure { members, .. } => {
                self.structure(buf, depth, member, &shape.name, members, output_var, value_var)
            }
            ShapeKind::List {
                member: inner,
                flattened,
            } => {
                let flattened = member.flattened || *flattened;
                self.list(
                    buf, depth, member, &shape.name, inner, flattened, output_var, value_var,
                )
            }
            ShapeKind::Map { .. } => Err(EmitError::unsupported(
                &shape.name,
                &member.name,
                "map shapes have no XML emission rule",
            )),
            ShapeKind::Scalar { wire } => {
                scalar(buf, depth, member, &shape.name, *wire, output_var, value_var)
            }
        }
    }

    /// Emits a nested structure: child element, namespace stamp, recursion
    /// into each child member.
    #[allow(clippy::too_many_arguments)]
    fn structure(
        &mut self,
        buf: &mut String,
        depth: usize,
        member: &Member,
        shape_name: &str,
        members: &[Member],
        output_var: &str,
        value_var: &str,
    ) -> Result<(), EmitError> {
        if self.inlining.contains(&member.target) {
            return Err(EmitError::unsupported(
                shape_name,
                &member.name,
                "structure recursively contains itself along this payload path",
            ));
        }

        let elem_var = format!("{output_var}_{}", member.name);
        let name = element_name(member);
        line(
            buf,
            depth,
            &format!("${elem_var} = $document->createElement('{name}');"),
        );
        line(buf, depth, &format!("${output_var}->appendChild(${elem_var});"));
        // Member-level namespace wins over the shape's own declaration.
        let shape_ns = self.graph.shape(member.target).xml_namespace.clone();
        if let Some(ns) = member.xml_namespace.as_ref().or(shape_ns.as_ref()) {
            stamp_namespace(buf, depth, &elem_var, ns);
        }

        let child_owner = self.namer.resolve(shape_name, ClassRole::Object);
        self.inlining.push(member.target);
        for child in members {
            self.member(
                buf,
                depth,
                &child_owner,
                child,
                &elem_var,
                value_var,
                ReadMode::FromInstance,
            )?;
        }
        self.inlining.pop();
        Ok(())
    }

    /// Emits a list in one of its two mutually exclusive modes.
    ///
    /// Flattened lists emit one sibling element per item directly into the
    /// parent, each named by the inner member's own rule. Wrapped lists emit
    /// one wrapper element named by the member's location name, holding one
    /// child per item. Swapping the modes is a wire-compatibility bug.
    #[allow(clippy::too_many_arguments)]
    fn list(
        &mut self,
        buf: &mut String,
        depth: usize,
        member: &Member,
        shape_name: &str,
        inner: &Member,
        flattened: bool,
        output_var: &str,
        value_var: &str,
    ) -> Result<(), EmitError> {
        let item_var = format!("{value_var}_item");
        if flattened {
            if member.xml_namespace.is_some() {
                return Err(EmitError::unsupported(
                    shape_name,
                    &member.name,
                    "namespace overrides on flattened list members are unsupported",
                ));
            }
            line(
                buf,
                depth,
                &format!("foreach (${value_var} as ${item_var}) {{"),
            );
            // Items keep the inner member's own naming rule; with no wrapper
            // they land as siblings on the parent element.
            self.member(
                buf,
                depth + 1,
                // Never read: dereferenced items carry no guard.
                &ClassName::new(shape_name, vec![]),
                inner,
                output_var,
                &item_var,
                ReadMode::Dereferenced,
            )?;
            line(buf, depth, "}");
        } else {
            let wrap_var = format!("{output_var}_{}", member.name);
            line(
                buf,
                depth,
                &format!("${wrap_var} = $document->createElement('{}');", member.wire_name()),
            );
            line(buf, depth, &format!("${output_var}->appendChild(${wrap_var});"));
            line(
                buf,
                depth,
                &format!("foreach (${value_var} as ${item_var}) {{"),
            );
            self.member(
                buf,
                depth + 1,
                &ClassName::new(shape_name, vec![]),
                inner,
                &wrap_var,
                &item_var,
                ReadMode::Dereferenced,
            )?;
            line(buf, depth, "}");
        }
        Ok(())
    }
}

/// Emits a scalar member value.
fn scalar(
    buf: &mut String,
    depth: usize,
    member: &Member,
    shape_name: &str,
    wire: WireType,
    output_var: &str,
    value_var: &str,
) -> Result<(), EmitError> {
    let name = element_name(member);
    match wire {
        WireType::String | WireType::Blob => {
            if member.xml_attribute {
                line(
                    buf,
                    depth,
                    &format!("${output_var}->setAttribute('{name}', ${value_var});"),
                );
            } else {
                line(
                    buf,
                    depth,
                    &format!(
                        "${output_var}->appendChild($document->createElement('{name}', ${value_var}));"
                    ),
                );
            }
            Ok(())
        }
        WireType::Boolean => {
            if member.xml_attribute {
                // No boolean-attribute rule exists; failing here beats
                // silently emitting a string attribute.
                return Err(EmitError::unsupported(
                    shape_name,
                    &member.name,
                    "boolean members cannot serialize as XML attributes",
                ));
            }
            line(
                buf,
                depth,
                &format!(
                    "${output_var}->appendChild($document->createElement('{name}', ${value_var} ? 'true' : 'false'));"
                ),
            );
            Ok(())
        }
        other => Err(EmitError::unsupported(
            shape_name,
            &member.name,
            format!("no XML emission rule for scalar kind `{}`", other.as_str()),
        )),
    }
}

/// The element/attribute name a member serializes under, with the generic
/// placeholder for anonymous list items.
fn element_name(member: &Member) -> &str {
    let name = member.wire_name();
    if name.is_empty() {
        ITEM_PLACEHOLDER
    } else {
        name
    }
}

fn stamp_namespace(buf: &mut String, depth: usize, elem_var: &str, ns: &XmlNamespace) {
    line(
        buf,
        depth,
        &format!(
            "${elem_var}->setAttribute('{}', '{}');",
            ns.attribute_name(),
            ns.uri
        ),
    );
}

fn line(buf: &mut String, depth: usize, text: &str) {
    if !text.is_empty() {
        for _ in 0..depth {
            buf.push_str("    ");
        }
        buf.push_str(text);
    }
    buf.push('\n');
}
