//! Assembles emitted fragments into a committable PHP input class.
//!
//! The class text is what the staging pipeline fingerprints and writes; the
//! interesting semantics all live in [`crate::xml`] and [`crate::docs`].

use wiregen_model::{ClassName, ClassNamer, ClassRole, ShapeGraph, ShapeId};

use crate::docs::{document_members, DocOptions};
use crate::error::EmitError;
use crate::xml::emit_document;

/// One rendered class, ready for output placement.
#[derive(Debug, Clone)]
pub struct GeneratedClass {
    /// The class identity the naming resolver assigned.
    pub class: ClassName,
    /// The complete PHP source text.
    pub source: String,
}

/// Renders the input class for a payload-root structure.
///
/// The class carries the member-layout doc block (input side, alternate
/// classes allowed) and a `requestBody` method holding the emitted XML
/// serializer.
pub fn render_input_class(
    graph: &ShapeGraph,
    root: ShapeId,
    namer: &dyn ClassNamer,
) -> Result<GeneratedClass, EmitError> {
    let shape = graph.shape(root);
    let class = namer.resolve(&shape.name, ClassRole::Input);
    let doc = document_members(
        graph,
        root,
        namer,
        DocOptions {
            allow_alternate_class: true,
            ..DocOptions::default()
        },
    )?;
    let body = emit_document(graph, root, namer)?;

    let mut source = String::new();
    source.push_str("<?php\n\n");
    source.push_str(&format!("namespace {};\n\n", class.package.join("\\")));
    source.push_str("use Wiregen\\Runtime\\MissingParameter;\n\n");
    source.push_str("/**\n");
    source.push_str(&format!(" * Wire payload input for `{}`.\n", shape.name));
    source.push_str(" *\n");
    push_param_doc(&mut source, &doc);
    source.push_str(" */\n");
    source.push_str(&format!("final class {}\n", class.name));
    source.push_str("{\n");
    source.push_str("    /**\n");
    source.push_str("     * Serializes this input into its XML request body.\n");
    source.push_str("     */\n");
    source.push_str("    public function requestBody($input): string\n");
    source.push_str("    {\n");
    for line in body.lines() {
        if line.is_empty() {
            source.push('\n');
        } else {
            source.push_str("        ");
            source.push_str(line);
            source.push('\n');
        }
    }
    source.push_str("    }\n");
    source.push_str("}\n");

    Ok(GeneratedClass { class, source })
}

/// Renders the `@param` tag around a possibly multi-line array-shape doc.
fn push_param_doc(source: &mut String, doc: &str) {
    let mut lines = doc.lines();
    let Some(first) = lines.next() else {
        return;
    };
    let rest: Vec<&str> = lines.collect();
    if rest.is_empty() {
        // Single-line fallback, e.g. `array<string, mixed>`.
        source.push_str(&format!(" * @param {first} $input\n"));
        return;
    }
    source.push_str(&format!(" * @param {first}\n"));
    for line in &rest[..rest.len() - 1] {
        source.push_str(&format!(" * {line}\n"));
    }
    source.push_str(&format!(" * {} $input\n", rest[rest.len() - 1]));
}
