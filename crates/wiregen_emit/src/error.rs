//! Error types for source-text emission.

/// Errors raised while emitting generated source text.
///
/// Emission errors are fatal for the service being generated: they mean the
/// emission rule set is incomplete relative to the schema, and a partially
/// generated client is worse than a failed build.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// A shape/member combination has no emission rule.
    #[error("unsupported schema: shape `{shape}`, member `{member}`: {reason}")]
    SchemaUnsupported {
        /// The shape being emitted when the rule set ran out.
        shape: String,
        /// The member being emitted, or `<root>` for shape-level failures.
        member: String,
        /// What was missing a rule.
        reason: String,
    },
}

impl EmitError {
    /// Creates a `SchemaUnsupported` error.
    pub fn unsupported(
        shape: impl Into<String>,
        member: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::SchemaUnsupported {
            shape: shape.into(),
            member: member.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_shape_and_member() {
        let err = EmitError::unsupported("Tag", "Enabled", "boolean members cannot be attributes");
        let msg = err.to_string();
        assert!(msg.contains("Tag"));
        assert!(msg.contains("Enabled"));
        assert!(msg.contains("boolean members cannot be attributes"));
    }
}
