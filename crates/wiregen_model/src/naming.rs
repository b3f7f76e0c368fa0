//! The naming-resolver seam between the shape model and generated code.
//!
//! A [`ClassNamer`] deterministically maps a shape name and a [`ClassRole`]
//! to the class identity (name + package path) the generated code lives
//! under. The generation pass and the orphan collector must share one namer
//! so the paths they derive always agree.

use serde::{Deserialize, Serialize};

/// The role a generated class plays in the client surface.
///
/// Each role corresponds to a generated-only bucket directory that the
/// orphan collector is allowed to sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassRole {
    /// Request input class.
    Input,
    /// Operation result class.
    Result,
    /// Modeled service exception.
    Exception,
    /// String enum class.
    Enum,
    /// Nested value object.
    Object,
}

impl ClassRole {
    /// All generated-only bucket roles, in sweep order.
    pub const BUCKETS: [ClassRole; 5] = [
        ClassRole::Enum,
        ClassRole::Exception,
        ClassRole::Input,
        ClassRole::Result,
        ClassRole::Object,
    ];

    /// The package segment this role's classes live under.
    pub fn segment(self) -> &'static str {
        match self {
            ClassRole::Input => "Input",
            ClassRole::Result => "Result",
            ClassRole::Exception => "Exception",
            ClassRole::Enum => "Enum",
            ClassRole::Object => "ValueObject",
        }
    }
}

/// The identity of one generated class: short name plus package path.
///
/// The package path's leading segment is always the service name; output
/// placement derives the on-disk directory from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassName {
    /// The class's short name (file stem of the generated source file).
    pub name: String,
    /// Package path segments, service name first.
    pub package: Vec<String>,
}

impl ClassName {
    /// Creates a class name from a short name and package segments.
    pub fn new(name: impl Into<String>, package: Vec<String>) -> Self {
        Self {
            name: name.into(),
            package,
        }
    }

    /// The fully-qualified class name, `\`-joined.
    pub fn fully_qualified(&self) -> String {
        let mut fq = self.package.join("\\");
        if !fq.is_empty() {
            fq.push('\\');
        }
        fq.push_str(&self.name);
        fq
    }

    /// The service segment (first package segment), if any.
    pub fn service(&self) -> Option<&str> {
        self.package.first().map(String::as_str)
    }
}

/// Deterministic, pure mapping from shapes to class identities.
///
/// Implementations must be stable across a run: generation and orphan
/// reconstruction both go through this trait and must produce identical
/// answers for identical inputs.
pub trait ClassNamer {
    /// Resolves the class a shape's generated code belongs to.
    fn resolve(&self, shape_name: &str, role: ClassRole) -> ClassName;

    /// The package path of a generated-only bucket directory.
    fn bucket_package(&self, role: ClassRole) -> Vec<String>;
}

/// The conventional per-service namer: `<Service>\<Bucket>\<ShapeName><Suffix>`.
///
/// Input and Result classes get a role suffix unless the shape name already
/// carries it; other roles use the shape name as-is.
#[derive(Debug, Clone)]
pub struct ServiceNamer {
    service: String,
}

impl ServiceNamer {
    /// Creates a namer for the given service name.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// The service this namer resolves for.
    pub fn service(&self) -> &str {
        &self.service
    }

    fn class_name_for(shape_name: &str, role: ClassRole) -> String {
        let suffix = match role {
            ClassRole::Input => "Input",
            ClassRole::Result => "Result",
            ClassRole::Exception | ClassRole::Enum | ClassRole::Object => "",
        };
        if suffix.is_empty() || shape_name.ends_with(suffix) {
            shape_name.to_string()
        } else {
            format!("{shape_name}{suffix}")
        }
    }
}

impl ClassNamer for ServiceNamer {
    fn resolve(&self, shape_name: &str, role: ClassRole) -> ClassName {
        ClassName::new(
            Self::class_name_for(shape_name, role),
            self.bucket_package(role),
        )
    }

    fn bucket_package(&self, role: ClassRole) -> Vec<String> {
        vec![self.service.clone(), role.segment().to_string()]
    }
}
