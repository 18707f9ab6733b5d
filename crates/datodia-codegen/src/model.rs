//! Values flowing between pipeline stages.
//!
//! Everything here is memoized by salsa, so every type implements the traits
//! salsa needs (Clone, PartialEq, Eq, Hash) and equality is purely structural.

use std::fmt;
use std::path::PathBuf;

/// Describes one builder the container must register.
///
/// The `(full_type_name, builder_name, namespace)` triple identifies the
/// builder; see [`BuilderDefinition::key`]. Equality also compares the record
/// constructor so that a changed field list invalidates generated sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuilderDefinition {
    /// Type expression of the produced type, valid anywhere in the host crate.
    pub full_type_name: String,
    /// Simple name of the builder struct.
    pub builder_name: String,
    /// Module path of the builder, joined by `::`.
    ///
    /// Crate-relative unless it starts with `::`; empty for the crate root.
    pub namespace: String,
    /// How to construct the produced record (records only).
    pub constructor: Option<Constructor>,
}

impl BuilderDefinition {
    /// Create a definition without constructor metadata.
    pub fn new(
        full_type_name: impl Into<String>,
        builder_name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            full_type_name: full_type_name.into(),
            builder_name: builder_name.into(),
            namespace: namespace.into(),
            constructor: None,
        }
    }

    /// Attach record constructor metadata.
    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    /// The identity triple used for de-duplication.
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.full_type_name, &self.builder_name, &self.namespace)
    }

    /// Path of the builder struct as seen from anywhere in the host crate.
    pub fn builder_path(&self) -> String {
        if self.namespace.is_empty() {
            format!("crate::{}", self.builder_name)
        } else if self.namespace.starts_with("::") {
            format!("{}::{}", self.namespace, self.builder_name)
        } else {
            format!("crate::{}::{}", self.namespace, self.builder_name)
        }
    }

    /// Constructor parameters in declared order (empty unless a record).
    pub fn parameters(&self) -> &[Parameter] {
        self.constructor
            .as_ref()
            .map(Constructor::parameters)
            .unwrap_or_default()
    }
}

impl fmt::Display for BuilderDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.full_type_name, self.builder_path())
    }
}

/// How a record value is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constructor {
    /// `struct Person;`
    Unit,
    /// `struct Meters(pub f64);`
    Tuple(Vec<Parameter>),
    /// `struct City { pub zip_code: i32 }`
    Named(Vec<Parameter>),
}

impl Constructor {
    pub fn parameters(&self) -> &[Parameter] {
        match self {
            Self::Unit => &[],
            Self::Tuple(params) | Self::Named(params) => params,
        }
    }
}

/// A single constructor parameter of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    /// Field name, or the position for tuple structs.
    pub name: String,
    /// Resolved type expression.
    pub ty: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// Severity of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Error,
}

/// A problem found while extracting builder definitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    /// Stable code, e.g. `DTD001`.
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
    pub path: PathBuf,
    /// 1-based line, 0 when unknown.
    pub line: usize,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(
            f,
            "{}[{}]: {} ({}:{})",
            severity,
            self.code,
            self.message,
            self.path.display(),
            self.line
        )
    }
}

/// Diagnostic codes.
pub mod codes {
    /// The source file could not be parsed.
    pub const UNPARSABLE_FILE: &str = "DTD000";
    /// A marked struct does not implement the builder capability.
    pub const MISSING_CAPABILITY: &str = "DTD001";
    /// A marked struct implements the builder capability more than once.
    pub const AMBIGUOUS_CAPABILITY: &str = "DTD002";
    /// A marked struct is generic and cannot be instantiated by the container.
    pub const GENERIC_BUILDER: &str = "DTD003";
    /// A type the generated code would have to name is private to its module.
    pub const UNREACHABLE_TYPE: &str = "DTD004";
}

/// Output of one extraction rule over one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Extraction {
    pub definitions: Vec<BuilderDefinition>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A generated source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneratedSource {
    /// Deterministic file name, e.g. `container.rs`.
    pub hint_name: String,
    /// Module the text must be placed in, relative to the crate root.
    pub module_path: Vec<String>,
    pub text: String,
}
