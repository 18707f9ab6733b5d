//! Lowered syntax nodes.
//!
//! `syn` trees cannot be memoized (they are neither `Send` nor `Sync`), so each
//! file is lowered into these plain values once per edit. Type references are
//! already resolved against the declaring scope.

/// Visibility of a declaration, as far as the generated code is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// `pub`
    Public,
    /// `pub(crate)`
    Crate,
    /// `pub(super)`, `pub(in path)`
    Restricted,
    /// No visibility modifier, or `pub(self)`.
    Private,
}

impl Visibility {
    /// Whether the generated code can name the item from any module.
    pub fn is_crate_visible(self) -> bool {
        matches!(self, Self::Public | Self::Crate)
    }
}

/// A field of a struct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldNode {
    /// `None` for tuple fields.
    pub name: Option<String>,
    /// Resolved type expression.
    pub ty: String,
    pub visibility: Visibility,
    /// Crate-local paths named anywhere in the type, e.g. both
    /// `crate::models::City` and `crate::models::Zip` for
    /// `Vec<(City, Zip)>`.
    pub type_paths: Vec<String>,
}

/// The field layout of a struct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StructShape {
    Unit,
    Tuple(Vec<FieldNode>),
    Named(Vec<FieldNode>),
}

impl StructShape {
    pub fn fields(&self) -> &[FieldNode] {
        match self {
            Self::Unit => &[],
            Self::Tuple(fields) | Self::Named(fields) => fields,
        }
    }
}

/// A `struct` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructNode {
    pub name: String,
    /// Inline `mod` blocks enclosing the struct, outermost first.
    pub scope: Vec<String>,
    /// Whether the enclosing inline modules can be named from the crate
    /// root's children.
    pub scope_visible: bool,
    /// Attribute paths as written, e.g. `derive` or `datodia::type_builder`.
    pub attributes: Vec<String>,
    pub is_generic: bool,
    pub visibility: Visibility,
    pub shape: StructShape,
    /// 1-based line of the struct name.
    pub line: usize,
}

impl StructNode {
    /// Whether any attribute path ends with `marker`.
    pub fn has_attribute(&self, marker: &str) -> bool {
        self.attributes
            .iter()
            .any(|path| path.rsplit("::").next() == Some(marker))
    }
}

/// A trait `impl` block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImplNode {
    /// Resolved path of the implementing type.
    pub self_ty: String,
    /// Resolved trait path, followed by alternatives reachable through glob
    /// imports when the path could not be resolved directly.
    pub trait_candidates: Vec<String>,
    /// Resolved generic arguments of the trait's last path segment.
    pub type_args: Vec<String>,
    pub is_generic: bool,
}

/// A named type or trait declared in a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclaredItem {
    /// Absolute path, e.g. `crate::models::City`.
    pub path: String,
    /// Whether code outside the declaring module can name the item.
    pub reachable: bool,
}

/// A file module declaration (`mod name;`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleDecl {
    pub name: String,
    /// Inline `mod` blocks enclosing the declaration, outermost first.
    pub scope: Vec<String>,
    /// Visibility of each enclosing inline module.
    pub scope_visibility: Vec<Visibility>,
    pub visibility: Visibility,
    /// Value of a `#[path = "..."]` attribute.
    pub path_attr: Option<String>,
}

/// A source file lowered for the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FileSyntax {
    pub structs: Vec<StructNode>,
    pub impls: Vec<ImplNode>,
    pub items: Vec<DeclaredItem>,
}

impl FileSyntax {
    /// Whether the file itself declares the item at `path`.
    pub fn declares(&self, path: &str) -> bool {
        self.items.iter().any(|item| item.path == path)
    }
}
