//! Syntax lowering.
//!
//! Parses source files with `syn` and lowers the declarations the generator
//! cares about into hashable values.

mod parser;
mod types;

pub use parser::SourceParser;
pub use types::{
    DeclaredItem, FieldNode, FileSyntax, ImplNode, ModuleDecl, StructNode, StructShape, Visibility,
};
