//! Source parser using syn to lower struct and impl declarations.

use std::path::Path;

use syn::{Attribute, Expr, ExprLit, Field, Fields, File, Item, ItemImpl, ItemStruct, Lit, Meta};

use super::types::{
    DeclaredItem, FieldNode, FileSyntax, ImplNode, ModuleDecl, StructNode, StructShape, Visibility,
};
use crate::error::{Error, Result};
use crate::symbols::Resolver;

/// Parser for lowering the declarations of one Rust source file.
pub struct SourceParser {
    /// Module path of the file, relative to the crate root.
    module_path: Vec<String>,
    /// Whether the file's module can be named from the crate root's children.
    module_visible: bool,
    /// Lowered structs.
    structs: Vec<StructNode>,
    /// Lowered trait impls.
    impls: Vec<ImplNode>,
    /// Declared types and traits.
    items: Vec<DeclaredItem>,
}

impl SourceParser {
    /// Create a parser for a file at `module_path`.
    pub fn new(module_path: &[String]) -> Self {
        Self {
            module_path: module_path.to_vec(),
            module_visible: true,
            structs: Vec::new(),
            impls: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Mark the file's module as private to some ancestor.
    pub fn module_visible(mut self, visible: bool) -> Self {
        self.module_visible = visible;
        self
    }

    /// Parse source code and lower its declarations.
    pub fn parse_str(&mut self, source: &str, path: &Path) -> Result<FileSyntax> {
        self.structs.clear();
        self.impls.clear();
        self.items.clear();

        let file = parse_file(source, path)?;
        let resolver = Resolver::new(&self.module_path, &file);
        self.lower_items(&resolver, &[], self.module_visible, &file.items);

        Ok(FileSyntax {
            structs: std::mem::take(&mut self.structs),
            impls: std::mem::take(&mut self.impls),
            items: std::mem::take(&mut self.items),
        })
    }

    /// Parse source code and collect its file module declarations.
    ///
    /// Declarations behind `#[cfg(...)]`, on the declaration itself or on an
    /// enclosing inline module, are skipped.
    pub fn parse_modules(source: &str, path: &Path) -> Result<Vec<ModuleDecl>> {
        let file = parse_file(source, path)?;
        let mut modules = Vec::new();
        collect_modules(&[], &[], &file.items, &mut modules);
        Ok(modules)
    }

    /// Lower the items of one module. `scope` lists the enclosing inline
    /// modules.
    fn lower_items(
        &mut self,
        resolver: &Resolver,
        scope: &[String],
        scope_visible: bool,
        items: &[Item],
    ) {
        let mut absolute = self.module_path.clone();
        absolute.extend(scope.iter().cloned());
        // Private items directly under the crate root are still visible to
        // the root's other children.
        let at_root = self.module_path.is_empty() && scope.is_empty();

        for item in items {
            if let Some((name, vis)) = declared_item(item) {
                let visible = at_root || lower_visibility(vis).is_crate_visible();
                self.items.push(DeclaredItem {
                    path: format!("crate::{}", join_path(&absolute, &name)),
                    reachable: scope_visible && visible,
                });
            }

            match item {
                Item::Struct(item) if !is_conditional(&item.attrs) => {
                    let mut node = Self::lower_struct(resolver, scope, &absolute, item);
                    node.scope_visible = scope_visible;
                    self.structs.push(node);
                }
                Item::Impl(item) if !is_conditional(&item.attrs) => {
                    if let Some(node) = Self::lower_impl(resolver, &absolute, item) {
                        self.impls.push(node);
                    }
                }
                Item::Mod(module) if !is_conditional(&module.attrs) => {
                    if let Some((_, inner)) = &module.content {
                        let visible = scope_visible
                            && (at_root || lower_visibility(&module.vis).is_crate_visible());
                        let mut child = scope.to_vec();
                        child.push(module.ident.to_string());
                        self.lower_items(resolver, &child, visible, inner);
                    }
                }
                _ => {}
            }
        }
    }

    fn lower_struct(
        resolver: &Resolver,
        scope: &[String],
        absolute: &[String],
        item: &ItemStruct,
    ) -> StructNode {
        let lower_field = |field: &Field| FieldNode {
            name: field.ident.as_ref().map(ToString::to_string),
            ty: resolver.render_type(absolute, &field.ty),
            visibility: lower_visibility(&field.vis),
            type_paths: resolver.crate_paths(absolute, &field.ty),
        };

        let shape = match &item.fields {
            Fields::Unit => StructShape::Unit,
            Fields::Unnamed(fields) => {
                StructShape::Tuple(fields.unnamed.iter().map(lower_field).collect())
            }
            Fields::Named(fields) => {
                StructShape::Named(fields.named.iter().map(lower_field).collect())
            }
        };

        StructNode {
            name: item.ident.to_string(),
            scope: scope.to_vec(),
            scope_visible: true,
            attributes: item.attrs.iter().map(attribute_path).collect(),
            is_generic: !item.generics.params.is_empty(),
            visibility: lower_visibility(&item.vis),
            shape,
            line: item.ident.span().start().line,
        }
    }

    /// Lower a trait impl. Inherent and negative impls are ignored.
    fn lower_impl(resolver: &Resolver, absolute: &[String], item: &ItemImpl) -> Option<ImplNode> {
        let (negative, trait_path, _) = item.trait_.as_ref()?;
        if negative.is_some() {
            return None;
        }

        Some(ImplNode {
            self_ty: resolver.render_type(absolute, &item.self_ty),
            trait_candidates: resolver.path_candidates(absolute, trait_path),
            type_args: resolver.type_arguments(absolute, trait_path),
            is_generic: !item.generics.params.is_empty(),
        })
    }
}

impl Default for SourceParser {
    fn default() -> Self {
        Self::new(&[])
    }
}

fn parse_file(source: &str, path: &Path) -> Result<File> {
    syn::parse_str(source)
        .map_err(|e| Error::Parse(format!("Failed to parse {}: {}", path.display(), e)))
}

fn collect_modules(
    scope: &[String],
    scope_visibility: &[Visibility],
    items: &[Item],
    out: &mut Vec<ModuleDecl>,
) {
    for item in items {
        let Item::Mod(module) = item else {
            continue;
        };
        if is_conditional(&module.attrs) {
            continue;
        }

        let name = module.ident.to_string();
        let visibility = lower_visibility(&module.vis);
        match &module.content {
            None => out.push(ModuleDecl {
                name,
                scope: scope.to_vec(),
                scope_visibility: scope_visibility.to_vec(),
                visibility,
                path_attr: path_attribute(&module.attrs),
            }),
            Some((_, inner)) => {
                let mut child = scope.to_vec();
                child.push(name);
                let mut child_visibility = scope_visibility.to_vec();
                child_visibility.push(visibility);
                collect_modules(&child, &child_visibility, inner, out);
            }
        }
    }
}

/// Name and visibility of a type or trait item that is not cfg-gated.
fn declared_item(item: &Item) -> Option<(String, &syn::Visibility)> {
    let (attrs, ident, vis) = match item {
        Item::Struct(item) => (&item.attrs, &item.ident, &item.vis),
        Item::Enum(item) => (&item.attrs, &item.ident, &item.vis),
        Item::Union(item) => (&item.attrs, &item.ident, &item.vis),
        Item::Type(item) => (&item.attrs, &item.ident, &item.vis),
        Item::Trait(item) => (&item.attrs, &item.ident, &item.vis),
        _ => return None,
    };
    (!is_conditional(attrs)).then(|| (ident.to_string(), vis))
}

fn join_path(absolute: &[String], name: &str) -> String {
    let mut segments = absolute.to_vec();
    segments.push(name.to_string());
    segments.join("::")
}

/// `#[path = "..."]` on a module declaration.
fn path_attribute(attrs: &[Attribute]) -> Option<String> {
    attrs.iter().find_map(|attr| match &attr.meta {
        Meta::NameValue(meta) if meta.path.is_ident("path") => match &meta.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(value),
                ..
            }) => Some(value.value()),
            _ => None,
        },
        _ => None,
    })
}

/// Items behind `#[cfg(...)]` may not exist in the build the generated code
/// is compiled into.
fn is_conditional(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident("cfg"))
}

fn attribute_path(attr: &Attribute) -> String {
    attr.path()
        .segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}

fn lower_visibility(vis: &syn::Visibility) -> Visibility {
    match vis {
        syn::Visibility::Public(_) => Visibility::Public,
        syn::Visibility::Inherited => Visibility::Private,
        syn::Visibility::Restricted(restricted) => {
            if restricted.path.is_ident("crate") {
                Visibility::Crate
            } else if restricted.path.is_ident("self") {
                Visibility::Private
            } else {
                Visibility::Restricted
            }
        }
    }
}
