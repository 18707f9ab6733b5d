//! Name resolution for type paths within a single source file.
//!
//! This is a deliberately small subset of Rust's resolution rules: `use`
//! imports (including renames and groups), `self`/`super`/`crate` prefixes,
//! items declared in the same module, and glob imports of modules declared in
//! the same file. Anything else (primitives, the prelude, extern crates) is
//! kept as written.

use quote::ToTokens;
use rustc_hash::{FxHashMap, FxHashSet};
use syn::visit::{self, Visit};
use syn::{GenericArgument, Item, Path, PathArguments, ReturnType, Type, TypePath, UseTree};

/// Names visible in one module.
#[derive(Debug, Default)]
struct ScopeTable {
    /// Types and modules declared in the module.
    items: FxHashSet<String>,
    /// Import alias → absolute path segments.
    imports: FxHashMap<String, Vec<String>>,
    /// Absolute paths of glob imports.
    globs: Vec<Vec<String>>,
}

/// Resolves paths written in one file.
///
/// Scopes are identified by their absolute module path without the leading
/// `crate` segment (the file's module path followed by inline modules).
#[derive(Debug)]
pub struct Resolver {
    scopes: FxHashMap<Vec<String>, ScopeTable>,
}

impl Resolver {
    /// Build scope tables for every module of `file`.
    pub fn new(module_path: &[String], file: &syn::File) -> Self {
        let mut resolver = Self {
            scopes: FxHashMap::default(),
        };
        resolver.collect(module_path.to_vec(), &file.items);
        resolver
    }

    fn collect(&mut self, scope: Vec<String>, items: &[Item]) {
        let mut table = ScopeTable::default();

        for item in items {
            if let Some(name) = item_name(item) {
                table.items.insert(name);
            }
        }

        for item in items {
            if let Item::Use(item_use) = item {
                collect_use(
                    &scope,
                    &mut table,
                    item_use.leading_colon.is_some(),
                    Vec::new(),
                    &item_use.tree,
                );
            }
        }

        self.scopes.insert(scope.clone(), table);

        for item in items {
            if let Item::Mod(module) = item
                && let Some((_, inner)) = &module.content
            {
                let mut child = scope.clone();
                child.push(module.ident.to_string());
                self.collect(child, inner);
            }
        }
    }

    /// Render `ty` as seen from `scope`, with crate-local paths made absolute.
    pub fn render_type(&self, scope: &[String], ty: &Type) -> String {
        match ty {
            Type::Path(type_path) if type_path.qself.is_none() => {
                self.render_path(scope, &type_path.path)
            }
            Type::Tuple(tuple) => {
                let elems: Vec<String> = tuple
                    .elems
                    .iter()
                    .map(|elem| self.render_type(scope, elem))
                    .collect();
                if elems.len() == 1 {
                    format!("({},)", elems[0])
                } else {
                    format!("({})", elems.join(", "))
                }
            }
            Type::Reference(reference) => {
                let lifetime = reference
                    .lifetime
                    .as_ref()
                    .map(|lifetime| format!("{lifetime} "))
                    .unwrap_or_default();
                let mutability = if reference.mutability.is_some() {
                    "mut "
                } else {
                    ""
                };
                format!(
                    "&{}{}{}",
                    lifetime,
                    mutability,
                    self.render_type(scope, &reference.elem)
                )
            }
            Type::Slice(slice) => format!("[{}]", self.render_type(scope, &slice.elem)),
            Type::Array(array) => format!(
                "[{}; {}]",
                self.render_type(scope, &array.elem),
                normalize_tokens(&array.len.to_token_stream().to_string())
            ),
            Type::Paren(paren) => format!("({})", self.render_type(scope, &paren.elem)),
            Type::Group(group) => self.render_type(scope, &group.elem),
            Type::Ptr(ptr) => {
                let kind = if ptr.mutability.is_some() {
                    "mut"
                } else {
                    "const"
                };
                format!("*{} {}", kind, self.render_type(scope, &ptr.elem))
            }
            Type::Never(_) => "!".to_string(),
            other => normalize_tokens(&other.to_token_stream().to_string()),
        }
    }

    /// Render `path` (including generic arguments) as seen from `scope`.
    pub fn render_path(&self, scope: &[String], path: &Path) -> String {
        let idents = path_idents(path);
        let (mut parts, consumed) =
            self.resolve_head(scope, path.leading_colon.is_some(), &idents);

        if consumed > 0
            && let Some(last) = parts.last_mut()
        {
            last.push_str(&self.render_arguments(scope, &path.segments[consumed - 1].arguments));
        }

        for segment in path.segments.iter().skip(consumed) {
            parts.push(format!(
                "{}{}",
                segment.ident,
                self.render_arguments(scope, &segment.arguments)
            ));
        }

        parts.join("::")
    }

    /// Candidate absolute paths for a trait reference, without generic
    /// arguments.
    ///
    /// The first candidate is the resolved path. When the path could not be
    /// resolved, every glob import that might provide it adds a candidate.
    pub fn path_candidates(&self, scope: &[String], path: &Path) -> Vec<String> {
        let idents = path_idents(path);
        let leading_colon = path.leading_colon.is_some();
        let (mut parts, consumed) = self.resolve_head(scope, leading_colon, &idents);
        let unresolved = parts.is_empty() && consumed == 0;

        parts.extend(idents.iter().skip(consumed).cloned());
        let mut candidates = vec![parts.join("::")];

        if unresolved
            && !leading_colon
            && let Some(table) = self.scopes.get(scope)
        {
            for glob in &table.globs {
                if glob.first().map(String::as_str) == Some("crate") {
                    continue;
                }
                let mut candidate = glob.clone();
                candidate.extend(idents.iter().cloned());
                candidates.push(candidate.join("::"));
            }
        }

        candidates
    }

    /// Crate-local paths named anywhere in `ty`, in order of appearance and
    /// without generic arguments.
    pub fn crate_paths(&self, scope: &[String], ty: &Type) -> Vec<String> {
        let mut collector = CratePaths {
            resolver: self,
            scope,
            paths: Vec::new(),
        };
        collector.visit_type(ty);
        collector.paths
    }

    /// Resolved type arguments of the last segment of `path`.
    pub fn type_arguments(&self, scope: &[String], path: &Path) -> Vec<String> {
        let Some(segment) = path.segments.last() else {
            return Vec::new();
        };
        let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
            return Vec::new();
        };

        arguments
            .args
            .iter()
            .filter_map(|argument| match argument {
                GenericArgument::Type(ty) => Some(self.render_type(scope, ty)),
                _ => None,
            })
            .collect()
    }

    fn render_arguments(&self, scope: &[String], arguments: &PathArguments) -> String {
        match arguments {
            PathArguments::None => String::new(),
            PathArguments::AngleBracketed(angle) => {
                let args: Vec<String> = angle
                    .args
                    .iter()
                    .map(|argument| match argument {
                        GenericArgument::Type(ty) => self.render_type(scope, ty),
                        GenericArgument::Lifetime(lifetime) => lifetime.to_string(),
                        GenericArgument::AssocType(assoc) => {
                            format!("{} = {}", assoc.ident, self.render_type(scope, &assoc.ty))
                        }
                        other => normalize_tokens(&other.to_token_stream().to_string()),
                    })
                    .collect();
                format!("<{}>", args.join(", "))
            }
            PathArguments::Parenthesized(parens) => {
                let inputs: Vec<String> = parens
                    .inputs
                    .iter()
                    .map(|input| self.render_type(scope, input))
                    .collect();
                let output = match &parens.output {
                    ReturnType::Default => String::new(),
                    ReturnType::Type(_, ty) => format!(" -> {}", self.render_type(scope, ty)),
                };
                format!("({}){}", inputs.join(", "), output)
            }
        }
    }

    /// Resolve the head of a path.
    ///
    /// Returns the replacement segments and how many leading idents of the
    /// original path they replace. `(vec![], 0)` means "keep as written".
    fn resolve_head(
        &self,
        scope: &[String],
        leading_colon: bool,
        idents: &[String],
    ) -> (Vec<String>, usize) {
        if leading_colon {
            return (vec![String::new()], 0);
        }
        let Some(first) = idents.first() else {
            return (Vec::new(), 0);
        };

        match first.as_str() {
            "crate" | "Self" => return (Vec::new(), 0),
            "self" | "super" => {
                let (base, consumed) = relative_base(scope, idents);
                return (crate_path(&base), consumed);
            }
            _ => {}
        }

        let Some(table) = self.scopes.get(scope) else {
            return (Vec::new(), 0);
        };

        if let Some(target) = table.imports.get(first) {
            return (target.clone(), 1);
        }
        if table.items.contains(first) {
            return (crate_path(scope), 0);
        }

        table
            .globs
            .iter()
            .find_map(|glob| self.resolve_through_glob(glob, first))
            .unwrap_or((Vec::new(), 0))
    }

    fn resolve_through_glob(&self, glob: &[String], name: &str) -> Option<(Vec<String>, usize)> {
        let (root, module) = glob.split_first()?;
        if root != "crate" {
            return None;
        }

        let table = self.scopes.get(module)?;
        if table.items.contains(name) {
            return Some((glob.to_vec(), 0));
        }
        table.imports.get(name).map(|target| (target.clone(), 1))
    }
}

struct CratePaths<'a> {
    resolver: &'a Resolver,
    scope: &'a [String],
    paths: Vec<String>,
}

impl<'ast> Visit<'ast> for CratePaths<'_> {
    fn visit_type_path(&mut self, type_path: &'ast TypePath) {
        if type_path.qself.is_none()
            && let Some(path) = self
                .resolver
                .path_candidates(self.scope, &type_path.path)
                .into_iter()
                .next()
            && path.starts_with("crate::")
            && !self.paths.contains(&path)
        {
            self.paths.push(path);
        }
        visit::visit_type_path(self, type_path);
    }
}

fn collect_use(
    scope: &[String],
    table: &mut ScopeTable,
    leading_colon: bool,
    mut prefix: Vec<String>,
    tree: &UseTree,
) {
    match tree {
        UseTree::Path(path) => {
            prefix.push(path.ident.to_string());
            collect_use(scope, table, leading_colon, prefix, &path.tree);
        }
        UseTree::Name(name) => {
            let name = name.ident.to_string();
            if name == "self" {
                if let Some(alias) = prefix.last().cloned() {
                    let target = absolutize(scope, &table.items, leading_colon, &prefix);
                    table.imports.insert(alias, target);
                }
            } else {
                prefix.push(name.clone());
                let target = absolutize(scope, &table.items, leading_colon, &prefix);
                table.imports.insert(name, target);
            }
        }
        UseTree::Rename(rename) => {
            let alias = rename.rename.to_string();
            if alias == "_" {
                return;
            }
            if rename.ident != "self" {
                prefix.push(rename.ident.to_string());
            }
            let target = absolutize(scope, &table.items, leading_colon, &prefix);
            table.imports.insert(alias, target);
        }
        UseTree::Glob(_) => {
            let target = absolutize(scope, &table.items, leading_colon, &prefix);
            table.globs.push(target);
        }
        UseTree::Group(group) => {
            for item in &group.items {
                collect_use(scope, table, leading_colon, prefix.clone(), item);
            }
        }
    }
}

/// Make an import path absolute.
fn absolutize(
    scope: &[String],
    items: &FxHashSet<String>,
    leading_colon: bool,
    idents: &[String],
) -> Vec<String> {
    if leading_colon {
        let mut path = vec![String::new()];
        path.extend(idents.iter().cloned());
        return path;
    }

    match idents.first().map(String::as_str) {
        Some("crate") | None => idents.to_vec(),
        Some("self") | Some("super") => {
            let (base, consumed) = relative_base(scope, idents);
            let mut path = crate_path(&base);
            path.extend(idents.iter().skip(consumed).cloned());
            path
        }
        Some(first) if items.contains(first) => {
            let mut path = crate_path(scope);
            path.extend(idents.iter().cloned());
            path
        }
        Some(_) => idents.to_vec(),
    }
}

/// Apply leading `self`/`super` segments to `scope`.
fn relative_base(scope: &[String], idents: &[String]) -> (Vec<String>, usize) {
    let mut base = scope.to_vec();
    let mut consumed = 0;

    for ident in idents {
        match ident.as_str() {
            "self" if consumed == 0 => consumed += 1,
            "super" => {
                base.pop();
                consumed += 1;
            }
            _ => break,
        }
    }

    (base, consumed)
}

fn crate_path(segments: &[String]) -> Vec<String> {
    let mut path = Vec::with_capacity(segments.len() + 1);
    path.push("crate".to_string());
    path.extend(segments.iter().cloned());
    path
}

fn path_idents(path: &Path) -> Vec<String> {
    path.segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect()
}

/// Name a type or module item declares, if any.
fn item_name(item: &Item) -> Option<String> {
    let ident = match item {
        Item::Struct(item) => &item.ident,
        Item::Enum(item) => &item.ident,
        Item::Union(item) => &item.ident,
        Item::Type(item) => &item.ident,
        Item::Trait(item) => &item.ident,
        Item::Mod(item) => &item.ident,
        _ => return None,
    };
    Some(ident.to_string())
}

/// Collapse the spacing `proc_macro2` puts between tokens.
///
/// Spaces survive only between two word characters and after `,` or `;`.
pub(crate) fn normalize_tokens(text: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_' || c == '\'';
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        if c != ' ' {
            out.push(c);
            continue;
        }

        let prev = out.chars().last();
        let next = chars.get(i + 1).copied();
        let keep = match (prev, next) {
            (Some(p), Some(n)) => (is_word(p) && is_word(n)) || p == ',' || p == ';',
            _ => false,
        };
        if keep {
            out.push(' ');
        }
    }

    out
}
