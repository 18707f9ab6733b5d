//! Symbol queries over lowered syntax.
//!
//! Answers the questions extraction asks about a declaration: where does it
//! live, which type does it build, and can generated code name the types it
//! mentions.

mod resolve;

use std::collections::BTreeMap;

pub use resolve::Resolver;

use crate::syntax::{DeclaredItem, ImplNode, StructNode};

/// A named type declaration with a known location in the crate.
pub trait DeclaredType {
    /// Simple name of the type.
    fn name(&self) -> &str;

    /// Module path of the declaring file, relative to the crate root.
    fn namespace(&self) -> &[String];

    /// Inline modules enclosing the declaration, outermost first.
    fn enclosing_scopes(&self) -> &[String];

    fn is_generic(&self) -> bool;

    /// Absolute path of the type, e.g. `crate::models::City`.
    fn path(&self) -> String {
        let mut segments = vec!["crate"];
        segments.extend(self.namespace().iter().map(String::as_str));
        segments.extend(self.enclosing_scopes().iter().map(String::as_str));
        segments.push(self.name());
        segments.join("::")
    }
}

/// A [`StructNode`] seen from the file that declares it.
#[derive(Debug, Clone, Copy)]
pub struct StructSymbol<'a> {
    pub node: &'a StructNode,
    pub module_path: &'a [String],
}

impl<'a> StructSymbol<'a> {
    pub fn new(node: &'a StructNode, module_path: &'a [String]) -> Self {
        Self { node, module_path }
    }
}

impl DeclaredType for StructSymbol<'_> {
    fn name(&self) -> &str {
        &self.node.name
    }

    fn namespace(&self) -> &[String] {
        self.module_path
    }

    fn enclosing_scopes(&self) -> &[String] {
        &self.node.scope
    }

    fn is_generic(&self) -> bool {
        self.node.is_generic
    }
}

/// The crate-relative module path enclosing `symbol`, joined by `::`.
///
/// Returns `None` when the symbol is declared directly at the crate root.
pub fn full_namespace<S: DeclaredType + ?Sized>(symbol: &S) -> Option<String> {
    let segments: Vec<&str> = symbol
        .namespace()
        .iter()
        .chain(symbol.enclosing_scopes())
        .map(String::as_str)
        .collect();

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("::"))
    }
}

/// Result of looking up a capability implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityMatch {
    /// No implementation.
    Missing,
    /// Exactly one implementation, for the given type.
    Found(String),
    /// Implementations for several different types.
    Ambiguous(Vec<String>),
}

/// Trait implementations of the whole crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CapabilityIndex {
    impls: Vec<ImplNode>,
}

impl CapabilityIndex {
    pub fn new(impls: Vec<ImplNode>) -> Self {
        Self { impls }
    }

    pub fn len(&self) -> usize {
        self.impls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.impls.is_empty()
    }

    /// Find the type argument of `capability` implemented by `self_ty`.
    ///
    /// Only non-generic impls with exactly one type argument count.
    pub fn find(&self, self_ty: &str, capability: &str) -> CapabilityMatch {
        let mut found: Vec<String> = Vec::new();

        for node in &self.impls {
            if node.is_generic || node.self_ty != self_ty || node.type_args.len() != 1 {
                continue;
            }
            if !node
                .trait_candidates
                .iter()
                .any(|candidate| matches_capability(candidate, capability))
            {
                continue;
            }
            if !found.contains(&node.type_args[0]) {
                found.push(node.type_args[0].clone());
            }
        }

        match found.len() {
            0 => CapabilityMatch::Missing,
            1 => CapabilityMatch::Found(found.remove(0)),
            _ => CapabilityMatch::Ambiguous(found),
        }
    }
}

/// Types and traits declared anywhere in the crate, with their reachability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ItemIndex {
    items: BTreeMap<String, bool>,
}

impl ItemIndex {
    /// Build the index. The first declaration of a path wins.
    pub fn new(items: impl IntoIterator<Item = DeclaredItem>) -> Self {
        let mut index = BTreeMap::new();
        for item in items {
            index.entry(item.path).or_insert(item.reachable);
        }
        Self { items: index }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.items.contains_key(path)
    }

    /// Whether generated code can name `path`.
    ///
    /// Paths the crate does not declare (re-exports, extern types) are
    /// assumed reachable.
    pub fn is_reachable(&self, path: &str) -> bool {
        self.items.get(path).copied().unwrap_or(true)
    }
}

/// The type `symbol` builds through `capability`, if it implements it exactly
/// once.
pub fn implements_capability<S: DeclaredType + ?Sized>(
    index: &CapabilityIndex,
    symbol: &S,
    capability: &str,
) -> Option<String> {
    match index.find(&symbol.path(), capability) {
        CapabilityMatch::Found(type_arg) => Some(type_arg),
        CapabilityMatch::Missing | CapabilityMatch::Ambiguous(_) => None,
    }
}

/// Whether a trait path refers to `capability`.
///
/// Re-exports are accepted when they come from the same crate and keep the
/// trait's name, so `datodia::prelude::TypeBuilder` matches
/// `datodia::TypeBuilder`.
fn matches_capability(candidate: &str, capability: &str) -> bool {
    let candidate = candidate.trim_start_matches("::");
    let capability = capability.trim_start_matches("::");
    if candidate == capability {
        return true;
    }

    let first = |path: &str| path.split("::").next().map(str::to_owned);
    let last = |path: &str| path.rsplit("::").next().map(str::to_owned);
    candidate.contains("::")
        && first(candidate) == first(capability)
        && last(candidate) == last(capability)
}
