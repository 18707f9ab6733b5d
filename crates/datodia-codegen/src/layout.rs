//! Crate module layout.
//!
//! Only files reached through `mod` declarations from the crate root are part
//! of the crate. The walk starts at `lib.rs` (or `main.rs` when there is no
//! library target) and follows `mod name;` and `#[path = "..."]`
//! declarations, carrying each module's visibility along.

use std::collections::{BTreeMap, VecDeque};
use std::iter;
use std::path::{Component, Path, PathBuf};

use crate::syntax::ModuleDecl;

/// Where a source file sits in the crate's module tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ModuleLocation {
    /// Module path relative to the crate root, e.g. `["models", "city"]`.
    pub module_path: Vec<String>,
    /// Whether every module on the path can be named from the crate root's
    /// children.
    pub visible: bool,
}

impl ModuleLocation {
    fn root() -> Self {
        Self {
            module_path: Vec::new(),
            visible: true,
        }
    }

    fn child(&self, decl: &ModuleDecl) -> Self {
        let mut module_path = self.module_path.clone();
        let mut visible = self.visible;

        let segments = decl
            .scope
            .iter()
            .zip(&decl.scope_visibility)
            .chain(iter::once((&decl.name, &decl.visibility)));
        for (name, visibility) in segments {
            // Private modules directly under the crate root are still visible
            // to the root's other children.
            visible &= module_path.is_empty() || visibility.is_crate_visible();
            module_path.push(name.clone());
        }

        Self {
            module_path,
            visible,
        }
    }
}

/// Files reachable from the crate root, keyed by normalized path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CrateLayout {
    modules: BTreeMap<PathBuf, ModuleLocation>,
}

impl CrateLayout {
    /// Walk the module tree rooted in `source_dir`.
    ///
    /// `declarations` returns the module declarations of a file, or `None`
    /// when the file is not part of the source set. Paths passed to it are
    /// normalized with [`normalize_path`]. The first declaration reaching a
    /// file wins.
    pub fn build<F>(source_dir: &Path, mut declarations: F) -> Self
    where
        F: FnMut(&Path) -> Option<Vec<ModuleDecl>>,
    {
        let source_dir = normalize_path(source_dir);
        let mut layout = Self::default();
        let mut queue = VecDeque::new();

        for root in ["lib.rs", "main.rs"] {
            let path = source_dir.join(root);
            if let Some(decls) = declarations(&path) {
                queue.push_back((path, ModuleLocation::root(), decls));
                break;
            }
        }

        while let Some((file, location, decls)) = queue.pop_front() {
            if layout.modules.contains_key(&file) {
                continue;
            }

            let mod_rs = location.module_path.is_empty()
                || file.file_name().is_some_and(|name| name == "mod.rs");
            for decl in &decls {
                let found = candidate_files(&file, mod_rs, decl)
                    .into_iter()
                    .map(|path| normalize_path(&path))
                    .find_map(|path| declarations(&path).map(|child| (path, child)));
                if let Some((path, child_decls)) = found
                    && !layout.modules.contains_key(&path)
                {
                    queue.push_back((path, location.child(decl), child_decls));
                }
            }

            layout.modules.insert(file, location);
        }

        layout
    }

    /// Location of `path`, or `None` when no declaration reaches it.
    pub fn location(&self, path: &Path) -> Option<&ModuleLocation> {
        self.modules.get(&normalize_path(path))
    }

    /// Reachable files with their locations, sorted by path.
    pub fn modules(&self) -> impl Iterator<Item = (&Path, &ModuleLocation)> {
        self.modules
            .iter()
            .map(|(path, location)| (path.as_path(), location))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Files a declaration in `file` may load, in lookup order.
///
/// Declarations in `lib.rs`, `main.rs` and `mod.rs` files resolve next to the
/// file. Any other `name.rs` resolves into the `name/` directory. Enclosing
/// inline modules add directory segments.
fn candidate_files(file: &Path, mod_rs: bool, decl: &ModuleDecl) -> Vec<PathBuf> {
    let parent = file.parent().unwrap_or_else(|| Path::new(""));
    let mut base = if mod_rs {
        parent.to_path_buf()
    } else {
        parent.join(file.file_stem().unwrap_or_default())
    };

    if let Some(path_attr) = &decl.path_attr {
        if decl.scope.is_empty() {
            return vec![parent.join(path_attr)];
        }
        base.extend(&decl.scope);
        return vec![base.join(path_attr)];
    }

    base.extend(&decl.scope);
    vec![
        base.join(format!("{}.rs", decl.name)),
        base.join(&decl.name).join("mod.rs"),
    ]
}

/// Lexically normalize `path`: drop `.` components and fold `..` into the
/// preceding component.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
