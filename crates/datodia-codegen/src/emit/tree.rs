//! Assembles generated sources into a single includable file.

use std::collections::BTreeMap;

use crate::model::GeneratedSource;

/// Name of the assembled file.
pub const MODULE_TREE_FILE: &str = "datodia.rs";

const HEADER: &str = "// @generated by datodia-codegen. Do not edit.\n";

#[derive(Default)]
struct ModuleNode<'a> {
    sources: Vec<&'a GeneratedSource>,
    children: BTreeMap<&'a str, ModuleNode<'a>>,
}

impl<'a> ModuleNode<'a> {
    fn insert(&mut self, path: &'a [String], source: &'a GeneratedSource) {
        match path.split_first() {
            None => self.sources.push(source),
            Some((head, rest)) => self
                .children
                .entry(head.as_str())
                .or_default()
                .insert(rest, source),
        }
    }

    fn render(&self, depth: usize, out: &mut String) {
        let indent = "    ".repeat(depth);

        for source in &self.sources {
            out.push('\n');
            for line in source.text.lines() {
                if !line.is_empty() {
                    out.push_str(&indent);
                    out.push_str(line);
                }
                out.push('\n');
            }
        }

        for (name, child) in &self.children {
            out.push('\n');
            out.push_str(&format!("{indent}pub mod {name} {{\n"));
            child.render(depth + 1, out);
            out.push_str(&format!("{indent}}}\n"));
        }
    }
}

/// Nest every source in `pub mod` blocks following its module path.
///
/// Sources at the same module path keep their relative order and precede
/// child modules; child modules are sorted by name.
pub fn render_module_tree(sources: &[GeneratedSource]) -> String {
    let mut root = ModuleNode::default();
    for source in sources {
        root.insert(&source.module_path, source);
    }

    let mut out = String::from(HEADER);
    root.render(0, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn source(module_path: &[&str], text: &str) -> GeneratedSource {
        GeneratedSource {
            hint_name: "x.rs".to_string(),
            module_path: module_path.iter().map(|s| s.to_string()).collect(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_render_module_tree_nests_sources() {
        let sources = vec![
            source(&["generated", "models"], "pub struct B;\n"),
            source(&[], "pub struct Container;\n"),
            source(&["generated"], "pub struct A;\n\nimpl A {}\n"),
        ];

        assert_eq!(
            render_module_tree(&sources),
            r#"// @generated by datodia-codegen. Do not edit.

pub struct Container;

pub mod generated {

    pub struct A;

    impl A {}

    pub mod models {

        pub struct B;
    }
}
"#
        );
    }

    #[test]
    fn test_render_module_tree_empty() {
        assert_eq!(render_module_tree(&[]), HEADER);
    }
}
