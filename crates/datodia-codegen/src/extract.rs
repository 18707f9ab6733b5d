//! Builder-definition extraction rules.
//!
//! Two rules run over every file:
//!
//! - **Marked builders**: structs carrying the marker attribute that implement
//!   the builder trait for exactly one type.
//! - **Records**: plain data structs whose fields the generated code can
//!   populate. Each one gets a generated builder.
//!
//! Both rules only accept structs the generated code can name from outside
//! the declaring module.

use std::path::Path;

use crate::model::{
    BuilderDefinition, Constructor, Diagnostic, Extraction, Parameter, Severity, codes,
};
use crate::options::{GeneratorOptions, MarkerPolicy};
use crate::salsa_db::CancellationFlag;
use crate::symbols::{
    CapabilityIndex, CapabilityMatch, DeclaredType, ItemIndex, StructSymbol, full_namespace,
    implements_capability,
};
use crate::syntax::{FileSyntax, StructNode, StructShape};

/// The file being extracted and the settings that apply to it.
#[derive(Debug, Clone, Copy)]
pub struct FileContext<'a> {
    pub path: &'a Path,
    pub module_path: &'a [String],
    pub options: &'a GeneratorOptions,
    pub cancellation: &'a CancellationFlag,
}

/// Why a marked struct produced no definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Generic,
    MissingCapability,
    AmbiguousCapability(Vec<String>),
    /// Paths of the types generated code cannot name.
    Unreachable(Vec<String>),
}

/// Whether `node` carries the marker attribute.
pub fn is_marked_builder(node: &StructNode, marker: &str) -> bool {
    node.has_attribute(marker)
}

/// Whether items declared in the same module as `node` are visible to the
/// crate root's children.
fn declared_at_root(node: &StructNode, module_path: &[String]) -> bool {
    module_path.is_empty() && node.scope.is_empty()
}

/// Whether generated code can name `node`.
pub fn is_nameable(node: &StructNode, module_path: &[String]) -> bool {
    node.scope_visible
        && (declared_at_root(node, module_path) || node.visibility.is_crate_visible())
}

/// Whether `node` is a record the generated code can construct.
///
/// Field types are not checked here, see [`unreachable_field_types`].
pub fn is_record(node: &StructNode, module_path: &[String], marker: &str) -> bool {
    if node.is_generic || node.has_attribute(marker) || !is_nameable(node, module_path) {
        return false;
    }

    let at_root = declared_at_root(node, module_path);
    node.shape
        .fields()
        .iter()
        .all(|field| at_root || field.visibility.is_crate_visible())
}

/// Crate-local types named by the fields of `node` that generated code
/// cannot name.
pub fn unreachable_field_types(node: &StructNode, items: &ItemIndex) -> Vec<String> {
    let mut unreachable: Vec<String> = Vec::new();
    for path in node
        .shape
        .fields()
        .iter()
        .flat_map(|field| &field.type_paths)
    {
        if !items.is_reachable(path) && !unreachable.contains(path) {
            unreachable.push(path.clone());
        }
    }
    unreachable
}

/// Definition for a marked builder.
pub fn marked_builder_definition(
    symbol: &StructSymbol<'_>,
    index: &CapabilityIndex,
    capability: &str,
) -> Result<BuilderDefinition, Rejection> {
    if symbol.is_generic() {
        return Err(Rejection::Generic);
    }
    if !is_nameable(symbol.node, symbol.module_path) {
        return Err(Rejection::Unreachable(vec![symbol.path()]));
    }

    match implements_capability(index, symbol, capability) {
        Some(type_argument) => Ok(BuilderDefinition::new(
            type_argument,
            symbol.name(),
            full_namespace(symbol).unwrap_or_default(),
        )),
        None => match index.find(&symbol.path(), capability) {
            CapabilityMatch::Ambiguous(types) => Err(Rejection::AmbiguousCapability(types)),
            CapabilityMatch::Missing | CapabilityMatch::Found(_) => {
                Err(Rejection::MissingCapability)
            }
        },
    }
}

/// Definition for a record, with its builder placed under `generated_root`.
pub fn record_definition(symbol: &StructSymbol<'_>, generated_root: &str) -> BuilderDefinition {
    let namespace = match full_namespace(symbol) {
        Some(namespace) => format!("{generated_root}::{namespace}"),
        None => generated_root.to_string(),
    };

    BuilderDefinition::new(
        symbol.path(),
        format!("{}TypeBuilder", symbol.name()),
        namespace,
    )
    .with_constructor(constructor(&symbol.node.shape))
}

fn constructor(shape: &StructShape) -> Constructor {
    match shape {
        StructShape::Unit => Constructor::Unit,
        StructShape::Tuple(fields) => Constructor::Tuple(
            fields
                .iter()
                .enumerate()
                .map(|(position, field)| Parameter::new(position.to_string(), &field.ty))
                .collect(),
        ),
        StructShape::Named(fields) => Constructor::Named(
            fields
                .iter()
                .map(|field| Parameter::new(field.name.clone().unwrap_or_default(), &field.ty))
                .collect(),
        ),
    }
}

/// Run the marked-builder rule over one file.
pub fn extract_marked_builders(
    ctx: FileContext<'_>,
    syntax: &FileSyntax,
    index: &CapabilityIndex,
) -> Extraction {
    let mut extraction = Extraction::default();

    for node in syntax
        .structs
        .iter()
        .filter(|node| is_marked_builder(node, &ctx.options.marker))
    {
        ctx.cancellation.check();

        let symbol = StructSymbol::new(node, ctx.module_path);
        match marked_builder_definition(&symbol, index, &ctx.options.capability) {
            Ok(definition) => extraction.definitions.push(definition),
            Err(rejection) => {
                tracing::debug!("Skipping marked struct {}: {:?}", symbol.path(), rejection);
                if ctx.options.policy == MarkerPolicy::Diagnose {
                    extraction
                        .diagnostics
                        .push(rejection_diagnostic(ctx, node, &rejection));
                }
            }
        }
    }

    extraction
}

/// Run the record rule over one file.
///
/// `items` must know every crate-local type the file's records mention.
pub fn extract_records(ctx: FileContext<'_>, syntax: &FileSyntax, items: &ItemIndex) -> Extraction {
    let mut extraction = Extraction::default();

    for node in syntax
        .structs
        .iter()
        .filter(|node| is_record(node, ctx.module_path, &ctx.options.marker))
    {
        ctx.cancellation.check();

        let symbol = StructSymbol::new(node, ctx.module_path);
        let unreachable = unreachable_field_types(node, items);
        if !unreachable.is_empty() {
            tracing::debug!("Skipping record {}: private field types", symbol.path());
            if ctx.options.policy == MarkerPolicy::Diagnose {
                let rejection = Rejection::Unreachable(unreachable);
                extraction
                    .diagnostics
                    .push(rejection_diagnostic(ctx, node, &rejection));
            }
            continue;
        }

        extraction
            .definitions
            .push(record_definition(&symbol, &ctx.options.generated_root));
    }

    extraction
}

fn rejection_diagnostic(
    ctx: FileContext<'_>,
    node: &StructNode,
    rejection: &Rejection,
) -> Diagnostic {
    let marker = &ctx.options.marker;
    let capability = &ctx.options.capability;
    let (code, message) = match rejection {
        Rejection::Generic => (
            codes::GENERIC_BUILDER,
            format!(
                "`{}` is marked with #[{marker}] but is generic, so the container cannot create it",
                node.name
            ),
        ),
        Rejection::MissingCapability => (
            codes::MISSING_CAPABILITY,
            format!(
                "`{}` is marked with #[{marker}] but does not implement {capability}<T>",
                node.name
            ),
        ),
        Rejection::AmbiguousCapability(types) => (
            codes::AMBIGUOUS_CAPABILITY,
            format!(
                "`{}` implements {capability} for several types ({})",
                node.name,
                types.join(", ")
            ),
        ),
        Rejection::Unreachable(paths) => (
            codes::UNREACHABLE_TYPE,
            format!(
                "`{}` cannot be built by the container: {} is private to its module",
                node.name,
                paths.join(", ")
            ),
        ),
    };

    Diagnostic {
        code,
        severity: Severity::Warning,
        message,
        path: ctx.path.to_path_buf(),
        line: node.line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SourceParser;

    fn lower(module_path: &[String], source: &str) -> FileSyntax {
        SourceParser::new(module_path)
            .parse_str(source, Path::new("src/lib.rs"))
            .unwrap()
    }

    fn segments(path: &[&str]) -> Vec<String> {
        path.iter().map(|s| s.to_string()).collect()
    }

    fn run(
        module_path: &[&str],
        source: &str,
        options: &GeneratorOptions,
    ) -> (Extraction, Extraction) {
        let module_path = segments(module_path);
        let syntax = lower(&module_path, source);
        let index = CapabilityIndex::new(syntax.impls.clone());
        let items = ItemIndex::new(syntax.items.clone());
        let cancellation = CancellationFlag::default();
        let ctx = FileContext {
            path: Path::new("src/lib.rs"),
            module_path: &module_path,
            options,
            cancellation: &cancellation,
        };
        (
            extract_marked_builders(ctx, &syntax, &index),
            extract_records(ctx, &syntax, &items),
        )
    }

    #[test]
    fn test_unit_record_at_root() {
        let (marked, records) = run(&[], "pub struct Person;", &GeneratorOptions::default());

        assert!(marked.definitions.is_empty());
        assert_eq!(
            records.definitions,
            vec![
                BuilderDefinition::new("crate::Person", "PersonTypeBuilder", "generated")
                    .with_constructor(Constructor::Unit)
            ]
        );
    }

    #[test]
    fn test_named_record_in_module() {
        let (_, records) = run(
            &["models"],
            "pub struct City { pub zip_code: i32, pub name: String }",
            &GeneratorOptions::default(),
        );

        let def = &records.definitions[0];
        assert_eq!(def.full_type_name, "crate::models::City");
        assert_eq!(def.namespace, "generated::models");
        assert_eq!(
            def.parameters(),
            &[Parameter::new("zip_code", "i32"), Parameter::new("name", "String")]
        );
    }

    #[test]
    fn test_record_rule_rejections() {
        let (_, records) = run(
            &["models"],
            r#"
                pub struct Generic<T> { pub value: T }
                pub struct Hidden { secret: u8 }
                struct Private;
                pub(super) struct Restricted;
                #[datodia::type_builder]
                pub struct Marked;
                pub struct Kept(pub u8);
            "#,
            &GeneratorOptions::default(),
        );

        let names: Vec<&str> = records
            .definitions
            .iter()
            .map(|d| d.builder_name.as_str())
            .collect();
        assert_eq!(names, vec!["KeptTypeBuilder"]);
        assert_eq!(records.definitions[0].parameters(), &[Parameter::new("0", "u8")]);
    }

    #[test]
    fn test_private_struct_at_root_is_a_record() {
        let (_, records) = run(&[], "struct Local { x: u8 }", &GeneratorOptions::default());
        assert_eq!(records.definitions.len(), 1);
        assert_eq!(records.definitions[0].parameters(), &[Parameter::new("x", "u8")]);

        let (_, records) = run(
            &[],
            "mod local { pub struct Inner { x: u8 } }",
            &GeneratorOptions::default(),
        );
        assert!(records.definitions.is_empty());
    }

    #[test]
    fn test_record_with_private_field_type() {
        let options = GeneratorOptions::default().with_policy(MarkerPolicy::Diagnose);
        let (_, records) = run(
            &["models"],
            r#"
struct Hidden;

pub struct Wrapper {
    pub inner: Option<Hidden>,
}

pub struct Outer {
    pub wrapper: Vec<Wrapper>,
}
"#,
            &options,
        );

        let names: Vec<&str> = records
            .definitions
            .iter()
            .map(|d| d.builder_name.as_str())
            .collect();
        assert_eq!(names, vec!["OuterTypeBuilder"]);

        assert_eq!(records.diagnostics.len(), 1);
        let diagnostic = &records.diagnostics[0];
        assert_eq!(diagnostic.code, codes::UNREACHABLE_TYPE);
        assert_eq!(diagnostic.line, 4);
        assert!(diagnostic.message.contains("crate::models::Hidden"));

        let (_, records) = run(
            &["models"],
            "struct Hidden;\npub struct Wrapper { pub inner: Hidden }",
            &GeneratorOptions::default(),
        );
        assert!(records.definitions.is_empty());
        assert!(records.diagnostics.is_empty());
    }

    #[test]
    fn test_record_in_inline_module() {
        let (_, records) = run(
            &["models"],
            "pub mod geo { pub struct Point { pub x: i32 } }",
            &GeneratorOptions::default(),
        );

        let def = &records.definitions[0];
        assert_eq!(def.full_type_name, "crate::models::geo::Point");
        assert_eq!(def.namespace, "generated::models::geo");
    }

    #[test]
    fn test_marked_builder() {
        let (marked, records) = run(
            &["builders"],
            r#"
                use datodia::{type_builder, TypeBuilder};

                #[type_builder]
                pub struct I32TypeBuilder;

                impl TypeBuilder<i32> for I32TypeBuilder {
                    fn create<C: datodia::Create>(&self, _: &C) -> datodia::Result<i32> {
                        Ok(7)
                    }
                }
            "#,
            &GeneratorOptions::default(),
        );

        assert_eq!(
            marked.definitions,
            vec![BuilderDefinition::new("i32", "I32TypeBuilder", "builders")]
        );
        assert!(records.definitions.is_empty());
    }

    #[test]
    fn test_marked_builder_skip_policy_is_silent() {
        let (marked, _) = run(
            &[],
            "#[datodia::type_builder] pub struct Lonely;",
            &GeneratorOptions::default(),
        );

        assert!(marked.definitions.is_empty());
        assert!(marked.diagnostics.is_empty());
    }

    #[test]
    fn test_marked_builder_diagnose_policy() {
        let options = GeneratorOptions::default().with_policy(MarkerPolicy::Diagnose);
        let (marked, _) = run(
            &[],
            r#"
#[datodia::type_builder]
pub struct Lonely;

#[datodia::type_builder]
pub struct Wrapper<T>(T);

#[datodia::type_builder]
pub struct Twice;
impl datodia::TypeBuilder<u8> for Twice {
    fn create<C: datodia::Create>(&self, _: &C) -> datodia::Result<u8> { Ok(1) }
}
impl datodia::TypeBuilder<u16> for Twice {
    fn create<C: datodia::Create>(&self, _: &C) -> datodia::Result<u16> { Ok(1) }
}
"#,
            &options,
        );

        let found: Vec<(&str, usize)> = marked
            .diagnostics
            .iter()
            .map(|d| (d.code, d.line))
            .collect();
        assert_eq!(
            found,
            vec![
                (codes::MISSING_CAPABILITY, 3),
                (codes::GENERIC_BUILDER, 6),
                (codes::AMBIGUOUS_CAPABILITY, 9)
            ]
        );
        assert!(marked.diagnostics[2].message.contains("u8, u16"));
        assert!(marked.definitions.is_empty());
    }

    #[test]
    fn test_marked_builder_in_private_module() {
        let options = GeneratorOptions::default().with_policy(MarkerPolicy::Diagnose);
        let (marked, _) = run(
            &["builders"],
            r#"
mod hidden {
    #[datodia::type_builder]
    pub struct U8TypeBuilder;

    impl datodia::TypeBuilder<u8> for U8TypeBuilder {
        fn create<C: datodia::Create>(&self, _: &C) -> datodia::Result<u8> { Ok(1) }
    }
}
"#,
            &options,
        );

        assert!(marked.definitions.is_empty());
        assert_eq!(marked.diagnostics[0].code, codes::UNREACHABLE_TYPE);
        assert!(
            marked.diagnostics[0]
                .message
                .contains("crate::builders::hidden::U8TypeBuilder")
        );
    }

    #[test]
    fn test_extraction_unwinds_when_cancelled() {
        let module_path = Vec::new();
        let syntax = lower(&module_path, "pub struct Person;");
        let options = GeneratorOptions::default();
        let cancellation = CancellationFlag::default();
        cancellation.cancel();
        let ctx = FileContext {
            path: Path::new("src/lib.rs"),
            module_path: &module_path,
            options: &options,
            cancellation: &cancellation,
        };

        let items = ItemIndex::default();
        let result = std::panic::catch_unwind(|| extract_records(ctx, &syntax, &items));
        assert!(result.is_err());
    }
}
