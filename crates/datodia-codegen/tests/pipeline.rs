//! End-to-end tests of the generator pipeline.

use std::fs;

use datodia_codegen::{
    BuilderDefinition, Error, GeneratorDriver, GeneratorOptions, MarkerPolicy, RunReason,
    RunResult, Step, builtin_builders, codes,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn builder_names(result: &RunResult) -> Vec<&str> {
    result
        .definitions
        .iter()
        .map(|d| d.builder_name.as_str())
        .collect()
}

fn reasons_for(result: &RunResult, key: &str) -> Vec<(Step, RunReason)> {
    result
        .tracked_steps
        .iter()
        .filter(|s| s.key == key)
        .map(|s| (s.step, s.reason))
        .collect()
}

#[test]
fn test_empty_compilation_registers_builtins() {
    let mut driver = GeneratorDriver::default();
    let result = driver.run().unwrap();

    assert_eq!(result.definitions, builtin_builders());
    assert_eq!(result.sources.len(), 1);

    let container = result.source("container.rs").unwrap();
    assert_eq!(container.text.matches("type_builders.entry(").count(), 3);

    let again = GeneratorDriver::default().run().unwrap();
    assert_eq!(again.sources, result.sources);
}

#[test]
fn test_unit_record_scenario() {
    let mut driver = GeneratorDriver::default();
    driver.set_source("src/lib.rs", "pub struct Person;");

    let result = driver.run().unwrap();

    assert_eq!(
        builder_names(&result),
        vec![
            "StringTypeBuilder",
            "UuidTypeBuilder",
            "BoolTypeBuilder",
            "PersonTypeBuilder"
        ]
    );
    assert_eq!(
        result.definitions[3].key(),
        ("crate::Person", "PersonTypeBuilder", "generated")
    );

    let container = &result.source("container.rs").unwrap().text;
    assert_eq!(container.matches("type_builders.entry(").count(), 4);
    let instance = "static GENERATED_PERSONTYPEBUILDER_INSTANCE: ::std::sync::LazyLock<";
    assert!(container.contains(instance));
    assert!(container.contains("LazyLock<crate::generated::PersonTypeBuilder>"));

    let builder = result.source("generated.PersonTypeBuilder.rs").unwrap();
    assert_eq!(
        builder.text,
        r#"/// Builds [`crate::Person`] values.
#[::datodia::type_builder]
#[derive(Debug, Default, Clone, Copy)]
pub struct PersonTypeBuilder;

impl ::datodia::TypeBuilder<crate::Person> for PersonTypeBuilder {
    fn create<C: ::datodia::Create>(&self, _container: &C) -> ::datodia::Result<crate::Person> {
        Ok(crate::Person)
    }
}
"#
    );
}

#[test]
fn test_named_record_fields_in_declared_order() {
    let mut driver = GeneratorDriver::default();
    driver.set_source("src/lib.rs", "pub mod models;");
    driver.set_source(
        "src/models.rs",
        "pub struct City { pub zip_code: i32, pub name: String }",
    );

    let result = driver.run().unwrap();
    let text = &result
        .source("generated.models.CityTypeBuilder.rs")
        .unwrap()
        .text;

    let zip = text.find("zip_code: container.create::<i32>()?").unwrap();
    let name = text.find("name: container.create::<String>()?").unwrap();
    assert!(zip < name);

    let tree = result.module_tree();
    assert!(tree.contains("pub mod generated {\n"));
    assert!(tree.contains("    pub mod models {\n"));
}

#[test]
fn test_marked_builders_through_imports() {
    let mut driver = GeneratorDriver::default();
    driver.set_source("src/lib.rs", "pub mod builders;");
    driver.set_source(
        "src/builders.rs",
        r#"
use datodia::prelude::*;

#[type_builder]
#[derive(Default)]
pub struct PairTypeBuilder;

impl TypeBuilder<(i32, i32)> for PairTypeBuilder {
    fn create<C: Create>(&self, container: &C) -> Result<(i32, i32)> {
        Ok((container.create()?, container.create()?))
    }
}
"#,
    );

    let result = driver.run().unwrap();

    assert_eq!(
        result.definitions[3],
        BuilderDefinition::new("(i32, i32)", "PairTypeBuilder", "builders")
    );
    assert_eq!(result.definitions.len(), 4);
    assert_eq!(result.sources.len(), 1);
}

#[test]
fn test_hand_written_builder_replaces_generated_one() {
    let mut driver = GeneratorDriver::default();
    driver.set_source("src/lib.rs", "pub mod generated;\npub struct Person;");
    driver.set_source(
        "src/generated.rs",
        r#"
#[datodia::type_builder]
#[derive(Default)]
pub struct PersonTypeBuilder;

impl datodia::TypeBuilder<crate::Person> for PersonTypeBuilder {
    fn create<C: datodia::Create>(&self, _: &C) -> datodia::Result<crate::Person> {
        Ok(crate::Person)
    }
}
"#,
    );

    let result = driver.run().unwrap();

    let people: Vec<&BuilderDefinition> = result
        .definitions
        .iter()
        .filter(|d| d.full_type_name == "crate::Person")
        .collect();
    assert_eq!(people.len(), 1);
    assert!(people[0].constructor.is_none());
    assert!(result.source("generated.PersonTypeBuilder.rs").is_none());
}

#[test]
fn test_second_run_is_fully_cached() {
    let mut driver = GeneratorDriver::default();
    driver.set_source("src/lib.rs", "pub mod models;");
    driver.set_source("src/models.rs", "pub struct City { pub name: String }");

    let first = driver.run().unwrap();
    driver.set_source("src/models.rs", "pub struct City { pub name: String }");
    let second = driver.run().unwrap();

    assert_eq!(first.sources, second.sources);
    assert!(
        second
            .tracked_steps
            .iter()
            .all(|s| matches!(s.reason, RunReason::Cached | RunReason::Unchanged)),
        "{:?}",
        second.tracked_steps
    );
}

#[test]
fn test_unrelated_edit_only_touches_its_file() {
    let mut driver = GeneratorDriver::default();
    driver.set_source("src/lib.rs", "pub mod models;\npub mod util;");
    driver.set_source("src/models.rs", "pub struct City { pub zip_code: i32 }");
    driver.set_source("src/util.rs", "pub fn helper() {}");
    driver.run().unwrap();

    driver.set_source("src/util.rs", "pub fn helper() -> u8 {\n    1\n}");
    let result = driver.run().unwrap();

    assert!(
        reasons_for(&result, "src/models.rs")
            .iter()
            .all(|(_, reason)| *reason == RunReason::Cached)
    );
    assert!(
        reasons_for(&result, "src/util.rs").contains(&(Step::Syntax, RunReason::Unchanged))
    );
    for (step, reason) in reasons_for(&result, "compilation") {
        assert!(
            matches!(reason, RunReason::Cached | RunReason::Unchanged),
            "{step} was {reason}"
        );
    }
}

#[test]
fn test_new_record_modifies_outputs() {
    let mut driver = GeneratorDriver::default();
    driver.set_source("src/lib.rs", "pub struct Person;");
    driver.run().unwrap();

    driver.set_source("src/lib.rs", "pub struct Person;\npub struct Pet;");
    let result = driver.run().unwrap();

    let aggregate: Vec<RunReason> = result.steps(Step::Aggregate).map(|s| s.reason).collect();
    let records: Vec<RunReason> = result.steps(Step::Records).map(|s| s.reason).collect();
    assert_eq!(aggregate, vec![RunReason::Modified]);
    assert_eq!(records, vec![RunReason::Modified]);
    assert_eq!(result.definitions.len(), 5);
}

#[test]
fn test_diagnose_policy_reports_marked_structs() {
    let options = GeneratorOptions::default().with_policy(MarkerPolicy::Diagnose);
    let mut driver = GeneratorDriver::new(options);
    driver.set_source("src/lib.rs", "#[datodia::type_builder]\npub struct Orphan;");

    let result = driver.run().unwrap();

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].code, codes::MISSING_CAPABILITY);
    assert_eq!(result.diagnostics[0].line, 2);
    assert_eq!(result.definitions.len(), 3);
}

#[test]
fn test_cancelled_run_can_be_retried() {
    let mut driver = GeneratorDriver::default();
    driver.set_source("src/lib.rs", "pub struct Person;");

    driver.cancellation().cancel();
    assert!(matches!(driver.run(), Err(Error::Cancelled)));

    let result = driver.run().unwrap();
    assert_eq!(result.definitions.len(), 4);
    assert!(result.source("generated.PersonTypeBuilder.rs").is_some());
}

#[test]
fn test_add_directory_and_write() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("models")).unwrap();
    fs::create_dir_all(src.join("bin")).unwrap();
    fs::write(src.join("lib.rs"), "pub mod models;").unwrap();
    fs::write(src.join("models/mod.rs"), "pub mod geo;\npub struct Person;").unwrap();
    fs::write(src.join("models/geo.rs"), "pub struct Point { pub x: i32 }").unwrap();
    fs::write(src.join("bin/tool.rs"), "pub struct Ignored;").unwrap();
    fs::write(src.join("notes.txt"), "not rust").unwrap();

    let mut driver = GeneratorDriver::default();
    assert_eq!(driver.add_directory(&src).unwrap(), 3);

    let result = driver.run().unwrap();
    let types: Vec<&str> = result.definitions[3..]
        .iter()
        .map(|d| d.full_type_name.as_str())
        .collect();
    assert_eq!(types, vec!["crate::models::geo::Point", "crate::models::Person"]);

    let out = dir.path().join("out");
    let written = result.write_to(&out).unwrap();
    assert_eq!(fs::read_to_string(&written).unwrap(), result.module_tree());

    fs::remove_file(src.join("models/geo.rs")).unwrap();
    assert_eq!(driver.add_directory(&src).unwrap(), 2);
    let result = driver.run().unwrap();
    assert_eq!(result.definitions.len(), 4);
    assert!(result.steps(Step::Syntax).any(|s| s.reason == RunReason::Removed));
}

fn type_names(result: &RunResult) -> Vec<&str> {
    result.definitions[3..]
        .iter()
        .map(|d| d.full_type_name.as_str())
        .collect()
}

#[test]
fn test_private_file_module_behind_facade() {
    let mut driver = GeneratorDriver::default();
    driver.set_source("src/lib.rs", "pub mod models;");
    driver.set_source(
        "src/models.rs",
        "mod city;\npub use city::City;\n\npub struct Country;",
    );
    driver.set_source("src/models/city.rs", "pub struct City { pub name: String }");

    let result = driver.run().unwrap();

    assert_eq!(type_names(&result), vec!["crate::models::Country"]);
    assert!(!result.module_tree().contains("crate::models::city::City"));
}

#[test]
fn test_private_file_module_at_root_is_visible() {
    let mut driver = GeneratorDriver::default();
    driver.set_source("src/lib.rs", "mod city;\npub use city::City;");
    driver.set_source("src/city.rs", "pub struct City { pub name: String }");

    let result = driver.run().unwrap();

    assert_eq!(type_names(&result), vec!["crate::city::City"]);
}

#[test]
fn test_cfg_test_module_is_skipped() {
    let mut driver = GeneratorDriver::default();
    driver.set_source("src/lib.rs", "pub mod models;\n\n#[cfg(test)]\nmod fixtures;");
    driver.set_source("src/fixtures.rs", "pub struct Fixture;");
    driver.set_source("src/models.rs", "pub struct Person;");

    let result = driver.run().unwrap();

    assert_eq!(type_names(&result), vec!["crate::models::Person"]);
}

#[test]
fn test_orphan_file_is_skipped() {
    let options = GeneratorOptions::default().with_policy(MarkerPolicy::Diagnose);
    let mut driver = GeneratorDriver::new(options);
    driver.set_source("src/lib.rs", "pub struct Person;");
    driver.set_source(
        "src/scratch.rs",
        "pub struct Scratch;\n\n#[datodia::type_builder]\npub struct Draft;",
    );
    driver.set_source("src/broken.rs", "pub struct {");

    let result = driver.run().unwrap();

    assert_eq!(type_names(&result), vec!["crate::Person"]);
    assert!(result.diagnostics.is_empty());

    driver.set_source("src/lib.rs", "pub struct Person;\npub mod scratch;");
    let result = driver.run().unwrap();
    assert_eq!(type_names(&result), vec!["crate::Person", "crate::scratch::Scratch"]);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].code, codes::MISSING_CAPABILITY);
}

#[test]
fn test_main_next_to_lib_is_skipped() {
    let mut driver = GeneratorDriver::default();
    driver.set_source("src/cli.rs", "pub struct Command;");
    driver.set_source("src/lib.rs", "pub mod models;");
    driver.set_source("src/main.rs", "mod cli;\n\npub struct Args;");
    driver.set_source("src/models.rs", "pub struct Person;");

    let result = driver.run().unwrap();
    assert_eq!(type_names(&result), vec!["crate::models::Person"]);

    assert!(driver.remove_source("src/lib.rs"));
    assert!(driver.remove_source("src/models.rs"));
    let result = driver.run().unwrap();
    assert_eq!(type_names(&result), vec!["crate::cli::Command", "crate::Args"]);
}

#[test]
fn test_record_with_private_field_type_is_skipped() {
    let source = r#"pub mod models {
    struct Hidden;

    pub struct Wrapper {
        pub inner: Hidden,
    }
}
"#;
    let mut driver = GeneratorDriver::default();
    driver.set_source("src/lib.rs", source);

    let result = driver.run().unwrap();
    assert_eq!(result.definitions, builtin_builders());
    assert!(result.diagnostics.is_empty());

    driver.set_options(GeneratorOptions::default().with_policy(MarkerPolicy::Diagnose));
    let result = driver.run().unwrap();
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].code, codes::UNREACHABLE_TYPE);
    assert_eq!(result.diagnostics[0].line, 4);
}

#[test]
fn test_private_field_type_from_other_file() {
    let mut driver = GeneratorDriver::default();
    driver.set_source("src/lib.rs", "pub mod geo;\npub mod models;");
    driver.set_source("src/geo.rs", "struct Secret;\npub struct Point;");
    driver.set_source(
        "src/models.rs",
        r#"use crate::geo::{Point, Secret};

pub struct Place {
    pub at: Point,
}

pub struct Vault {
    pub secret: Option<Secret>,
}
"#,
    );

    let result = driver.run().unwrap();
    assert_eq!(
        type_names(&result),
        vec!["crate::geo::Point", "crate::models::Place"]
    );

    driver.set_source("src/geo.rs", "pub struct Secret;\npub struct Point;");
    let result = driver.run().unwrap();
    assert_eq!(
        type_names(&result),
        vec![
            "crate::geo::Secret",
            "crate::geo::Point",
            "crate::models::Place",
            "crate::models::Vault"
        ]
    );
    assert!(
        reasons_for(&result, "src/models.rs").contains(&(Step::Records, RunReason::Modified))
    );
}
