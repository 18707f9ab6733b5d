//! Builders shipped with the `datodia` runtime crate.

use crate::model::BuilderDefinition;

/// Module of the runtime crate that holds the built-in builders.
pub const BUILTIN_NAMESPACE: &str = "::datodia::builders";

/// The built-in builders, in registration order.
///
/// They always precede discovered builders, so a discovered definition with
/// the same identity can never replace one of them.
pub fn builtin_builders() -> Vec<BuilderDefinition> {
    [
        ("String", "StringTypeBuilder"),
        ("::datodia::Uuid", "UuidTypeBuilder"),
        ("bool", "BoolTypeBuilder"),
    ]
    .into_iter()
    .map(|(ty, builder)| BuilderDefinition::new(ty, builder, BUILTIN_NAMESPACE))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_builders_order() {
        let builders = builtin_builders();
        let types: Vec<&str> = builders.iter().map(|b| b.full_type_name.as_str()).collect();

        assert_eq!(types, vec!["String", "::datodia::Uuid", "bool"]);
        assert_eq!(
            builders[2].builder_path(),
            "::datodia::builders::BoolTypeBuilder"
        );
        assert!(builders.iter().all(|b| b.constructor.is_none()));
    }
}
