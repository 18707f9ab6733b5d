//! Combines the builder sources into the registration set.

use rustc_hash::FxHashSet;

use crate::model::BuilderDefinition;

/// Built-in builders, then marked builders, then records, with later
/// duplicates of an identity triple removed.
pub fn aggregate(
    builtins: Vec<BuilderDefinition>,
    marked: impl IntoIterator<Item = BuilderDefinition>,
    records: impl IntoIterator<Item = BuilderDefinition>,
) -> Vec<BuilderDefinition> {
    dedup_first_wins(builtins.into_iter().chain(marked).chain(records))
}

/// Keep the first definition of every identity triple, preserving order.
pub fn dedup_first_wins(
    definitions: impl IntoIterator<Item = BuilderDefinition>,
) -> Vec<BuilderDefinition> {
    let mut seen: FxHashSet<(String, String, String)> = FxHashSet::default();

    definitions
        .into_iter()
        .filter(|definition| {
            let (ty, builder, namespace) = definition.key();
            seen.insert((ty.to_string(), builder.to_string(), namespace.to_string()))
        })
        .collect()
}
