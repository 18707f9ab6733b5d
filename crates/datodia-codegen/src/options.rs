//! Generator configuration.

use serde::{Deserialize, Serialize};

/// What to do with a marked struct that cannot be registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerPolicy {
    /// Drop it silently.
    #[default]
    Skip,
    /// Drop it and report a warning diagnostic.
    Diagnose,
}

/// Options controlling builder discovery and output layout.
///
/// Every field has a default, so a partial JSON document is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    pub policy: MarkerPolicy,
    /// Last path segment of the marker attribute.
    pub marker: String,
    /// Path of the builder trait.
    pub capability: String,
    /// Module holding generated record builders.
    pub generated_root: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            policy: MarkerPolicy::Skip,
            marker: "type_builder".to_string(),
            capability: "datodia::TypeBuilder".to_string(),
            generated_root: "generated".to_string(),
        }
    }
}

impl GeneratorOptions {
    pub fn with_policy(mut self, policy: MarkerPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = capability.into();
        self
    }

    pub fn with_generated_root(mut self, root: impl Into<String>) -> Self {
        self.generated_root = root.into();
        self
    }
}
