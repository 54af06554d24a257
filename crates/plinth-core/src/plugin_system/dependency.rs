use semver::Version;
use thiserror::Error;

use crate::plugin_system::version::VersionRange;

/// Failures while linking or ordering the plugin dependency graph
#[derive(Debug, Error)]
pub enum DependencyError {
    /// A plugin names a dependency that is not registered
    #[error("Plugin '{plugin}' requires '{dependency}', which is not registered")]
    MissingDependency { plugin: String, dependency: String },

    /// The dependency exists, but its version is outside the requested range
    #[error("Plugin version mismatch: '{plugin}' requires '{dependency}' version '{range}' but found '{version}'")]
    VersionMismatch {
        plugin: String,
        dependency: String,
        version: Version,
        range: VersionRange,
    },

    /// Ordering made no progress; these plugins are in a cycle or depend on one
    #[error("Circular dependency detected among: {}", .0.join(", "))]
    CyclicDependency(Vec<String>),
}
