//! # Plinth Core Errors
//!
//! Defines [`Error`], the single error type surfaced by the injector, the plugin
//! registry, the loader and the config layer. Dependency graph failures keep
//! their own [`DependencyError`] and convert into [`Error::Dependency`].
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::registry::BootstrapPhase;
use crate::plugin_system::version::VersionError;

/// Boxed error returned by plugin initializers and service factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, ThisError)]
pub enum Error {
    // --- Injector ---
    #[error("Descriptor already registered: {name}")]
    DuplicateDescriptor { name: String },

    #[error("No descriptor registered under '{name}'")]
    UnresolvedName { name: String },

    /// A value did not have the type the caller asked for.
    #[error("Type mismatch for '{name}': expected {expected}")]
    TypeMismatch { name: String, expected: String },

    #[error("Factory for '{name}' failed: {source}")]
    Factory {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("Factory for '{name}' depends on its own instance")]
    CyclicFactory { name: String },

    // --- Plugins ---
    #[error("Plugin name must not be empty")]
    EmptyName,

    #[error("Plugin already registered: {name}")]
    DuplicatePlugin { name: String },

    #[error("Plugin '{plugin}' has an invalid version: {source}")]
    InvalidVersion {
        plugin: String,
        #[source]
        source: VersionError,
    },

    #[error("Plugin '{plugin}' has an invalid range for dependency '{dependency}': {source}")]
    InvalidVersionRange {
        plugin: String,
        dependency: String,
        #[source]
        source: VersionError,
    },

    #[error("Dependency resolution failed: {0}")]
    Dependency(#[from] DependencyError),

    #[error("Plugin '{name}' has already been started")]
    AlreadyStarted { name: String },

    #[error("Plugin initialization error for '{plugin}': {source}")]
    Initializer {
        plugin: String,
        #[source]
        source: BoxError,
    },

    /// A pipeline phase was requested before the phase it builds on.
    #[error("Cannot {attempted} before {required} has completed (current phase: {current})")]
    PhaseOrder {
        attempted: BootstrapPhase,
        required: BootstrapPhase,
        current: BootstrapPhase,
    },

    // --- Loading & Config ---
    #[error("Plugin manifest error for '{}': {message}", .path.display())]
    Manifest { path: PathBuf, message: String },

    #[error("Configuration error for '{}': {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("I/O error during '{operation}' on '{}': {source}", .path.display())]
    Io {
        #[source]
        source: std::io::Error,
        operation: String,
        path: PathBuf,
    },
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl Error {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::Io {
            source,
            operation: operation.into(),
            path,
        }
    }

    /// Wraps an arbitrary error raised while producing the service `name`.
    pub fn factory(name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Factory {
            name: name.into(),
            source: source.into(),
        }
    }
}
