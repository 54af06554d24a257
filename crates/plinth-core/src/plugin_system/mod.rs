//! # Plinth Core Plugin System
//!
//! Everything between "a plugin was registered" and "every plugin is running".
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`plugin`]**: The [`Plugin`] entity, its [`PluginMetadata`] and the
//!   initializer callback it runs.
//! - **[`registry`]**: The [`Registry`] that owns plugins and runs the
//!   resolve, prioritize and initialize phases.
//! - **[`collection`]**: [`PluginCollection`], the ordered, filterable view the
//!   registry hands out.
//! - **[`dependency`]**: [`DependencyError`](dependency::DependencyError) for
//!   missing, mismatched and cyclic dependencies.
//! - **[`version`]**: Semantic version parsing and [`VersionRange`].
//! - **[`manifest`]**: Declarative plugin descriptions read from files.
//! - **[`loader`]**: [`PluginSource`](loader::PluginSource) implementations that
//!   feed registrations into the registry.
pub mod collection;
pub mod dependency;
pub mod loader;
pub mod manifest;
pub mod plugin;
pub mod registry;
pub mod version;

pub use collection::PluginCollection;
pub use dependency::DependencyError;
pub use loader::{ManifestSource, PluginSource, Registration, StaticSource, load_all};
pub use manifest::PluginManifest;
pub use plugin::{Initializer, Plugin, PluginContext, PluginMetadata};
pub use registry::{BootstrapPhase, Registry};
pub use version::{VersionError, VersionRange};
