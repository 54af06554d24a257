//! # Plinth Core
//!
//! A dependency injection container and plugin lifecycle core.
//!
//! Plugins are registered with a [`Registry`] under unique names, each carrying a
//! semantic version and a set of version-ranged dependencies on other plugins.
//! The registry then runs the bootstrap pipeline:
//!
//! 1. **Resolve** links every plugin to the plugins it depends on, checking
//!    versions against the requested ranges.
//! 2. **Prioritize** computes an initialization order where every plugin comes
//!    after its dependencies.
//! 3. **Initialize** runs each plugin's initializer in that order, handing it the
//!    shared [`Injector`] so it can expose services to, and consume services from,
//!    other plugins.
//!
//! Discovery of plugins is left to [`PluginSource`](plugin_system::loader::PluginSource)
//! implementations, and [`Application`] ties sources, configuration and the
//! pipeline together for a host binary.
pub mod injector;
pub mod kernel;
pub mod plugin_system;
pub mod query;

pub use injector::{Descriptor, DescriptorKind, DependencyCollection, Injector, Instance};
pub use kernel::{Application, BootstrapConfig, Error, Result};
pub use plugin_system::{
    BootstrapPhase, Plugin, PluginCollection, PluginContext, PluginManifest, PluginMetadata,
    Registry, VersionRange,
};
pub use query::{Fields, Match, Predicate};

#[cfg(test)]
mod tests;
