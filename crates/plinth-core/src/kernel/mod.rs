//! # Plinth Core Kernel
//!
//! The `kernel` module holds what the rest of the crate shares and what a host
//! needs to drive the plugin pipeline end to end.
//!
//! - **Bootstrapping**: [`Application`](bootstrap::Application) owns the
//!   registry, the injector and the plugin sources, and runs
//!   Load, Resolve, Prioritize and Initialize in order.
//! - **Configuration**: [`BootstrapConfig`](config::BootstrapConfig) and the
//!   format detection used for both config and manifest files.
//! - **Constants**: defaults shared by the config layer and the loader.
//! - **Error Handling**: the crate-wide [`Error`](error::Error) and `Result` alias.
pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod error;

pub use bootstrap::Application;
pub use config::{BootstrapConfig, ConfigFormat};
pub use error::{BoxError, Error, Result};
