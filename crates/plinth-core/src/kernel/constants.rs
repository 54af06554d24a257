/// Application name
pub const APP_NAME: &str = "Plinth";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default plugins directory
pub const DEFAULT_PLUGINS_DIR: &str = "plugins";

/// File stem shared by every manifest file name (`plugin.json`, `plugin.toml`, ...)
pub const MANIFEST_FILE_STEM: &str = "plugin";
