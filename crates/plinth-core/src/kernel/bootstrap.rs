use crate::injector::Injector;
use crate::kernel::config::BootstrapConfig;
use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::plugin_system::loader::{ManifestSource, PluginSource, load_all};
use crate::plugin_system::registry::Registry;

/// Main application struct tying plugin sources, the registry and the injector together
///
/// Sources added with [`add_source`](Self::add_source) are loaded first, in the
/// order they were added, followed by the manifest directories named in the
/// config. Plugins the config disables are dropped before resolution.
pub struct Application {
    config: BootstrapConfig,
    registry: Registry,
    injector: Injector,
    sources: Vec<Box<dyn PluginSource>>,
    loaded: bool,
}

impl Application {
    pub fn new(config: BootstrapConfig) -> Self {
        log::info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);
        Self {
            config,
            registry: Registry::new(),
            injector: Injector::new(),
            sources: Vec::new(),
            loaded: false,
        }
    }

    /// Use a pre-populated injector, e.g. one holding host services.
    pub fn with_injector(mut self, injector: Injector) -> Self {
        self.injector = injector;
        self
    }

    pub fn add_source(&mut self, source: impl PluginSource + 'static) -> &mut Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn injector(&self) -> &Injector {
        &self.injector
    }

    pub fn injector_mut(&mut self) -> &mut Injector {
        &mut self.injector
    }

    /// Load phase: apply every source, then drop disabled plugins.
    ///
    /// Sources register into a scratch registry that is merged in only when
    /// all of them succeed, so a failed load leaves the registry as it was and
    /// can be retried. Once a load succeeds, later calls return 0 without
    /// touching the sources.
    pub async fn load(&mut self) -> Result<usize> {
        if self.loaded {
            log::debug!("Plugins already loaded, skipping.");
            return Ok(0);
        }

        let mut sources = std::mem::take(&mut self.sources);
        sources.push(Box::new(ManifestSource::from_config(&self.config)));
        let mut staged = Registry::new();
        let outcome = load_all(&mut staged, &sources).await;
        sources.pop();
        self.sources = sources;
        let applied = outcome?;
        self.registry.merge(staged)?;

        let disabled: Vec<String> = self
            .registry
            .names()
            .filter(|name| self.config.is_disabled(name))
            .map(str::to_string)
            .collect();
        for name in &disabled {
            self.registry.del(name);
            log::info!("Plugin '{}' is disabled, skipping.", name);
        }

        self.loaded = true;
        log::info!("Loaded {} plugins ({} registered)", applied, self.registry.len());
        Ok(applied)
    }

    /// Resolve, prioritize and initialize everything that has been loaded.
    pub fn start(&mut self) -> Result<()> {
        self.registry.bootstrap(&mut self.injector)
    }

    /// Load, then start.
    pub async fn run(&mut self) -> Result<()> {
        self.load().await?;
        self.start()?;
        log::info!("Application initialized and started successfully.");
        Ok(())
    }
}
