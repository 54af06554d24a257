//! Plugins compiled into the `plinth` binary.
//!
//! They form a small chain (`settings` <- `greeter` <- `banner`) that exercises
//! value and factory descriptors across plugin boundaries. Manifest plugins can
//! depend on any of them by name.

use plinth_core::plugin_system::StaticSource;
use plinth_core::{PluginMetadata, Registry, Result};

/// Injector key of the rendered banner text.
pub const BANNER_KEY: &str = "banner";

/// Greeting configuration published by the `settings` plugin.
#[derive(Debug, Clone)]
pub struct Settings {
    pub greeting: String,
}

/// Built on demand from [`Settings`] by the `greeter` factory.
#[derive(Debug)]
pub struct Greeter {
    greeting: String,
}

impl Greeter {
    pub fn greet(&self, target: &str) -> String {
        format!("{}, {}!", self.greeting, target)
    }
}

pub fn source() -> StaticSource {
    StaticSource::new("builtin")
        .with(register_settings)
        .with(register_greeter)
        .with(register_banner)
}

fn register_settings(registry: &mut Registry) -> Result<()> {
    registry
        .plugin("settings", PluginMetadata::new("1.0.0").field("greeting", "Hello"))?
        .initializer(|context, injector| {
            let greeting = context
                .field("greeting")
                .and_then(|v| v.as_str())
                .unwrap_or("Hi")
                .to_string();
            injector.value("settings", Settings { greeting })?;
            Ok(())
        });
    Ok(())
}

fn register_greeter(registry: &mut Registry) -> Result<()> {
    registry
        .plugin("greeter", PluginMetadata::new("1.1.0").dependency("settings", "^1"))?
        .initializer(|_, injector| {
            injector.factory("greeter", |injector| {
                let settings = injector.get_as::<Settings>("settings")?;
                Ok(Greeter {
                    greeting: settings.greeting.clone(),
                })
            })?;
            Ok(())
        });
    Ok(())
}

fn register_banner(registry: &mut Registry) -> Result<()> {
    registry
        .plugin(
            "banner",
            PluginMetadata::new("0.2.0")
                .dependency("greeter", "^1.1")
                .field("target", "plinth"),
        )?
        .initializer(|context, injector| {
            let target = context.field("target").and_then(|v| v.as_str()).unwrap_or("world");
            let greeter = injector.get_as::<Greeter>("greeter")?;
            injector.value(BANNER_KEY, greeter.greet(target))?;
            Ok(())
        });
    Ok(())
}
