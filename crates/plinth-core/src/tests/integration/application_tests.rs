#![cfg(test)]

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use crate::injector::Injector;
use crate::kernel::bootstrap::Application;
use crate::kernel::config::BootstrapConfig;
use crate::kernel::error::{Error, Result};
use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::loader::StaticSource;
use crate::plugin_system::plugin::PluginMetadata;
use crate::plugin_system::registry::{BootstrapPhase, Registry};

fn register_clock(registry: &mut Registry) -> Result<()> {
    registry
        .plugin("clock", PluginMetadata::new("1.2.0"))?
        .initializer(|_, injector| {
            injector.value("clock.epoch", 1_700_000_000u64)?;
            Ok(())
        });
    Ok(())
}

fn register_scheduler(registry: &mut Registry) -> Result<()> {
    registry
        .plugin("scheduler", PluginMetadata::new("0.3.0").dependency("clock", ">=1.0, <2.0"))?
        .initializer(|_, injector| {
            let epoch = injector.get_as::<u64>("clock.epoch")?;
            injector.value("scheduler.start", *epoch + 60)?;
            Ok(())
        });
    Ok(())
}

fn write_manifest(dir: &Path, body: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("plugin.json"), body).unwrap();
}

fn config_for(dir: &Path) -> BootstrapConfig {
    BootstrapConfig {
        plugin_dirs: vec![dir.to_path_buf()],
        ..BootstrapConfig::default()
    }
}

fn builtins() -> StaticSource {
    StaticSource::new("builtin").with(register_clock).with(register_scheduler)
}

#[tokio::test]
async fn test_run_static_and_manifest_plugins() {
    let dir = tempdir().unwrap();
    write_manifest(
        &dir.path().join("audit"),
        r#"{ "name": "audit", "version": "1.0.0", "dependencies": { "scheduler": "~0.3" } }"#,
    );

    let mut app = Application::new(config_for(dir.path()));
    app.add_source(builtins());
    app.run().await.unwrap();

    assert_eq!(app.registry().phase(), BootstrapPhase::Initialize);
    assert_eq!(app.registry().prioritized().names(), vec!["clock", "scheduler", "audit"]);
    assert!(app.registry().iter().all(|p| p.is_started()));
    assert_eq!(*app.injector().get_as::<u64>("scheduler.start").unwrap(), 1_700_000_060);
}

#[tokio::test]
async fn test_load_runs_once() {
    let dir = tempdir().unwrap();
    let mut app = Application::new(config_for(dir.path()));
    app.add_source(builtins());

    assert_eq!(app.load().await.unwrap(), 2);
    assert_eq!(app.load().await.unwrap(), 0);
    assert_eq!(app.registry().len(), 2);
}

#[tokio::test]
async fn test_disabled_plugin_is_dropped() {
    let dir = tempdir().unwrap();
    let mut config = config_for(dir.path());
    config.disabled = vec!["scheduler".to_string()];

    let mut app = Application::new(config);
    app.add_source(builtins());
    app.run().await.unwrap();

    assert!(!app.registry().contains("scheduler"));
    assert_eq!(app.registry().prioritized().names(), vec!["clock"]);
    assert!(!app.injector().contains("scheduler.start"));
}

#[tokio::test]
async fn test_disabling_a_dependency_fails_resolution() {
    let dir = tempdir().unwrap();
    let mut config = config_for(dir.path());
    config.disabled = vec!["clock".to_string()];

    let mut app = Application::new(config);
    app.add_source(builtins());
    let err = app.run().await.unwrap_err();

    match err {
        Error::Dependency(DependencyError::MissingDependency { plugin, dependency }) => {
            assert_eq!(plugin, "scheduler");
            assert_eq!(dependency, "clock");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(app.registry().iter().all(|p| !p.is_started()));
}

#[tokio::test]
async fn test_manifest_version_mismatch_stops_start() {
    let dir = tempdir().unwrap();
    write_manifest(
        &dir.path().join("legacy"),
        r#"{ "name": "legacy", "version": "0.1.0", "dependencies": { "clock": "^2" } }"#,
    );

    let mut app = Application::new(config_for(dir.path()));
    app.add_source(builtins());
    app.load().await.unwrap();

    let err = app.start().unwrap_err();
    assert!(matches!(
        err,
        Error::Dependency(DependencyError::VersionMismatch { ref plugin, .. }) if plugin == "legacy"
    ));
}

#[tokio::test]
async fn test_host_services_are_visible_to_plugins() {
    let dir = tempdir().unwrap();
    let mut host = Injector::new();
    host.value("host.name", "test-host".to_string()).unwrap();

    let mut app = Application::new(config_for(dir.path())).with_injector(host);
    app.registry_mut()
        .plugin("greeting", PluginMetadata::new("1.0.0"))
        .unwrap()
        .initializer(|_, injector| {
            let host = injector.get_as::<String>("host.name")?;
            injector.value("greeting", format!("hello from {host}"))?;
            Ok(())
        });
    app.run().await.unwrap();

    assert_eq!(*app.injector().get_as::<String>("greeting").unwrap(), "hello from test-host");
}

#[tokio::test]
async fn test_failed_load_leaves_registry_untouched() {
    let dir = tempdir().unwrap();
    write_manifest(&dir.path().join("broken"), "{ \"name\": \"broken\"");

    let mut app = Application::new(config_for(dir.path()));
    app.add_source(builtins());
    let err = app.load().await.unwrap_err();
    assert!(matches!(err, Error::Manifest { .. }));
    assert!(app.registry().is_empty());

    write_manifest(
        &dir.path().join("broken"),
        r#"{ "name": "fixed", "version": "1.0.0", "dependencies": { "clock": "^1" } }"#,
    );
    assert_eq!(app.load().await.unwrap(), 3);
    assert_eq!(app.registry().names().collect::<Vec<_>>(), vec!["clock", "scheduler", "fixed"]);
    app.start().unwrap();
}

#[tokio::test]
async fn test_loaded_plugin_clashing_with_preregistered_one() {
    let dir = tempdir().unwrap();
    let mut app = Application::new(config_for(dir.path()));
    app.registry_mut().plugin("clock", PluginMetadata::new("9.0.0")).unwrap();
    app.add_source(builtins());

    let err = app.load().await.unwrap_err();
    assert!(matches!(err, Error::DuplicatePlugin { ref name } if name == "clock"));
    assert_eq!(app.registry().names().collect::<Vec<_>>(), vec!["clock"]);
}
