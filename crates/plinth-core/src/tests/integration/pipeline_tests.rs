#![cfg(test)]

use std::sync::Arc;

use crate::injector::{Descriptor, Injector};
use crate::kernel::error::Error;
use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::plugin::{Plugin, PluginMetadata};
use crate::plugin_system::registry::Registry;
use crate::query::Match;

use super::common::{init_order, recorded, tracked_plugin};

#[test]
fn test_chain_end_to_end() {
    let order = init_order();
    let mut registry = Registry::new();
    tracked_plugin(&mut registry, "a", PluginMetadata::new("1.0.0"), &order);
    tracked_plugin(&mut registry, "b", PluginMetadata::new("1.0.0").dependency("a", "^1.0.0"), &order);
    tracked_plugin(&mut registry, "c", PluginMetadata::new("1.0.0").dependency("b", "^1.0.0"), &order);

    registry.resolve().unwrap();
    registry.prioritize().unwrap();
    assert_eq!(registry.prioritized().names(), vec!["a", "b", "c"]);

    let mut injector = Injector::new();
    registry.initialize(&mut injector).unwrap();
    assert_eq!(recorded(&order), vec!["a", "b", "c"]);
}

#[test]
fn test_registration_order_does_not_decide_dependency_order() {
    let order = init_order();
    let mut registry = Registry::new();
    tracked_plugin(&mut registry, "c", PluginMetadata::new("1.0.0").dependency("b", "^1.0.0"), &order);
    tracked_plugin(&mut registry, "b", PluginMetadata::new("1.0.0").dependency("a", "^1.0.0"), &order);
    tracked_plugin(&mut registry, "a", PluginMetadata::new("1.0.0"), &order);

    registry.bootstrap(&mut Injector::new()).unwrap();
    assert_eq!(recorded(&order), vec!["a", "b", "c"]);
}

#[test]
fn test_two_plugin_cycle_terminates_with_error() {
    let mut registry = Registry::new();
    registry.plugin("a", PluginMetadata::new("1.0.0").dependency("b", "^1")).unwrap();
    registry.plugin("b", PluginMetadata::new("1.0.0").dependency("a", "^1")).unwrap();

    let err = registry.bootstrap(&mut Injector::new()).unwrap_err();
    assert!(matches!(err, Error::Dependency(DependencyError::CyclicDependency(_))));
    assert!(registry.iter().all(|p| !p.is_started()));
}

#[test]
fn test_services_flow_between_plugins() {
    #[derive(Debug)]
    struct Pool {
        size: usize,
    }

    struct Exporter {
        format: &'static str,
    }

    let mut registry = Registry::new();
    registry
        .plugin("report", PluginMetadata::new("1.0.0").dependency("db", "^2").dependency("csv", "*"))
        .unwrap()
        .initializer(|_, injector| {
            let pool = injector.get_as::<Pool>("db.pool")?;
            let formats: Vec<&'static str> = injector
                .filter(Match::new().field("exporter", true))
                .values_as::<Exporter>()?
                .iter()
                .map(|e| e.format)
                .collect();
            injector.value("report.summary", format!("pool={} formats={}", pool.size, formats.join(",")))?;
            Ok(())
        });
    registry
        .plugin("db", PluginMetadata::new("2.3.1").field("pool_size", 8))
        .unwrap()
        .initializer(|context, injector| {
            let size = context.field("pool_size").and_then(|v| v.as_u64()).unwrap_or(1) as usize;
            injector.factory("db.pool", move |_| Ok(Pool { size }))?;
            Ok(())
        });
    registry
        .plugin("csv", PluginMetadata::new("0.4.0"))
        .unwrap()
        .initializer(|_, injector| {
            injector.register(Descriptor::value("export.csv", Exporter { format: "csv" }).with_field("exporter", true))?;
            injector.register(Descriptor::value("export.tsv", Exporter { format: "tsv" }).with_field("exporter", true))?;
            Ok(())
        });

    let mut injector = Injector::new();
    registry.bootstrap(&mut injector).unwrap();

    assert_eq!(registry.prioritized().names(), vec!["db", "csv", "report"]);
    assert_eq!(
        *injector.get_as::<String>("report.summary").unwrap(),
        "pool=8 formats=csv,tsv"
    );
    let first = injector.get("db.pool").unwrap();
    let second = injector.get("db.pool").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_started_plugins_are_queryable_after_bootstrap() {
    let mut registry = Registry::new();
    registry.plugin("x", PluginMetadata::new("1.0.0").field("enabled", true)).unwrap();
    registry.plugin("y", PluginMetadata::new("1.0.0").field("enabled", false)).unwrap();
    registry.bootstrap(&mut Injector::new()).unwrap();

    let started = registry.filter(Match::new().field("started", true).field("enabled", true));
    assert_eq!(started.names(), vec!["x"]);
    assert_eq!(registry.filter(|p: &Plugin| p.is_started()).len(), 2);
}

#[test]
fn test_rerun_after_adding_plugin() {
    let order = init_order();
    let mut registry = Registry::new();
    tracked_plugin(&mut registry, "base", PluginMetadata::new("1.0.0"), &order);

    let mut injector = Injector::new();
    registry.bootstrap(&mut injector).unwrap();

    tracked_plugin(&mut registry, "late", PluginMetadata::new("1.0.0").dependency("base", "^1"), &order);
    registry.resolve().unwrap();
    registry.prioritize().unwrap();
    // 'base' is already running, so walking the whole order again hits the guard
    let err = registry.initialize(&mut injector).unwrap_err();
    assert!(matches!(err, Error::AlreadyStarted { ref name } if name == "base"));

    registry.get_mut("late").unwrap().initialize(&mut injector).unwrap();
    assert_eq!(recorded(&order), vec!["base", "late"]);
}
