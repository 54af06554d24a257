#![cfg(test)]

use std::sync::{Arc, Mutex};

use crate::plugin_system::plugin::PluginMetadata;
use crate::plugin_system::registry::Registry;

/// Shared record of initializer calls, in call order.
pub type InitOrder = Arc<Mutex<Vec<String>>>;

pub fn init_order() -> InitOrder {
    Arc::new(Mutex::new(Vec::new()))
}

/// Register a plugin whose initializer appends its name to `order`.
pub fn tracked_plugin(registry: &mut Registry, name: &str, metadata: PluginMetadata, order: &InitOrder) {
    let order = order.clone();
    registry
        .plugin(name, metadata)
        .expect("register tracked plugin")
        .initializer(move |context, _| {
            order.lock().unwrap().push(context.name.to_string());
            Ok(())
        });
}

pub fn recorded(order: &InitOrder) -> Vec<String> {
    order.lock().unwrap().clone()
}
