use tracing::{info, warn};

use crate::host::StyleHost;
use crate::plugins::PluginBox;

/// Plugins attached to one animation, in registration order
pub struct PluginManager<H: StyleHost> {
    plugins: Vec<PluginBox<H>>,
}

impl<H: StyleHost> PluginManager<H> {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Retain an already initialized plugin
    pub fn push(&mut self, plugin: PluginBox<H>) {
        info!("✅ Plugin '{}' attached", plugin.name());
        self.plugins.push(plugin);
    }

    /// Take every plugin out, leaving the manager empty
    pub fn take_all(&mut self) -> Vec<PluginBox<H>> {
        std::mem::take(&mut self.plugins)
    }

    /// Destroy `plugins` in order; failures are logged, not propagated
    pub fn destroy_all(plugins: Vec<PluginBox<H>>) {
        for mut plugin in plugins {
            match plugin.destroy() {
                Ok(()) => info!("🔌 Plugin '{}' destroyed", plugin.name()),
                Err(e) => warn!("⚠️  Plugin '{}' failed to destroy cleanly: {}", plugin.name(), e),
            }
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }
}

impl<H: StyleHost> Default for PluginManager<H> {
    fn default() -> Self {
        Self::new()
    }
}
