use anyhow::Result;

use crate::animation::Animation;
use crate::host::StyleHost;

pub mod scroll;
pub mod transport;

pub use scroll::ScrollSync;
pub use transport::{Transport, TransportCommand};

/// Behaviour attached around an animation without the engine depending on it
pub trait Plugin<H: StyleHost>: Send {
    /// Plugin name
    fn name(&self) -> &str;

    /// Called once when the plugin is added.
    ///
    /// Long-lived tasks should keep `engine.downgrade()` rather than a clone,
    /// since the engine owns the plugin and a clone would keep it alive.
    fn init(&mut self, engine: &Animation<H>) -> Result<()>;

    /// Called on dispose; must release anything started in `init`
    fn destroy(&mut self) -> Result<()>;
}

pub type PluginBox<H> = Box<dyn Plugin<H>>;
