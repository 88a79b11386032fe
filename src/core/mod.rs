pub mod plugin_manager;
pub mod registry;
pub mod scheduler;

pub use plugin_manager::PluginManager;
pub use registry::{ActiveStyles, ObjectRegistry, StyleCache};
pub use scheduler::{CancelFlag, FrameScheduler};
