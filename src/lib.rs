//! Stagehand - a declarative, time-addressable style animation engine
//!
//! Rules declare which styles a layer (or elements inside it) should have at
//! a given instant or over a time range. The engine resolves any requested
//! time into interpolated style values and writes the difference to a
//! [`StyleHost`], supporting play, pause, stepping and arbitrary seeking.

pub mod animation;
pub mod config;
pub mod core;
pub mod error;
pub mod host;
pub mod plugins;

// Re-export commonly used types
pub use animation::{
    styles, Animation, CssValue, Dimension, Rule, Timeline, TransformFunction, WeakAnimation,
};
pub use config::{Config, EngineConfig, TimeUnit};
pub use error::{DefineError, ResolutionError, ValidationError};
pub use host::{Layer, MemoryHost, NodeId, StyleHost};
pub use plugins::{Plugin, ScrollSync, Transport, TransportCommand};
