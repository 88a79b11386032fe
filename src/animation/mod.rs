use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

pub mod lexer;
pub mod parser;
pub mod properties;
pub mod rules;
pub mod timeline;

// Re-export commonly used types
pub use properties::{CssValue, Dimension, TransformFunction};
pub use rules::{styles, ParsedRule, ParsedStyles, Rule, Selector, Styles};
pub use timeline::Timeline;

use crate::config::{Config, EngineConfig};
use crate::core::plugin_manager::PluginManager;
use crate::core::scheduler::{CancelFlag, FrameScheduler};
use crate::error::DefineError;
use crate::host::{Layer, StyleHost};
use crate::plugins::Plugin;

struct Shared<H: StyleHost> {
    timeline: Arc<Mutex<Timeline<H>>>,
    scheduler: Mutex<FrameScheduler>,
    plugins: Mutex<PluginManager<H>>,
}

/// Player over a [`Timeline`].
///
/// Cloning yields another handle to the same engine; plugins and drivers
/// hold such clones. Redefining rules while playing is not supported, call
/// `pause` first. Elements must not be shared with another engine.
pub struct Animation<H: StyleHost> {
    shared: Arc<Shared<H>>,
}

impl<H: StyleHost> Clone for Animation<H> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Non-owning handle to an [`Animation`].
///
/// Driver tasks hold one so that dropping every [`Animation`] handle releases
/// the engine even when `dispose` was never called.
pub struct WeakAnimation<H: StyleHost> {
    shared: Weak<Shared<H>>,
}

impl<H: StyleHost> Clone for WeakAnimation<H> {
    fn clone(&self) -> Self {
        Self {
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<H: StyleHost> WeakAnimation<H> {
    /// The engine, if any strong handle is still alive
    pub fn upgrade(&self) -> Option<Animation<H>> {
        self.shared.upgrade().map(|shared| Animation { shared })
    }
}

impl<H: StyleHost> Animation<H> {
    pub fn new(
        host: H,
        layers: impl IntoIterator<Item = Layer<H::Element>>,
        config: EngineConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                timeline: Arc::new(Mutex::new(Timeline::new(host, layers, config))),
                scheduler: Mutex::new(FrameScheduler::new()),
                plugins: Mutex::new(PluginManager::new()),
            }),
        }
    }

    /// Build an engine from a config document and define its rules
    pub fn from_config(
        host: H,
        layers: impl IntoIterator<Item = Layer<H::Element>>,
        config: &Config,
    ) -> Result<Self, DefineError> {
        let animation = Self::new(host, layers, config.engine.clone());
        animation.define(&config.rules)?;
        Ok(animation)
    }

    /// Load a TOML config file and build an engine from it
    pub async fn load(
        path: &str,
        host: H,
        layers: impl IntoIterator<Item = Layer<H::Element>>,
    ) -> Result<Self> {
        let config = Config::load(path).await?;
        Ok(Self::from_config(host, layers, &config)?)
    }

    pub fn downgrade(&self) -> WeakAnimation<H> {
        WeakAnimation {
            shared: Arc::downgrade(&self.shared),
        }
    }

    fn timeline(&self) -> MutexGuard<'_, Timeline<H>> {
        lock(&self.shared.timeline)
    }

    /// Validate, resolve and install a new rule set
    pub fn define(&self, rules: &[Rule]) -> Result<(), DefineError> {
        self.timeline().define(rules)
    }

    /// Start the frame loop on the current tokio runtime
    pub fn play(&self) {
        let mut scheduler = lock(&self.shared.scheduler);
        if scheduler.is_active() {
            debug!("▶️  Already playing");
            return;
        }

        let (timestep, from) = {
            let mut timeline = self.timeline();
            if !timeline.is_defined() {
                warn!("⚠️  play() called before any rules were defined");
                return;
            }
            if timeline.is_completed() {
                timeline.reset();
            }
            (timeline.config().timestep_ms, timeline.current_time())
        };
        if !(timestep > 0.0 && timestep.is_finite()) {
            warn!("⚠️  play() needs a positive timestep, got {}ms", timestep);
            return;
        }

        let Ok(runtime) = Handle::try_current() else {
            warn!("⚠️  play() needs a running tokio runtime");
            return;
        };

        let timeline = Arc::clone(&self.shared.timeline);
        scheduler.start(&runtime, move |cancel| run_frame_loop(timeline, timestep, cancel));
        info!("▶️  Playing from {}ms", from);
    }

    /// Stop the frame loop; idempotent
    pub fn pause(&self) {
        lock(&self.shared.scheduler).cancel();
    }

    pub fn forward(&self, step: Option<f64>) {
        self.pause();
        self.timeline().forward(step);
    }

    pub fn back(&self, step: Option<f64>) {
        self.pause();
        self.timeline().back(step);
    }

    pub fn seek(&self, progress: f64) {
        self.pause();
        self.timeline().seek(progress);
    }

    /// Pause, remove all applied styles and rewind to zero
    pub fn reset(&self) {
        self.pause();
        self.timeline().reset();
        info!("⏮️  Animation reset");
    }

    /// Alias of [`Animation::reset`]
    pub fn stop(&self) {
        self.reset();
    }

    /// Initialize `plugin` with this engine and keep it until `dispose`
    pub fn add_plugin<P>(&self, mut plugin: P) -> Result<()>
    where
        P: Plugin<H> + 'static,
    {
        info!("📦 Loading plugin: {}", plugin.name());
        plugin.init(self)?;
        lock(&self.shared.plugins).push(Box::new(plugin));
        Ok(())
    }

    /// Destroy plugins, reset, and drop the rule set
    pub fn dispose(&self) {
        self.pause();
        let plugins = lock(&self.shared.plugins).take_all();
        PluginManager::destroy_all(plugins);
        self.timeline().clear();
        info!("🗑️  Animation disposed");
    }

    pub fn is_playing(&self) -> bool {
        lock(&self.shared.scheduler).is_active()
    }

    pub fn is_defined(&self) -> bool {
        self.timeline().is_defined()
    }

    pub fn is_completed(&self) -> bool {
        self.timeline().is_completed()
    }

    pub fn current_time(&self) -> f64 {
        self.timeline().current_time()
    }

    pub fn duration(&self) -> f64 {
        self.timeline().duration()
    }

    /// Snapshot of the styles currently applied for `selector`
    pub fn active_styles(&self, selector: &str) -> Option<ParsedStyles> {
        self.timeline().active_styles(selector).cloned()
    }

    pub fn plugin_names(&self) -> Vec<String> {
        lock(&self.shared.plugins)
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Run `f` against the host, e.g. to inspect written styles
    pub fn with_host<R>(&self, f: impl FnOnce(&H) -> R) -> R {
        f(self.timeline().host())
    }

    pub fn with_host_mut<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(self.timeline().host_mut())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Advance in fixed `timestep` increments by the wall-clock time elapsed
/// between interval ticks, until the timeline completes or is cancelled.
async fn run_frame_loop<H: StyleHost>(
    timeline: Arc<Mutex<Timeline<H>>>,
    timestep: f64,
    cancel: CancelFlag,
) {
    let mut interval = tokio::time::interval(Duration::from_secs_f64(timestep / 1000.0));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    interval.tick().await;

    let mut last = Instant::now();
    let mut pending = 0.0;
    loop {
        interval.tick().await;
        let now = Instant::now();
        pending += now.duration_since(last).as_secs_f64() * 1000.0;
        last = now;

        if !advance(&timeline, &cancel, &mut pending, timestep) {
            debug!("⏹️  Frame loop finished");
            return;
        }
    }
}

fn advance<H: StyleHost>(
    timeline: &Mutex<Timeline<H>>,
    cancel: &CancelFlag,
    pending: &mut f64,
    timestep: f64,
) -> bool {
    let mut timeline = lock(timeline);
    if cancel.is_cancelled() {
        return false;
    }
    // tolerate float noise in the elapsed time
    while *pending + 1e-6 >= timestep {
        *pending -= timestep;
        if !timeline.tick(timestep) {
            return false;
        }
    }
    true
}
