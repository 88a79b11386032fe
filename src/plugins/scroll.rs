use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::{wrappers::WatchStream, StreamExt};
use tracing::{debug, info};

use crate::animation::Animation;
use crate::host::StyleHost;
use crate::plugins::Plugin;

/// Scroll-linked driver: seeks the animation to every published progress.
///
/// The host publishes scroll progress in [0, 1] on a `watch` channel; only
/// the latest value matters, intermediate ones may be skipped.
pub struct ScrollSync {
    progress: Option<watch::Receiver<f64>>,
    task: Option<JoinHandle<()>>,
}

impl ScrollSync {
    pub fn new(progress: watch::Receiver<f64>) -> Self {
        Self {
            progress: Some(progress),
            task: None,
        }
    }

    /// A driver together with the sender used to publish progress
    pub fn channel() -> (watch::Sender<f64>, Self) {
        let (sender, receiver) = watch::channel(0.0);
        (sender, Self::new(receiver))
    }
}

impl Drop for ScrollSync {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<H: StyleHost> Plugin<H> for ScrollSync {
    fn name(&self) -> &str {
        "scroll_sync"
    }

    fn init(&mut self, engine: &Animation<H>) -> Result<()> {
        let receiver = self
            .progress
            .take()
            .context("scroll_sync was already initialized")?;
        let runtime = Handle::try_current().context("scroll_sync needs a running tokio runtime")?;

        let engine = engine.downgrade();
        self.task = Some(runtime.spawn(async move {
            let mut updates = WatchStream::new(receiver);
            while let Some(progress) = updates.next().await {
                let Some(engine) = engine.upgrade() else {
                    break;
                };
                debug!("📜 Scroll progress {:.3}", progress);
                engine.seek(progress);
            }
        }));

        info!("📜 Scroll sync attached");
        Ok(())
    }

    fn destroy(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        Ok(())
    }
}
