use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// Cancellation flag shared between the scheduler and one running loop.
///
/// The loop checks it under the timeline lock before every frame, so once
/// `cancel` returns no further frame of that loop can be applied.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Owns the single outstanding frame loop of an animation
#[derive(Debug, Default)]
pub struct FrameScheduler {
    running: Option<(JoinHandle<()>, CancelFlag)>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a loop is scheduled and has not finished on its own
    pub fn is_active(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|(handle, flag)| !handle.is_finished() && !flag.is_cancelled())
    }

    /// Spawn the loop built by `make_loop`, cancelling any previous one
    pub fn start<F, Fut>(&mut self, runtime: &Handle, make_loop: F)
    where
        F: FnOnce(CancelFlag) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let flag = CancelFlag::default();
        let handle = runtime.spawn(make_loop(flag.clone()));
        self.running = Some((handle, flag));
        debug!("⏱️  Frame loop scheduled");
    }

    /// Stop the current loop; idempotent
    pub fn cancel(&mut self) {
        if let Some((handle, flag)) = self.running.take() {
            flag.cancel();
            handle.abort();
            debug!("⏹️  Frame loop cancelled");
        }
    }
}

impl Drop for FrameScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
