use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::animation::Animation;
use crate::host::StyleHost;
use crate::plugins::Plugin;

/// Commands a transport UI sends to the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransportCommand {
    Play,
    Pause,
    /// Step forward by `step` ms, or the configured timestep
    Forward { step: Option<f64> },
    /// Step back by `step` ms, or the configured timestep
    Back { step: Option<f64> },
    /// Jump to a progress in [0, 1]
    Seek { progress: f64 },
    Reset,
}

impl TransportCommand {
    /// Parse a textual command such as `seek 0.5` or `forward 100`
    pub fn from_args(command: &str, args: &[&str]) -> Result<Self> {
        let step = || -> Result<Option<f64>> {
            args.first()
                .map(|raw| {
                    raw.parse::<f64>()
                        .with_context(|| format!("Invalid step '{}' for '{}'", raw, command))
                })
                .transpose()
        };

        match command {
            "play" => Ok(TransportCommand::Play),
            "pause" => Ok(TransportCommand::Pause),
            "forward" => Ok(TransportCommand::Forward { step: step()? }),
            "back" => Ok(TransportCommand::Back { step: step()? }),
            "seek" => {
                let raw = args.first().context("seek requires a progress argument")?;
                let progress = raw
                    .parse::<f64>()
                    .with_context(|| format!("Invalid progress '{}'", raw))?;
                Ok(TransportCommand::Seek { progress })
            }
            "reset" | "stop" => Ok(TransportCommand::Reset),
            _ => Err(anyhow::anyhow!("Unknown transport command: {}", command)),
        }
    }

    /// Run the command against `engine`
    pub fn apply<H: StyleHost>(&self, engine: &Animation<H>) {
        match self {
            TransportCommand::Play => engine.play(),
            TransportCommand::Pause => engine.pause(),
            TransportCommand::Forward { step } => engine.forward(*step),
            TransportCommand::Back { step } => engine.back(*step),
            TransportCommand::Seek { progress } => engine.seek(*progress),
            TransportCommand::Reset => engine.reset(),
        }
    }
}

/// Transport driver: applies commands received on a channel in order
pub struct Transport {
    commands: Option<mpsc::UnboundedReceiver<TransportCommand>>,
    task: Option<JoinHandle<()>>,
}

impl Transport {
    pub fn new(commands: mpsc::UnboundedReceiver<TransportCommand>) -> Self {
        Self {
            commands: Some(commands),
            task: None,
        }
    }

    /// A driver together with the sender used to issue commands
    pub fn channel() -> (mpsc::UnboundedSender<TransportCommand>, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (sender, Self::new(receiver))
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<H: StyleHost> Plugin<H> for Transport {
    fn name(&self) -> &str {
        "transport"
    }

    fn init(&mut self, engine: &Animation<H>) -> Result<()> {
        let mut commands = self
            .commands
            .take()
            .context("transport was already initialized")?;
        let runtime = Handle::try_current().context("transport needs a running tokio runtime")?;

        let engine = engine.downgrade();
        self.task = Some(runtime.spawn(async move {
            while let Some(command) = commands.recv().await {
                let Some(engine) = engine.upgrade() else {
                    break;
                };
                debug!("🎛️  Transport command: {:?}", command);
                command.apply(&engine);
            }
            debug!("🎛️  Transport channel closed");
        }));

        info!("🎛️  Transport attached");
        Ok(())
    }

    fn destroy(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        Ok(())
    }
}
