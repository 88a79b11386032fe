use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::animation::rules::Rule;

/// Unit in which rule times are authored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Seconds,
    Milliseconds,
}

impl TimeUnit {
    pub fn to_millis(self, value: f64) -> f64 {
        match self {
            TimeUnit::Seconds => value * 1000.0,
            TimeUnit::Milliseconds => value,
        }
    }
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Fixed step of the play loop and default step of forward/back (ms)
    #[serde(default = "default_timestep")]
    pub timestep_ms: f64,

    /// Unit of `timespan` and `at` in rule declarations
    #[serde(default)]
    pub time_unit: TimeUnit,
}

fn default_timestep() -> f64 {
    16.0
}

impl EngineConfig {
    /// Whether `timestep_ms` can drive the play loop
    pub fn has_valid_timestep(&self) -> bool {
        self.timestep_ms > 0.0 && self.timestep_ms.is_finite()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timestep_ms: default_timestep(),
            time_unit: TimeUnit::default(),
        }
    }
}

/// A full animation document: engine settings plus its rules
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Config {
    pub async fn load(path: &str) -> Result<Self> {
        let expanded_path = shellexpand::tilde(path);
        info!("📄 Reading animation config from: {}", expanded_path);

        let content = fs::read_to_string(expanded_path.as_ref())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", expanded_path, e))?;

        if expanded_path.ends_with(".json") {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))?;
        config.checked()
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse JSON config: {}", e))?;
        config.checked()
    }

    fn checked(self) -> Result<Self> {
        if !self.engine.has_valid_timestep() {
            anyhow::bail!(
                "engine.timestep_ms must be a positive number, got {}",
                self.engine.timestep_ms
            );
        }

        debug!(
            "📋 Config loaded: {} rules, timestep {}ms, times in {:?}",
            self.rules.len(),
            self.engine.timestep_ms,
            self.engine.time_unit
        );
        Ok(self)
    }
}
