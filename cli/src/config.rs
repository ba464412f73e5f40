//! Run configuration for the Vigil binary.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use vigil_scheduler::TriggerStrategy;
use vigil_watcher::TargetConfig;

/// Everything the binary needs for one run. Static once loaded; there is
/// no hot-reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// How watch loops wake up.
    #[serde(default)]
    pub trigger: TriggerStrategy,

    /// Poll interval in milliseconds (interval strategy only).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Monitored sources.
    pub targets: Vec<TargetConfig>,

    /// Outward transports.
    #[serde(default)]
    pub sinks: SinkEndpoints,

    /// Inference collaborator, if reactions are wanted.
    pub bridge: Option<BridgeConfig>,
}

fn default_poll_interval_ms() -> u64 {
    100
}

/// Addresses of the configured sinks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SinkEndpoints {
    /// Fire-and-forget datagram listener.
    pub datagram: Option<SocketAddr>,

    /// Framed stream consumer (also carries delivered replies).
    pub stream: Option<SocketAddr>,
}

/// Inference collaborator endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Where the inference peer listens.
    pub addr: SocketAddr,

    /// Seconds to wait for a reply.
    #[serde(default = "default_bridge_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_bridge_timeout_secs() -> u64 {
    30
}

impl RunConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let config: Self =
            toml::from_str(&raw).with_context(|| format!("cannot parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Startup-only validation; the one place configuration is fatal.
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            bail!("no targets configured");
        }

        if self.sinks.datagram.is_none() && self.sinks.stream.is_none() {
            bail!("no sinks configured");
        }

        if self.bridge.is_some() && self.sinks.stream.is_none() {
            bail!("bridge requires a stream sink to deliver replies");
        }

        Ok(())
    }
}
