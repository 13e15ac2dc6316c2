//! Settings for the gateway process.
//!
//! Loaded from (lowest to highest priority):
//! 1. Defaults
//! 2. Config file `<prefix>.toml` (optional)
//! 3. `CHRONICLE__` environment variables, `__` between path segments
//!    (e.g. `CHRONICLE__NEO4J__URI`, `CHRONICLE__NEO4J__RETRY__MAX_ATTEMPTS`)

use std::time::Duration;

use chronicle_core::ChronicleError;
use chronicle_graph::GraphConfig;
use serde::Deserialize;

pub const DEFAULT_PREFIX: &str = "chronicle";
const ENV_PREFIX: &str = "CHRONICLE";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub neo4j: GraphConfig,

    #[serde(default)]
    pub enrichment: EnrichmentSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EnrichmentSettings {
    /// Pause between items of a batch sweep, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_delay_ms() -> u64 {
    500
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
        }
    }
}

impl EnrichmentSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Settings {
    pub fn load(file_prefix: &str) -> Result<Self, ChronicleError> {
        config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ChronicleError::Config(e.to_string()))
    }
}
