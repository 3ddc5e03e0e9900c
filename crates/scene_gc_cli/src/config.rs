//! Driver configuration

use scene_gc::config::Config;
use scene_gc::gc::GcOptions;
use serde::{Deserialize, Serialize};

/// Settings read from the optional config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Collector options
    pub gc: GcOptions,
    
    /// `env_logger` filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            gc: GcOptions::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config for CliConfig {}
