/// Pipeline configuration
///
/// Plain struct with serde defaults, loadable from TOML. The core
/// consumes no environment variables and mandates no CLI; embedders
/// either build the struct directly or point `load` at a file.

use serde::Deserialize;
use std::path::Path;

/// What the transport stage does when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backpressure {
    /// Drop the buffer and count a queue overflow. Bounds latency.
    #[default]
    Drop,
    /// Block the transport until the parser catches up. No loss.
    Block,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Buffers the queue holds before backpressure applies.
    #[serde(default = "defaults::queue_size")]
    pub queue_size: usize,
    /// Receive buffer capacity per connection.
    #[serde(default = "defaults::buffer_size")]
    pub buffer_size: usize,
    /// Arm the garbage-recovery scanner on the parser.
    #[serde(default = "defaults::enable_garbage_recovery")]
    pub enable_garbage_recovery: bool,
    #[serde(default)]
    pub backpressure: Backpressure,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

mod defaults {
    pub fn queue_size() -> usize {
        1000
    }

    pub fn buffer_size() -> usize {
        8192
    }

    pub fn enable_garbage_recovery() -> bool {
        true
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            queue_size: defaults::queue_size(),
            buffer_size: defaults::buffer_size(),
            enable_garbage_recovery: defaults::enable_garbage_recovery(),
            backpressure: Backpressure::default(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config: PipelineConfig = toml::from_str(&text)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.queue_size, 1000);
        assert_eq!(config.buffer_size, 8192);
        assert!(config.enable_garbage_recovery);
        assert_eq!(config.backpressure, Backpressure::Drop);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: PipelineConfig = toml::from_str("queue_size = 64").unwrap();
        assert_eq!(config.queue_size, 64);
        assert_eq!(config.buffer_size, 8192);
        assert!(config.enable_garbage_recovery);
    }

    #[test]
    fn test_full_toml() {
        let config: PipelineConfig = toml::from_str(
            "queue_size = 16\nbuffer_size = 4096\nenable_garbage_recovery = false\nbackpressure = \"block\"",
        )
        .unwrap();
        assert_eq!(config.queue_size, 16);
        assert_eq!(config.buffer_size, 4096);
        assert!(!config.enable_garbage_recovery);
        assert_eq!(config.backpressure, Backpressure::Block);
    }
}
