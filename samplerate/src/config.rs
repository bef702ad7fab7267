//! Converter configuration.

use serde::{Deserialize, Serialize};

use crate::quality::Quality;

/// Default number of input frames the sinc engine processes at a time.
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// Parameters for creating a [`Converter`](crate::Converter).
///
/// Every field has a default, so partial YAML or JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Interpolation kernel.
    pub quality: Quality,
    /// Number of interleaved channels.
    pub channels: usize,
    /// Frames per sinc engine block. Ignored by the polynomial kernels.
    pub chunk_size: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            channels: 1,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ConverterConfig {
    /// Creates a config with the given quality and channel count.
    pub fn new(quality: Quality, channels: usize) -> Self {
        Self {
            quality,
            channels,
            ..Self::default()
        }
    }

    /// Sets the sinc engine block size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let cfg = ConverterConfig::default();
        assert_eq!(cfg.quality, Quality::SincMedium);
        assert_eq!(cfg.channels, 1);
        assert_eq!(cfg.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_config_partial_yaml() {
        let cfg: ConverterConfig = serde_yaml::from_str("quality: linear\nchannels: 2\n").unwrap();
        assert_eq!(cfg.quality, Quality::Linear);
        assert_eq!(cfg.channels, 2);
        assert_eq!(cfg.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_config_rejects_unknown_quality() {
        let result: Result<ConverterConfig, _> = serde_yaml::from_str("quality: cubic\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_builder() {
        let cfg = ConverterConfig::new(Quality::SincBest, 6).with_chunk_size(1024);
        assert_eq!(cfg.quality, Quality::SincBest);
        assert_eq!(cfg.channels, 6);
        assert_eq!(cfg.chunk_size, 1024);
    }
}
