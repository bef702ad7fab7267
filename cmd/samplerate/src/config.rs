//! Demo configuration.

use std::path::Path;

use anyhow::Context;
use giztoy_samplerate::{ConverterConfig, Quality};
use serde::{Deserialize, Serialize};

/// Parameters for one demo run.
///
/// Loaded from YAML; every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Length of the synthesized tone in seconds.
    pub seconds: f64,
    pub input_rate: u32,
    pub output_rate: u32,
    /// Tone frequency in Hz.
    pub frequency: f64,
    /// Frames per input and output block.
    pub block_size: usize,
    #[serde(flatten)]
    pub converter: ConverterConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seconds: 10.0,
            input_rate: 44100,
            output_rate: 96000,
            frequency: 440.0,
            block_size: 1000,
            converter: ConverterConfig::new(Quality::SincMedium, 1),
        }
    }
}

impl DemoConfig {
    /// Loads a config file, or the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Output rate ÷ input rate.
    pub fn ratio(&self) -> f64 {
        self.output_rate as f64 / self.input_rate as f64
    }

    /// Number of input frames the tone spans.
    pub fn input_frames(&self) -> usize {
        (self.seconds * self.input_rate as f64).round().max(0.0) as usize
    }
}
