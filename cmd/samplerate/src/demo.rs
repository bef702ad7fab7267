//! Sine stream driver.

use std::time::Instant;

use anyhow::Context;
use giztoy_samplerate::{Converter, RatioMode};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::DemoConfig;

/// Result of one demo run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub quality: String,
    pub channels: usize,
    pub input_rate: u32,
    pub output_rate: u32,
    pub input_frames: usize,
    pub output_frames: usize,
    pub expected_frames: usize,
    pub blocks: usize,
    pub elapsed_ms: u128,
}

impl Summary {
    pub fn line(&self) -> String {
        format!(
            "{} samples resampled to {} samples (expected {})",
            self.input_frames, self.output_frames, self.expected_frames
        )
    }
}

/// Writes the next `frames` frames of the tone, starting at frame `start`.
fn synthesize(cfg: &DemoConfig, start: usize, frames: usize, out: &mut [f32]) {
    let ch = cfg.converter.channels;
    let step = 2.0 * std::f64::consts::PI * cfg.frequency / cfg.input_rate as f64;
    for (i, frame) in out.chunks_exact_mut(ch).take(frames).enumerate() {
        let v = ((start + i) as f64 * step).sin() as f32;
        frame.fill(v);
    }
}

/// Streams the configured tone through a converter until it drains.
pub fn run(cfg: &DemoConfig) -> anyhow::Result<Summary> {
    anyhow::ensure!(cfg.block_size > 0, "block size must be at least 1");
    anyhow::ensure!(cfg.input_rate > 0, "input rate must be at least 1");

    let mut conv =
        Converter::with_config(&cfg.converter).context("failed to create converter")?;
    conv.set_ratio(cfg.ratio(), RatioMode::Instant)
        .with_context(|| format!("cannot convert {} Hz to {} Hz", cfg.input_rate, cfg.output_rate))?;

    let ch = cfg.converter.channels;
    let total = cfg.input_frames();
    let mut input = vec![0.0f32; cfg.block_size * ch];
    let mut output = vec![0.0f32; cfg.block_size * ch];
    let (mut in_pos, mut in_len) = (0, 0);
    let mut generated = 0;
    let mut produced = 0;
    let mut blocks = 0;

    info!(
        quality = %cfg.converter.quality,
        channels = ch,
        input_rate = cfg.input_rate,
        output_rate = cfg.output_rate,
        frames = total,
        "starting conversion"
    );
    let started = Instant::now();

    loop {
        if in_pos == in_len && generated < total {
            let frames = cfg.block_size.min(total - generated);
            synthesize(cfg, generated, frames, &mut input);
            generated += frames;
            in_pos = 0;
            in_len = frames * ch;
        }
        let end_of_input = generated == total;

        let t = conv.process(&input[in_pos..in_len], &mut output, end_of_input)?;
        in_pos += t.frames_consumed * ch;
        produced += t.frames_produced;
        blocks += 1;

        if end_of_input && t.is_empty() {
            break;
        }
    }

    let summary = Summary {
        quality: cfg.converter.quality.to_string(),
        channels: ch,
        input_rate: cfg.input_rate,
        output_rate: cfg.output_rate,
        input_frames: total,
        output_frames: produced,
        expected_frames: (total as f64 * cfg.ratio()).round() as usize,
        blocks,
        elapsed_ms: started.elapsed().as_millis(),
    };
    debug!(blocks, buffered = conv.buffered_frames()?, "conversion finished");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use giztoy_samplerate::{ConverterConfig, Quality};

    fn short(quality: Quality, output_rate: u32) -> DemoConfig {
        DemoConfig {
            seconds: 0.1,
            input_rate: 8000,
            output_rate,
            block_size: 128,
            converter: ConverterConfig::new(quality, 1),
            ..DemoConfig::default()
        }
    }

    #[test]
    fn test_run_matches_expected() {
        for quality in Quality::ALL {
            let summary = run(&short(quality, 16000)).unwrap();
            assert_eq!(summary.input_frames, 800);
            assert_eq!(summary.expected_frames, 1600);
            assert!(
                (summary.output_frames as i64 - 1600).abs() <= 2,
                "{}",
                summary.line()
            );
        }
    }

    #[test]
    fn test_run_rejects_bad_ratio() {
        let err = run(&short(Quality::Linear, 8000 * 300)).unwrap_err();
        assert!(err.to_string().contains("cannot convert"));
    }

    #[test]
    fn test_summary_line_and_json() {
        let summary = run(&short(Quality::Linear, 4000)).unwrap();
        assert_eq!(summary.line(), "800 samples resampled to 400 samples (expected 400)");

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["output_frames"], 400);
        assert_eq!(json["quality"], "linear");
    }

    #[test]
    fn test_run_empty_tone() {
        let cfg = DemoConfig {
            seconds: 0.0,
            ..short(Quality::SincFastest, 16000)
        };
        let summary = run(&cfg).unwrap();
        assert_eq!(summary.output_frames, 0);
    }
}
