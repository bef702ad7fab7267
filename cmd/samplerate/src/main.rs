//! Sample rate conversion demo.
//!
//! Synthesizes a sine tone, streams it block by block through a converter
//! and reports how many frames came out against how many were expected.

use std::path::PathBuf;

use clap::Parser;
use giztoy_samplerate::Quality;
use tracing_subscriber::EnvFilter;

mod config;
mod demo;

use config::DemoConfig;

/// Streams a synthesized tone through the sample rate converter.
///
/// Values from `--config` are applied first; flags given on the command line
/// override them.
#[derive(Parser)]
#[command(name = "samplerate")]
#[command(about = "Sample rate conversion demo")]
#[command(version)]
pub struct Cli {
    /// Config file (YAML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Tone length in seconds [default: 10]
    #[arg(long)]
    pub seconds: Option<f64>,

    /// Input sample rate in Hz [default: 44100]
    #[arg(long)]
    pub input_rate: Option<u32>,

    /// Output sample rate in Hz [default: 96000]
    #[arg(long)]
    pub output_rate: Option<u32>,

    /// Tone frequency in Hz [default: 440]
    #[arg(long)]
    pub frequency: Option<f64>,

    /// Converter quality: sinc-best, sinc-medium, sinc-fastest,
    /// zero-order-hold, linear, or 0-4 [default: sinc-medium]
    #[arg(short = 'q', long)]
    pub quality: Option<Quality>,

    /// Interleaved channel count [default: 1]
    #[arg(long)]
    pub channels: Option<usize>,

    /// Frames per block [default: 1000]
    #[arg(long)]
    pub block_size: Option<usize>,

    /// Output the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Loads the config file and applies flag overrides.
    fn demo_config(&self) -> anyhow::Result<DemoConfig> {
        let mut cfg = DemoConfig::load(self.config.as_deref())?;
        if let Some(v) = self.seconds {
            cfg.seconds = v;
        }
        if let Some(v) = self.input_rate {
            cfg.input_rate = v;
        }
        if let Some(v) = self.output_rate {
            cfg.output_rate = v;
        }
        if let Some(v) = self.frequency {
            cfg.frequency = v;
        }
        if let Some(v) = self.quality {
            cfg.converter.quality = v;
        }
        if let Some(v) = self.channels {
            cfg.converter.channels = v;
        }
        if let Some(v) = self.block_size {
            cfg.block_size = v;
        }
        Ok(cfg)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cfg = cli.demo_config()?;
    let summary = demo::run(&cfg)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.line());
    }
    Ok(())
}
