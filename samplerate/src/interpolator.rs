//! Interpolation kernel seam.

use crate::config::ConverterConfig;
use crate::error::Result;
use crate::polynomial::{Order, Polynomial};
use crate::quality::Quality;
use crate::ratio::Ramp;
use crate::sinc::Sinc;

/// A resampling kernel driven one block at a time.
///
/// `input` and `output` hold whole interleaved frames. Implementations
/// return `(frames_consumed, frames_produced)` and never read or write past
/// the given slices.
pub(crate) trait Interpolator: Send {
    fn process(
        &mut self,
        input: &[f32],
        output: &mut [f32],
        end_of_input: bool,
        ramp: Ramp,
    ) -> Result<(usize, usize)>;

    /// Drops all history. The kernel continues at `ratio`.
    fn reset(&mut self, ratio: f64) -> Result<()>;
}

/// Builds the kernel for `config.quality`, starting at `ratio`.
pub(crate) fn build(config: &ConverterConfig, ratio: f64) -> Result<Box<dyn Interpolator>> {
    let kernel: Box<dyn Interpolator> = match config.quality {
        Quality::ZeroOrderHold => Box::new(Polynomial::new(Order::Zero, config.channels)),
        Quality::Linear => Box::new(Polynomial::new(Order::One, config.channels)),
        quality => Box::new(Sinc::new(quality, config.channels, config.chunk_size, ratio)?),
    };
    Ok(kernel)
}
