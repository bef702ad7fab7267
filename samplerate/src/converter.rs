//! The stateful block converter.

use std::fmt;

use tracing::{debug, trace};

use crate::config::ConverterConfig;
use crate::error::{Error, ErrorCode, Result};
use crate::interpolator::{self, Interpolator};
use crate::quality::Quality;
use crate::ratio::{Ramp, RatioMode, is_valid_ratio};

/// Transfer descriptor for one [`Converter::process_block`] call.
///
/// Frame counts are per channel; the slices must hold at least
/// `frames * channels` interleaved samples.
#[derive(Debug)]
pub struct Block<'a> {
    /// Interleaved input samples.
    pub input: &'a [f32],
    /// Input frames available.
    pub input_frames: usize,
    /// Interleaved output samples.
    pub output: &'a mut [f32],
    /// Output frames that fit.
    pub output_frames: usize,
    /// No further input will be supplied after this block.
    pub end_of_input: bool,
}

/// Frames moved by one processing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transfer {
    /// Input frames read.
    pub frames_consumed: usize,
    /// Output frames written.
    pub frames_produced: usize,
}

impl Transfer {
    /// True when nothing moved. With end of input set this ends the stream.
    pub fn is_empty(&self) -> bool {
        self.frames_consumed == 0 && self.frames_produced == 0
    }
}

struct State {
    kernel: Box<dyn Interpolator>,
    /// Ratio the next block ends at.
    ratio: f64,
    /// Ratio in effect at the end of the previous block.
    last_ratio: f64,
    buffered: f64,
    drained: bool,
}

/// Streaming sample rate converter for interleaved `f32` frames.
///
/// A converter starts at ratio 1.0. Feed it blocks with [`process`] until a
/// call with `end_of_input` set moves no frames, then drop it or call
/// [`destroy`]. Every mutating call takes `&mut self`; separate converters
/// are independent and may run on separate threads.
///
/// [`process`]: Converter::process
/// [`destroy`]: Converter::destroy
pub struct Converter {
    quality: Quality,
    channels: usize,
    chunk_size: usize,
    state: Option<State>,
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Converter");
        d.field("quality", &self.quality)
            .field("channels", &self.channels);
        match &self.state {
            Some(state) => d
                .field("ratio", &state.ratio)
                .field("buffered", &state.buffered)
                .finish(),
            None => d.field("destroyed", &true).finish(),
        }
    }
}

impl Converter {
    /// Creates a converter for `channels` interleaved channels.
    pub fn new(quality: Quality, channels: usize) -> Result<Self> {
        Self::with_config(&ConverterConfig::new(quality, channels))
    }

    /// Creates a converter from a full configuration.
    pub fn with_config(config: &ConverterConfig) -> Result<Self> {
        if config.channels == 0 {
            return Err(Error::Initialization(ErrorCode::BadChannelCount));
        }
        if config.chunk_size == 0 {
            return Err(Error::Initialization(ErrorCode::BadChunkSize));
        }

        let kernel = interpolator::build(config, 1.0)?;
        debug!(
            quality = %config.quality,
            channels = config.channels,
            chunk_size = config.chunk_size,
            "converter created"
        );

        Ok(Self {
            quality: config.quality,
            channels: config.channels,
            chunk_size: config.chunk_size,
            state: Some(State {
                kernel,
                ratio: 1.0,
                last_ratio: 1.0,
                buffered: 0.0,
                drained: false,
            }),
        })
    }

    /// Returns the quality level.
    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Returns the channel count.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the configuration this converter was built from.
    pub fn config(&self) -> ConverterConfig {
        ConverterConfig {
            quality: self.quality,
            channels: self.channels,
            chunk_size: self.chunk_size,
        }
    }

    /// Returns true once [`destroy`](Converter::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.state.is_none()
    }

    fn state(&self) -> Result<&State> {
        self.state.as_ref().ok_or(Error::Lifecycle)
    }

    fn state_mut(&mut self) -> Result<&mut State> {
        self.state.as_mut().ok_or(Error::Lifecycle)
    }

    /// Returns the ratio the next block will end at.
    pub fn ratio(&self) -> Result<f64> {
        Ok(self.state()?.ratio)
    }

    /// Advisory estimate of frames held inside the converter.
    ///
    /// Accumulates `consumed - produced / ratio` per block. It is not floored
    /// at zero and may drift across ratio changes.
    pub fn buffered_frames(&self) -> Result<f64> {
        Ok(self.state()?.buffered)
    }

    /// Releases the kernel. Calling it again is a no-op.
    pub fn destroy(&mut self) {
        if self.state.take().is_some() {
            debug!(quality = %self.quality, channels = self.channels, "converter destroyed");
        }
    }

    /// Clears interpolation history and buffering.
    ///
    /// Quality, channel count and the current ratio are kept.
    pub fn reset(&mut self) -> Result<()> {
        let state = self.state_mut()?;
        state.kernel.reset(state.ratio)?;
        state.last_ratio = state.ratio;
        state.buffered = 0.0;
        state.drained = false;
        debug!(ratio = state.ratio, "converter reset");
        Ok(())
    }

    /// Sets the conversion ratio (output rate ÷ input rate).
    ///
    /// An invalid ratio is rejected and leaves the converter untouched.
    pub fn set_ratio(&mut self, ratio: f64, mode: RatioMode) -> Result<()> {
        let state = self.state_mut()?;
        if !is_valid_ratio(ratio) {
            return Err(Error::Ratio(ratio));
        }

        match mode {
            RatioMode::Instant => {
                state.ratio = ratio;
                state.last_ratio = ratio;
            }
            RatioMode::Gradual => {
                state.ratio = ratio;
            }
        }
        debug!(ratio, ?mode, "ratio set");
        Ok(())
    }

    /// Converts one block, taking frame counts from the slice lengths.
    pub fn process(
        &mut self,
        input: &[f32],
        output: &mut [f32],
        end_of_input: bool,
    ) -> Result<Transfer> {
        let input_frames = input.len() / self.channels;
        let output_frames = output.len() / self.channels;
        self.process_block(Block {
            input,
            input_frames,
            output,
            output_frames,
            end_of_input,
        })
    }

    /// Converts one block described by `block`.
    ///
    /// Reads at most `input_frames` and writes at most `output_frames`. With
    /// `end_of_input` set, buffered history is flushed once the input is
    /// used up; keep calling until a call returns an empty [`Transfer`].
    pub fn process_block(&mut self, block: Block<'_>) -> Result<Transfer> {
        let channels = self.channels;
        let state = self.state_mut()?;

        let in_len = block.input_frames * channels;
        let out_len = block.output_frames * channels;
        if block.input.len() < in_len || block.output.len() < out_len {
            return Err(Error::processing(ErrorCode::BufferTooShort));
        }

        if state.drained {
            if block.input_frames > 0 {
                return Err(Error::processing(ErrorCode::InputAfterEnd));
            }
            return Ok(Transfer::default());
        }

        let ramp = Ramp {
            from: state.last_ratio,
            to: state.ratio,
        };
        let (consumed, produced) = state.kernel.process(
            &block.input[..in_len],
            &mut block.output[..out_len],
            block.end_of_input,
            ramp,
        )?;
        debug_assert!(consumed <= block.input_frames);
        debug_assert!(produced <= block.output_frames);

        state.last_ratio = state.ratio;
        state.buffered += consumed as f64 - produced as f64 / state.ratio;

        let transfer = Transfer {
            frames_consumed: consumed,
            frames_produced: produced,
        };
        // A call that had input left over or no room to write has not
        // reached the end yet.
        if block.end_of_input
            && transfer.is_empty()
            && block.input_frames == 0
            && block.output_frames > 0
        {
            state.drained = true;
            debug!("stream drained");
        }

        trace!(
            input_frames = block.input_frames,
            output_frames = block.output_frames,
            consumed,
            produced,
            ratio = state.ratio,
            buffered = state.buffered,
            "block processed"
        );
        Ok(transfer)
    }
}
