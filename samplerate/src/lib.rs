//! Streaming sample rate conversion for interleaved `f32` audio.
//!
//! A [`Converter`] turns a stream of frames at one rate into a stream at
//! another. The caller feeds input in blocks of any size and collects
//! whatever output each call makes available; the converter keeps the
//! interpolation history between calls.
//!
//! # Quality Levels
//!
//! | [`Quality`] | Kernel |
//! |---|---|
//! | `SincBest` | 256-tap band-limited sinc, cubic table interpolation |
//! | `SincMedium` | 128-tap sinc, linear table interpolation |
//! | `SincFastest` | 64-tap sinc, linear table interpolation |
//! | `ZeroOrderHold` | repeats the nearest preceding frame |
//! | `Linear` | interpolates between neighbouring frames |
//!
//! The sinc levels run on [`rubato`]. The polynomial levels are exact at
//! unity ratio: every block consumes as many frames as it produces.
//!
//! # Streaming
//!
//! ```
//! use giztoy_samplerate::{Converter, Quality, RatioMode};
//!
//! let mut conv = Converter::new(Quality::Linear, 1).unwrap();
//! conv.set_ratio(2.0, RatioMode::Instant).unwrap();
//!
//! let input: Vec<f32> = (0..100).map(|i| i as f32).collect();
//! let mut output = vec![0.0f32; 64];
//! let mut pos = 0;
//! let mut total = 0;
//! loop {
//!     let eoi = true;
//!     let t = conv.process(&input[pos..], &mut output, eoi).unwrap();
//!     pos += t.frames_consumed;
//!     total += t.frames_produced;
//!     if t.is_empty() {
//!         break;
//!     }
//! }
//! assert_eq!(pos, 100);
//! assert_eq!(total, 200);
//! ```
//!
//! # Changing the Ratio
//!
//! [`RatioMode::Instant`] switches the ratio at the next block.
//! [`RatioMode::Gradual`] spreads the change across the next block, which
//! avoids audible steps when the ratio is modulated.
//!
//! # Byte Streams
//!
//! [`Converter::process_bytes`] works on little-endian `f32` bytes, and
//! [`ResampleReader`] wraps any [`std::io::Read`] of such bytes:
//!
//! ```
//! use std::io::{Cursor, Read};
//! use giztoy_samplerate::{Format, Quality, ResampleReader};
//!
//! let src = Cursor::new(vec![0u8; 16000 * 4]);
//! let mut reader =
//!     ResampleReader::new(src, Format::MONO_16K, Format::MONO_48K, Quality::Linear).unwrap();
//! let mut out = Vec::new();
//! reader.read_to_end(&mut out).unwrap();
//! assert_eq!(out.len(), 48000 * 4);
//! ```

pub mod bytes;
mod config;
mod converter;
mod error;
mod format;
mod frame_reader;
mod interpolator;
mod polynomial;
mod quality;
mod ratio;
mod reader;
mod sinc;

pub use bytes::{ByteTransfer, BYTES_PER_SAMPLE};
pub use config::{ConverterConfig, DEFAULT_CHUNK_SIZE};
pub use converter::{Block, Converter, Transfer};
pub use error::{Error, ErrorCode, Result};
pub use format::Format;
pub use quality::Quality;
pub use ratio::{MAX_RATIO, MIN_RATIO, RatioMode, is_valid_ratio};
pub use reader::ResampleReader;
