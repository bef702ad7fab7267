//! Pull-based resampling over [`io::Read`].

use std::io::{self, Read};

use tracing::debug;

use crate::converter::Converter;
use crate::error::{Error, ErrorCode, Result};
use crate::format::Format;
use crate::frame_reader::FrameReader;
use crate::quality::Quality;
use crate::ratio::RatioMode;

/// Input frames requested from the source per refill, at most.
const MAX_REFILL_FRAMES: usize = 4096;

/// Reads interleaved `f32` little-endian frames at one rate and yields them
/// at another.
///
/// The source is pulled on demand. At source end of stream the converter is
/// flushed, then reads return 0.
pub struct ResampleReader<R: Read> {
    src_fmt: Format,
    dst_fmt: Format,
    src: FrameReader<R>,
    converter: Converter,
    /// Source bytes not yet consumed, `read_buf[start..end]`.
    read_buf: Vec<u8>,
    start: usize,
    end: usize,
    eof: bool,
    drained: bool,
}

impl<R: Read> std::fmt::Debug for ResampleReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResampleReader")
            .field("src_fmt", &self.src_fmt)
            .field("dst_fmt", &self.dst_fmt)
            .field("eof", &self.eof)
            .field("drained", &self.drained)
            .finish()
    }
}

impl<R: Read> ResampleReader<R> {
    /// Creates a reader converting `src` from `src_fmt` to `dst_fmt`.
    ///
    /// Both formats must have the same, non-zero channel count.
    pub fn new(src: R, src_fmt: Format, dst_fmt: Format, quality: Quality) -> Result<Self> {
        if src_fmt.channels == 0 || src_fmt.channels != dst_fmt.channels {
            return Err(Error::Initialization(ErrorCode::BadChannelCount));
        }

        let mut converter = Converter::new(quality, src_fmt.channels as usize)?;
        converter.set_ratio(src_fmt.ratio_to(&dst_fmt), RatioMode::Instant)?;
        debug!(
            src_rate = src_fmt.sample_rate,
            dst_rate = dst_fmt.sample_rate,
            channels = src_fmt.channels,
            %quality,
            "resample reader created"
        );

        Ok(Self {
            src_fmt,
            dst_fmt,
            src: FrameReader::new(src, src_fmt.frame_bytes()),
            converter,
            read_buf: Vec::new(),
            start: 0,
            end: 0,
            eof: false,
            drained: false,
        })
    }

    /// Gets the source format.
    pub fn src_format(&self) -> Format {
        self.src_fmt
    }

    /// Gets the destination format.
    pub fn dst_format(&self) -> Format {
        self.dst_fmt
    }

    /// Gets the underlying converter.
    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    /// Returns the source reader. Unconsumed bytes are lost.
    pub fn into_inner(self) -> R {
        self.src.into_inner()
    }

    fn refill(&mut self, out_frames: usize) -> io::Result<()> {
        let ratio = self.src_fmt.ratio_to(&self.dst_fmt);
        let frames = ((out_frames as f64 / ratio).ceil() as usize).clamp(1, MAX_REFILL_FRAMES);
        let want = frames * self.src_fmt.frame_bytes();
        if self.read_buf.len() < want {
            self.read_buf.resize(want, 0);
        }

        let n = self.src.read(&mut self.read_buf[..want])?;
        self.start = 0;
        self.end = n;
        if n == 0 {
            self.eof = true;
            debug!("resample reader source exhausted");
        }
        Ok(())
    }
}

impl<R: Read> Read for ResampleReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || self.drained {
            return Ok(0);
        }

        let frame_bytes = self.dst_fmt.frame_bytes();
        if buf.len() < frame_bytes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "buffer too small",
            ));
        }
        let aligned_len = (buf.len() / frame_bytes) * frame_bytes;
        let buf = &mut buf[..aligned_len];

        loop {
            if self.start == self.end && !self.eof {
                self.refill(buf.len() / frame_bytes)?;
                continue;
            }

            let t = self
                .converter
                .process_bytes(&self.read_buf[self.start..self.end], buf, self.eof)?;
            self.start += t.bytes_consumed;

            if t.bytes_produced > 0 {
                return Ok(t.bytes_produced);
            }
            if t.bytes_consumed > 0 {
                continue;
            }
            if self.eof {
                self.drained = true;
                return Ok(0);
            }
            return Err(io::Error::other("converter stalled with input pending"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytes::{decode_f32le, encode_f32le};
    use std::io::Cursor;

    fn sine_bytes(frames: usize, channels: usize) -> Vec<u8> {
        let samples: Vec<f32> = (0..frames * channels)
            .map(|i| ((i / channels) as f32 * 0.05).sin())
            .collect();
        let mut bytes = vec![0u8; samples.len() * 4];
        encode_f32le(&samples, &mut bytes);
        bytes
    }

    #[test]
    fn test_reader_upsample_linear() {
        let src = Cursor::new(sine_bytes(800, 1));
        let mut reader =
            ResampleReader::new(src, Format::mono(8000), Format::mono(16000), Quality::Linear)
                .unwrap();

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out.len() % 4, 0);
        assert_eq!(out.len() / 4, 1600);
        assert_eq!(reader.read(&mut [0u8; 16]).unwrap(), 0);
    }

    #[test]
    fn test_reader_downsample_sinc_stereo() {
        let src = Cursor::new(sine_bytes(4800, 2));
        let mut reader = ResampleReader::new(
            src,
            Format::STEREO_48K,
            Format::stereo(16000),
            Quality::SincFastest,
        )
        .unwrap();

        let mut out = Vec::new();
        let mut buf = [0u8; 1000];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            assert_eq!(n % 8, 0);
            out.extend_from_slice(&buf[..n]);
        }
        let frames = out.len() / 8;
        assert!((frames as i64 - 1600).abs() <= 2, "frames {frames}");

        let mut samples = Vec::new();
        decode_f32le(&out, &mut samples);
        assert!(samples.iter().all(|s| s.is_finite() && s.abs() < 1.5));
    }

    #[test]
    fn test_reader_unaligned_buffer() {
        let src = Cursor::new(sine_bytes(300, 2));
        let mut reader = ResampleReader::new(
            src,
            Format::stereo(8000),
            Format::stereo(8000),
            Quality::Linear,
        )
        .unwrap();

        let mut out = Vec::new();
        let mut buf = [0u8; 21];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            assert!(n <= 16 && n % 8 == 0, "read {n}");
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(out, sine_bytes(300, 2));
    }

    #[test]
    fn test_reader_rejects_channel_mismatch() {
        let err = ResampleReader::new(
            Cursor::new(Vec::new()),
            Format::MONO_44K,
            Format::STEREO_48K,
            Quality::Linear,
        )
        .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadChannelCount));
    }

    #[test]
    fn test_reader_rejects_bad_rate() {
        let err = ResampleReader::new(
            Cursor::new(Vec::new()),
            Format::mono(0),
            Format::MONO_48K,
            Quality::Linear,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Ratio(_)));
    }

    #[test]
    fn test_reader_small_buffer() {
        let mut reader = ResampleReader::new(
            Cursor::new(sine_bytes(10, 2)),
            Format::STEREO_44K,
            Format::STEREO_48K,
            Quality::Linear,
        )
        .unwrap();
        let err = reader.read(&mut [0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_reader_empty_source() {
        let mut reader = ResampleReader::new(
            Cursor::new(Vec::new()),
            Format::MONO_16K,
            Format::MONO_48K,
            Quality::SincMedium,
        )
        .unwrap();
        let mut out = Vec::new();
        assert_eq!(reader.read_to_end(&mut out).unwrap(), 0);
    }
}
