//! Raw byte view over the converter.
//!
//! Samples are 4-byte little-endian IEEE floats, interleaved by channel.

use crate::converter::{Block, Converter, Transfer};
use crate::error::Result;

/// Bytes per encoded sample.
pub const BYTES_PER_SAMPLE: usize = 4;

/// Bytes moved by one [`Converter::process_bytes`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteTransfer {
    pub bytes_consumed: usize,
    pub bytes_produced: usize,
}

impl ByteTransfer {
    fn from_frames(t: Transfer, frame_bytes: usize) -> Self {
        Self {
            bytes_consumed: t.frames_consumed * frame_bytes,
            bytes_produced: t.frames_produced * frame_bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes_consumed == 0 && self.bytes_produced == 0
    }
}

/// Decodes little-endian `f32` samples. Trailing bytes short of a sample are
/// ignored.
pub fn decode_f32le(bytes: &[u8], out: &mut Vec<f32>) {
    out.clear();
    out.extend(
        bytes
            .chunks_exact(BYTES_PER_SAMPLE)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
    );
}

/// Encodes samples as little-endian `f32` into the front of `out`.
pub fn encode_f32le(samples: &[f32], out: &mut [u8]) {
    for (dst, s) in out.chunks_exact_mut(BYTES_PER_SAMPLE).zip(samples) {
        dst.copy_from_slice(&s.to_le_bytes());
    }
}

impl Converter {
    fn frame_bytes(&self) -> usize {
        self.channels() * BYTES_PER_SAMPLE
    }

    /// Converts one block of encoded samples.
    ///
    /// Byte lengths are rounded down to whole frames. Consumed and produced
    /// counts are always whole frames.
    pub fn process_bytes(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        end_of_input: bool,
    ) -> Result<ByteTransfer> {
        let frame_bytes = self.frame_bytes();
        let channels = self.channels();
        let input_frames = input.len() / frame_bytes;
        let output_frames = output.len() / frame_bytes;

        let mut samples = Vec::with_capacity(input_frames * channels);
        decode_f32le(&input[..input_frames * frame_bytes], &mut samples);
        let mut out = vec![0.0f32; output_frames * channels];

        let t = self.process_block(Block {
            input: &samples,
            input_frames,
            output: &mut out,
            output_frames,
            end_of_input,
        })?;

        encode_f32le(
            &out[..t.frames_produced * channels],
            &mut output[..t.frames_produced * frame_bytes],
        );
        Ok(ByteTransfer::from_frames(t, frame_bytes))
    }

    /// Advisory estimate of buffered input, in bytes.
    pub fn buffered_bytes(&self) -> Result<f64> {
        Ok(self.buffered_frames()? * self.frame_bytes() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Quality, RatioMode};

    fn encode(samples: &[f32]) -> Vec<u8> {
        let mut out = vec![0u8; samples.len() * BYTES_PER_SAMPLE];
        encode_f32le(samples, &mut out);
        out
    }

    #[test]
    fn test_f32le_layout() {
        let bytes = encode(&[1.0]);
        assert_eq!(bytes, vec![0x00, 0x00, 0x80, 0x3f]);

        let mut decoded = Vec::new();
        decode_f32le(&[0x00, 0x00, 0x80, 0xbf, 0xff], &mut decoded);
        assert_eq!(decoded, vec![-1.0]);
    }

    #[test]
    fn test_process_bytes_matches_frames() {
        let samples: Vec<f32> = (0..64).map(|i| (i as f32 * 0.1).sin()).collect();

        let mut by_frames = Converter::new(Quality::Linear, 2).unwrap();
        by_frames.set_ratio(1.5, RatioMode::Instant).unwrap();
        let mut out = vec![0.0f32; 128];
        let t = by_frames.process(&samples, &mut out, false).unwrap();

        let mut by_bytes = Converter::new(Quality::Linear, 2).unwrap();
        by_bytes.set_ratio(1.5, RatioMode::Instant).unwrap();
        let mut out_bytes = vec![0u8; 128 * BYTES_PER_SAMPLE];
        let bt = by_bytes.process_bytes(&encode(&samples), &mut out_bytes, false).unwrap();

        assert_eq!(bt.bytes_consumed, t.frames_consumed * 8);
        assert_eq!(bt.bytes_produced, t.frames_produced * 8);
        let produced = t.frames_produced * 2;
        assert_eq!(out_bytes[..produced * 4], encode(&out[..produced])[..]);
        assert_eq!(
            by_bytes.buffered_bytes().unwrap(),
            by_frames.buffered_frames().unwrap() * 8.0
        );
    }

    #[test]
    fn test_process_bytes_partial_frame() {
        let mut conv = Converter::new(Quality::ZeroOrderHold, 1).unwrap();
        // Two whole samples and a stray byte.
        let mut input = encode(&[0.5, 0.25]);
        input.push(0x7f);
        let mut output = vec![0u8; 9];

        let bt = conv.process_bytes(&input, &mut output, false).unwrap();
        assert_eq!(bt.bytes_consumed % 4, 0);
        assert_eq!(bt.bytes_produced % 4, 0);
        assert!(bt.bytes_produced <= 8);
    }
}
