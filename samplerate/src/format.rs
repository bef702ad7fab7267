//! Stream format for byte-oriented conversion.

use crate::bytes::BYTES_PER_SAMPLE;

/// Sample rate and channel layout of an interleaved little-endian `f32`
/// stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    /// Sample rate in Hz (e.g., 44100, 96000).
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
}

impl Format {
    /// Creates a format with an explicit channel count.
    pub const fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Creates a mono format.
    pub const fn mono(sample_rate: u32) -> Self {
        Self::new(sample_rate, 1)
    }

    /// Creates a stereo format.
    pub const fn stereo(sample_rate: u32) -> Self {
        Self::new(sample_rate, 2)
    }

    /// Bytes per interleaved frame.
    pub fn frame_bytes(&self) -> usize {
        self.channels as usize * BYTES_PER_SAMPLE
    }

    /// Conversion ratio from `self` to `dst`.
    pub fn ratio_to(&self, dst: &Format) -> f64 {
        dst.sample_rate as f64 / self.sample_rate as f64
    }
}

impl Format {
    pub const MONO_16K: Format = Format::mono(16000);
    pub const MONO_44K: Format = Format::mono(44100);
    pub const MONO_48K: Format = Format::mono(48000);
    pub const MONO_96K: Format = Format::mono(96000);
    pub const STEREO_44K: Format = Format::stereo(44100);
    pub const STEREO_48K: Format = Format::stereo(48000);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_channels() {
        assert_eq!(Format::mono(16000).channels, 1);
        assert_eq!(Format::stereo(48000).channels, 2);
        assert_eq!(Format::new(48000, 6).channels, 6);
    }

    #[test]
    fn test_format_frame_bytes() {
        assert_eq!(Format::MONO_44K.frame_bytes(), 4);
        assert_eq!(Format::STEREO_48K.frame_bytes(), 8);
        assert_eq!(Format::new(48000, 6).frame_bytes(), 24);
    }

    #[test]
    fn test_format_ratio() {
        let r = Format::MONO_44K.ratio_to(&Format::MONO_96K);
        assert!((r - 96000.0 / 44100.0).abs() < 1e-12);
        assert_eq!(Format::MONO_48K.ratio_to(&Format::MONO_16K), 1.0 / 3.0);
    }

    #[test]
    fn test_format_eq() {
        assert_eq!(Format::mono(16000), Format::MONO_16K);
        assert_ne!(Format::mono(44100), Format::stereo(44100));
    }
}
