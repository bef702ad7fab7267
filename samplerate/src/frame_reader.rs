//! Frame-aligned reader wrapper.

use std::io::{self, Read};

use tracing::debug;

/// Wraps an [`io::Read`] so every read returns whole frames.
///
/// Leftover bytes are carried to the next read. A partial frame left at end
/// of stream is discarded.
pub(crate) struct FrameReader<R: Read> {
    inner: R,
    frame_bytes: usize,
    /// Up to `frame_bytes - 1` bytes of an incomplete frame.
    carry: Vec<u8>,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R, frame_bytes: usize) -> Self {
        Self {
            inner,
            frame_bytes,
            carry: Vec::with_capacity(frame_bytes),
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for FrameReader<R> {
    /// Returns 0 or a multiple of `frame_bytes`. Fails with
    /// [`io::ErrorKind::InvalidInput`] if `buf` cannot hold one frame.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.len() < self.frame_bytes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "buffer too small for frame",
            ));
        }
        let aligned_len = (buf.len() / self.frame_bytes) * self.frame_bytes;
        let buf = &mut buf[..aligned_len];

        let mut n = self.carry.len();
        buf[..n].copy_from_slice(&self.carry);
        self.carry.clear();

        // Keep reading until at least one whole frame is in hand.
        loop {
            let rn = match self.inner.read(&mut buf[n..]) {
                Ok(rn) => rn,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.carry.extend_from_slice(&buf[..n]);
                    return Err(e);
                }
            };
            n += rn;
            if rn == 0 {
                if n % self.frame_bytes != 0 {
                    debug!(bytes = n % self.frame_bytes, "dropping partial frame at end of stream");
                }
                return Ok(n / self.frame_bytes * self.frame_bytes);
            }
            if n >= self.frame_bytes {
                break;
            }
        }

        let aligned = n / self.frame_bytes * self.frame_bytes;
        self.carry.extend_from_slice(&buf[aligned..n]);
        Ok(aligned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Yields at most `step` bytes per read.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_frame_reader_aligned() {
        let data: Vec<u8> = (1..=8).collect();
        let mut reader = FrameReader::new(Cursor::new(data), 4);
        let mut buf = vec![0u8; 8];

        let n = reader.read(&mut buf).unwrap();
        assert_eq!(n, 8);
        assert_eq!(&buf[..n], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_frame_reader_drops_partial_frame() {
        let data: Vec<u8> = (1..=10).collect();
        let mut reader = FrameReader::new(Cursor::new(data), 4);
        let mut buf = vec![0u8; 16];

        assert_eq!(reader.read(&mut buf).unwrap(), 8);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_frame_reader_reassembles_trickle() {
        let data: Vec<u8> = (0..12).collect();
        let inner = Trickle {
            data,
            pos: 0,
            step: 3,
        };
        let mut reader = FrameReader::new(inner, 4);
        let mut buf = vec![0u8; 8];
        let mut all = Vec::new();

        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            assert_eq!(n % 4, 0);
            all.extend_from_slice(&buf[..n]);
        }
        assert_eq!(all, (0..12).collect::<Vec<u8>>());
    }

    #[test]
    fn test_frame_reader_unaligned_buffer() {
        let data: Vec<u8> = (0..12).collect();
        let mut reader = FrameReader::new(Cursor::new(data), 4);
        let mut buf = vec![0xffu8; 10];

        assert_eq!(reader.read(&mut buf).unwrap(), 8);
        assert_eq!(&buf[..8], &[0, 1, 2, 3, 4, 5, 6, 7]);
        // Bytes past the last whole frame are left alone.
        assert_eq!(&buf[8..], &[0xff, 0xff]);
        assert_eq!(reader.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], &[8, 9, 10, 11]);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_frame_reader_small_buffer() {
        let mut reader = FrameReader::new(Cursor::new(vec![0u8; 8]), 8);
        let mut buf = vec![0u8; 4];
        let err = reader.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
