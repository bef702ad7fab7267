//! Band-limited sinc kernels backed by rubato.
//!
//! `SincFixedIn` wants whole chunks of input, so this kernel stages input
//! frames until a chunk is full and parks output the caller had no room for.
//! The engine centres its first output on the first input frame, so output
//! is used as produced. The end-of-stream flush stops once the output owed for
//! the real input has been emitted.

use rubato::{Resampler as RubatoResampler, SincFixedIn};
use tracing::{debug, trace, warn};

use crate::error::{Error, ErrorCode, Result};
use crate::interpolator::Interpolator;
use crate::quality::Quality;
use crate::ratio::{MAX_RATIO, Ramp};

pub(crate) struct Sinc {
    quality: Quality,
    channels: usize,
    chunk_size: usize,
    sinc_len: usize,
    engine: SincFixedIn<f32>,
    /// Ratio the engine starts its next chunk at.
    current: f64,
    /// Ratio the engine ends its next chunk at.
    target: f64,
    /// Input frames waiting for a full chunk (planar).
    staged: Vec<Vec<f32>>,
    /// Output frames not yet delivered (planar).
    pending: Vec<Vec<f32>>,
    pending_pos: usize,
    /// Engine output buffer.
    scratch: Vec<Vec<f32>>,
    /// Gradual change spread over the chunks of the current call.
    ramp: Option<ChunkRamp>,
    /// Output frames owed for the real input fed so far.
    owed: f64,
    /// Frames moved to `pending` since the stream started.
    emitted: u64,
    chunks: u64,
    flush_passes: usize,
    finished: bool,
}

/// A ratio ramp laid over `span` input frames.
#[derive(Debug, Clone, Copy)]
struct ChunkRamp {
    from: f64,
    to: f64,
    span: usize,
    done: usize,
}

impl ChunkRamp {
    /// Ratio reached once `done` more frames have gone through the engine.
    fn advance(&mut self, frames: usize) -> f64 {
        self.done = (self.done + frames).min(self.span);
        if self.span == 0 {
            return self.to;
        }
        self.from + (self.to - self.from) * self.done as f64 / self.span as f64
    }

    fn is_done(&self) -> bool {
        self.done >= self.span
    }
}

/// Builds an engine whose relative ratio window covers the whole supported
/// range when started at `ratio`.
fn build_engine(
    quality: Quality,
    channels: usize,
    chunk_size: usize,
    ratio: f64,
) -> std::result::Result<SincFixedIn<f32>, String> {
    let params = quality
        .sinc_params()
        .ok_or_else(|| format!("{} is not a sinc quality", quality))?;
    let headroom = MAX_RATIO * ratio.max(1.0 / ratio);
    SincFixedIn::<f32>::new(ratio, headroom, params, chunk_size, channels).map_err(|e| e.to_string())
}

impl Sinc {
    pub fn new(quality: Quality, channels: usize, chunk_size: usize, ratio: f64) -> Result<Self> {
        let engine = build_engine(quality, channels, chunk_size, ratio).map_err(|e| {
            warn!(%quality, channels, chunk_size, err = %e, "failed to create sinc engine");
            Error::Initialization(ErrorCode::Engine)
        })?;
        let sinc_len = quality.sinc_params().map(|p| p.sinc_len).unwrap_or_default();

        Ok(Self {
            quality,
            channels,
            chunk_size,
            sinc_len,
            engine,
            current: ratio,
            target: ratio,
            staged: vec![Vec::with_capacity(chunk_size); channels],
            pending: vec![Vec::new(); channels],
            pending_pos: 0,
            scratch: vec![Vec::new(); channels],
            ramp: None,
            owed: 0.0,
            emitted: 0,
            chunks: 0,
            flush_passes: 0,
            finished: false,
        })
    }

    fn staged_frames(&self) -> usize {
        self.staged[0].len()
    }

    fn pending_frames(&self) -> usize {
        self.pending[0].len() - self.pending_pos
    }

    /// Replaces the engine with a fresh one started at `ratio`.
    fn rebuild(&mut self, ratio: f64) -> Result<()> {
        self.engine =
            build_engine(self.quality, self.channels, self.chunk_size, ratio).map_err(Error::engine)?;
        self.current = ratio;
        self.target = ratio;
        Ok(())
    }

    /// Moves the engine to `ratio` at once, dropping any ramp in progress.
    fn jump_to(&mut self, ratio: f64) -> Result<()> {
        if self.current == ratio && self.target == ratio {
            return Ok(());
        }
        if self.chunks == 0 {
            // Nothing has gone through the engine yet, so rebuild it with
            // a cutoff that suits the new ratio.
            debug!(quality = %self.quality, ratio, "rebuilding sinc engine");
            return self.rebuild(ratio);
        }
        self.engine
            .set_resample_ratio(ratio, false)
            .map_err(Error::engine)?;
        self.current = ratio;
        self.target = ratio;
        Ok(())
    }

    /// Brings the engine in line with the ratio ramp requested for this call.
    ///
    /// A gradual ramp starts at `ramp.from` and is spread over the `span`
    /// input frames this call will push through the engine.
    fn apply_ramp(&mut self, ramp: Ramp, span: usize) -> Result<()> {
        self.ramp = None;
        if ramp.is_steady() {
            return self.jump_to(ramp.to);
        }

        self.jump_to(ramp.from)?;
        self.ramp = Some(ChunkRamp {
            from: ramp.from,
            to: ramp.to,
            span,
            done: 0,
        });
        Ok(())
    }

    /// Points the engine at the ratio the next chunk of `frames` real input
    /// frames should end at.
    fn step_ramp(&mut self, frames: usize) -> Result<()> {
        let Some(ramp) = self.ramp.as_mut() else {
            return Ok(());
        };
        let next = ramp.advance(frames);
        if ramp.is_done() {
            self.ramp = None;
        }
        if next != self.target {
            self.engine
                .set_resample_ratio(next, true)
                .map_err(Error::engine)?;
            self.target = next;
        }
        Ok(())
    }

    /// Appends whole interleaved frames to the staging buffers.
    fn stage(&mut self, input: &[f32]) {
        for frame in input.chunks_exact(self.channels) {
            for (buf, &sample) in self.staged.iter_mut().zip(frame) {
                buf.push(sample);
            }
        }
    }

    /// Copies parked output into `output`. Returns frames written.
    fn drain_pending(&mut self, output: &mut [f32]) -> usize {
        let ch = self.channels;
        let n = self.pending_frames().min(output.len() / ch);
        for (f, out) in output.chunks_exact_mut(ch).take(n).enumerate() {
            for (o, buf) in out.iter_mut().zip(&self.pending) {
                *o = buf[self.pending_pos + f];
            }
        }
        self.pending_pos += n;
        if self.pending_pos == self.pending[0].len() {
            for buf in &mut self.pending {
                buf.clear();
            }
            self.pending_pos = 0;
        }
        n
    }

    /// Runs the engine once over the staged frames, zero-padding a partial
    /// chunk, and parks the result in `pending`.
    fn run_chunk(&mut self, flushing: bool) -> Result<()> {
        let real = self.staged_frames();
        self.step_ramp(real)?;
        let out_len = self.engine.output_frames_next();
        for buf in &mut self.scratch {
            buf.resize(out_len, 0.0);
        }

        let result = if real == self.chunk_size {
            self.engine
                .process_into_buffer(self.staged.as_slice(), self.scratch.as_mut_slice(), None)
        } else if real > 0 {
            self.engine.process_partial_into_buffer(
                Some(self.staged.as_slice()),
                self.scratch.as_mut_slice(),
                None,
            )
        } else {
            self.engine.process_partial_into_buffer(
                None::<&[Vec<f32>]>,
                self.scratch.as_mut_slice(),
                None,
            )
        };
        let (_, produced) = result.map_err(Error::engine)?;

        self.owed += real as f64 * 0.5 * (self.current + self.target);
        self.current = self.target;
        self.chunks += 1;
        for buf in &mut self.staged {
            buf.clear();
        }

        let mut keep = produced;
        if flushing {
            let limit = self.owed.round() as u64;
            keep = keep.min(limit.saturating_sub(self.emitted) as usize);
        }

        for (dst, src) in self.pending.iter_mut().zip(&self.scratch) {
            dst.extend_from_slice(&src[..keep]);
        }
        self.emitted += keep as u64;

        trace!(
            real,
            produced,
            kept = keep,
            ratio = self.current,
            "sinc chunk"
        );
        Ok(())
    }

    /// One end-of-stream pass: pushes the staged remainder and then silence
    /// through the engine until the owed output has been emitted.
    fn flush_step(&mut self) -> Result<()> {
        self.run_chunk(true)?;
        self.flush_passes += 1;

        let limit = self.owed.round() as u64;
        let max_passes = 2 + (2 * self.sinc_len + self.chunk_size) / self.chunk_size;
        if self.emitted >= limit || self.flush_passes >= max_passes {
            debug!(
                emitted = self.emitted,
                owed = limit,
                passes = self.flush_passes,
                "sinc flush complete"
            );
            self.finished = true;
        }
        Ok(())
    }
}

impl Interpolator for Sinc {
    fn process(
        &mut self,
        input: &[f32],
        output: &mut [f32],
        end_of_input: bool,
        ramp: Ramp,
    ) -> Result<(usize, usize)> {
        let ch = self.channels;
        let in_frames = input.len() / ch;
        let capacity = output.len() / ch;

        // Frames that will go through the engine in whole chunks, or all of
        // them when the stream ends here.
        let queued = self.staged_frames() + in_frames;
        let span = if end_of_input {
            queued
        } else {
            queued / self.chunk_size * self.chunk_size
        };
        self.apply_ramp(ramp, span)?;

        let mut consumed = 0;
        let mut produced = 0;
        loop {
            produced += self.drain_pending(&mut output[produced * ch..]);
            if produced == capacity || self.finished {
                break;
            }

            // Pending is empty from here on.
            let want = self.chunk_size - self.staged_frames();
            let take = want.min(in_frames - consumed);
            self.stage(&input[consumed * ch..(consumed + take) * ch]);
            consumed += take;

            if self.staged_frames() == self.chunk_size {
                self.run_chunk(false)?;
                continue;
            }
            if !end_of_input {
                break;
            }
            self.flush_step()?;
        }

        Ok((consumed, produced))
    }

    fn reset(&mut self, ratio: f64) -> Result<()> {
        self.rebuild(ratio)?;
        for buf in self.staged.iter_mut().chain(self.pending.iter_mut()) {
            buf.clear();
        }
        self.pending_pos = 0;
        self.ramp = None;
        self.owed = 0.0;
        self.emitted = 0;
        self.chunks = 0;
        self.flush_passes = 0;
        self.finished = false;
        Ok(())
    }
}
