//! Zero-order hold and linear interpolation.
//!
//! Both kernels keep a single frame of history and the fractional position
//! of the next output frame, so consumption follows output exactly: at unity
//! ratio every block consumes as many frames as it produces.

use crate::error::Result;
use crate::interpolator::Interpolator;
use crate::ratio::Ramp;

/// Positions this close below a frame boundary count as reaching it.
const POSITION_EPSILON: f64 = 1e-6;

/// Polynomial order of the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Order {
    /// Repeat the frame at or before the output position.
    Zero,
    /// Interpolate between the frames around the output position.
    One,
}

pub(crate) struct Polynomial {
    order: Order,
    channels: usize,
    /// Most recently consumed input frame.
    prev: Vec<f32>,
    /// Position of the next output frame, in input frames after `prev`.
    pos: f64,
    /// False until the first input frame has been taken as history.
    primed: bool,
}

impl Polynomial {
    pub fn new(order: Order, channels: usize) -> Self {
        Self {
            order,
            channels,
            prev: vec![0.0; channels],
            pos: 0.0,
            primed: false,
        }
    }
}

/// Frame `j` counted from the history frame: `0` is `prev`, `j >= 1` is
/// `rest[j - 1]`.
fn frame<'a>(prev: &'a [f32], rest: &'a [f32], j: usize, channels: usize) -> &'a [f32] {
    if j == 0 {
        prev
    } else {
        &rest[(j - 1) * channels..j * channels]
    }
}

impl Interpolator for Polynomial {
    fn process(
        &mut self,
        input: &[f32],
        output: &mut [f32],
        end_of_input: bool,
        ramp: Ramp,
    ) -> Result<(usize, usize)> {
        let ch = self.channels;
        let capacity = output.len() / ch;
        let mut consumed = 0;

        if !self.primed {
            if input.len() < ch {
                return Ok((0, 0));
            }
            self.prev.copy_from_slice(&input[..ch]);
            self.primed = true;
            consumed = 1;
        }

        let rest = &input[consumed * ch..];
        let avail = rest.len() / ch;
        let mut pos = self.pos;
        let mut produced = 0;

        while produced < capacity {
            let ratio = ramp.at(produced, capacity);
            let i = pos as usize;
            let out = &mut output[produced * ch..(produced + 1) * ch];

            if i < avail {
                let a = frame(&self.prev, rest, i, ch);
                match self.order {
                    Order::Zero => out.copy_from_slice(a),
                    Order::One => {
                        let b = frame(&self.prev, rest, i + 1, ch);
                        let t = (pos - i as f64) as f32;
                        for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
                            *o = x + t * (y - x);
                        }
                    }
                }
            } else if end_of_input && i == avail && pos - (i as f64) < 1.0 - POSITION_EPSILON {
                // Past the last frame of the stream: hold it.
                out.copy_from_slice(frame(&self.prev, rest, i, ch));
            } else {
                break;
            }

            produced += 1;
            pos += 1.0 / ratio;
        }

        let step = (pos as usize).min(avail);
        if step > 0 {
            self.prev.copy_from_slice(&rest[(step - 1) * ch..step * ch]);
        }
        self.pos = pos - step as f64;
        consumed += step;

        Ok((consumed, produced))
    }

    fn reset(&mut self, _ratio: f64) -> Result<()> {
        self.prev.fill(0.0);
        self.pos = 0.0;
        self.primed = false;
        Ok(())
    }
}
