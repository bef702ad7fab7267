//! Conversion ratio bounds and update modes.

/// Largest supported ratio (output rate ÷ input rate).
pub const MAX_RATIO: f64 = 256.0;

/// Smallest supported ratio.
pub const MIN_RATIO: f64 = 1.0 / MAX_RATIO;

/// Returns true if `ratio` can be used for conversion.
///
/// Rejects zero, negative, non-finite and out-of-range values. Both range
/// boundaries are accepted.
pub fn is_valid_ratio(ratio: f64) -> bool {
    ratio.is_finite() && (MIN_RATIO..=MAX_RATIO).contains(&ratio)
}

/// How a ratio change takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatioMode {
    /// The next block runs entirely at the new ratio.
    #[default]
    Instant,
    /// The next block ramps linearly from the ratio in effect at its start
    /// to the new ratio.
    Gradual,
}

impl RatioMode {
    /// Maps the classic `step` flag (true = instant change) onto a mode.
    pub fn from_step(step: bool) -> Self {
        if step { RatioMode::Instant } else { RatioMode::Gradual }
    }
}

/// Ratio ramp applied to one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Ramp {
    /// Ratio at the start of the block.
    pub from: f64,
    /// Ratio at the end of the block.
    pub to: f64,
}

impl Ramp {
    pub fn steady(ratio: f64) -> Self {
        Self { from: ratio, to: ratio }
    }

    pub fn is_steady(&self) -> bool {
        (self.to - self.from).abs() < 1e-20
    }

    /// Ratio for output frame `k` of a block with `capacity` output frames.
    pub fn at(&self, k: usize, capacity: usize) -> f64 {
        if self.is_steady() || capacity == 0 {
            return self.to;
        }
        self.from + k as f64 * (self.to - self.from) / capacity as f64
    }
}
