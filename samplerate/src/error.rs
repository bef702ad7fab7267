//! Error types for sample rate conversion.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::ratio::{MAX_RATIO, MIN_RATIO};

/// Result type for converter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Converter error.
#[derive(Debug, Error)]
pub enum Error {
    /// The converter could not be created from the given parameters.
    #[error("samplerate: initialization failed: {0}")]
    Initialization(ErrorCode),

    /// A ratio was rejected by [`is_valid_ratio`](crate::is_valid_ratio).
    #[error("samplerate: invalid ratio {0} (expected {min} <= ratio <= {max})", min = MIN_RATIO, max = MAX_RATIO)]
    Ratio(f64),

    /// A block could not be processed.
    #[error("samplerate: {}", describe(.code, .detail))]
    Processing {
        /// Entry of the fixed error table.
        code: ErrorCode,
        /// Extra diagnostic from the interpolation engine, if any.
        detail: Option<String>,
    },

    /// The converter has been destroyed.
    #[error("samplerate: converter destroyed")]
    Lifecycle,
}

impl Error {
    /// Creates a processing error carrying only a table entry.
    pub(crate) fn processing(code: ErrorCode) -> Self {
        Error::Processing { code, detail: None }
    }

    /// Creates a processing error from an engine failure.
    pub(crate) fn engine(err: impl fmt::Display) -> Self {
        Error::Processing {
            code: ErrorCode::Engine,
            detail: Some(err.to_string()),
        }
    }

    /// Returns the table entry behind this error, if it has one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::Initialization(code) => Some(*code),
            Error::Ratio(_) => Some(ErrorCode::BadRatio),
            Error::Processing { code, .. } => Some(*code),
            Error::Lifecycle => None,
        }
    }
}

fn describe(code: &ErrorCode, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!("{}: {}", code.message(), detail),
        None => code.message().to_string(),
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        let kind = match e {
            Error::Ratio(_) | Error::Initialization(_) => io::ErrorKind::InvalidInput,
            Error::Lifecycle => io::ErrorKind::BrokenPipe,
            Error::Processing { .. } => io::ErrorKind::Other,
        };
        io::Error::new(kind, e)
    }
}

/// Fixed table of failure codes.
///
/// Codes are stable and map one-to-one onto a human readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Converter state is missing or inconsistent.
    BadState,
    /// Unknown quality level.
    BadConverter,
    /// Channel count is zero.
    BadChannelCount,
    /// Engine chunk size is zero.
    BadChunkSize,
    /// Ratio outside the supported range.
    BadRatio,
    /// A buffer holds fewer samples than its frame count requires.
    BufferTooShort,
    /// Input was supplied after the stream was drained.
    InputAfterEnd,
    /// The interpolation engine reported a failure.
    Engine,
}

impl ErrorCode {
    /// Returns the numeric code.
    pub fn as_i32(self) -> i32 {
        match self {
            ErrorCode::BadState => 2,
            ErrorCode::BadConverter => 10,
            ErrorCode::BadChannelCount => 11,
            ErrorCode::BadChunkSize => 12,
            ErrorCode::BadRatio => 6,
            ErrorCode::BufferTooShort => 4,
            ErrorCode::InputAfterEnd => 20,
            ErrorCode::Engine => 21,
        }
    }

    /// Looks up a code by number.
    pub fn from_i32(code: i32) -> Option<Self> {
        [
            ErrorCode::BadState,
            ErrorCode::BadConverter,
            ErrorCode::BadChannelCount,
            ErrorCode::BadChunkSize,
            ErrorCode::BadRatio,
            ErrorCode::BufferTooShort,
            ErrorCode::InputAfterEnd,
            ErrorCode::Engine,
        ]
        .into_iter()
        .find(|c| c.as_i32() == code)
    }

    /// Returns the message for this code.
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::BadState => "converter state is missing",
            ErrorCode::BadConverter => "bad converter number",
            ErrorCode::BadChannelCount => "channel count must be >= 1",
            ErrorCode::BadChunkSize => "engine chunk size must be >= 1",
            ErrorCode::BadRatio => "ratio outside [1/256, 256] range",
            ErrorCode::BufferTooShort => "buffer shorter than frame count times channels",
            ErrorCode::InputAfterEnd => "input supplied after end of stream",
            ErrorCode::Engine => "interpolation engine failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
