//! Quality levels and their kernel parameters.

use std::fmt;
use std::str::FromStr;

use rubato::{SincInterpolationParameters, SincInterpolationType, WindowFunction};
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorCode};

/// Interpolation kernel selection.
///
/// Indices follow the classic converter-type numbering, so `0` is the best
/// sinc kernel and `4` is linear interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Quality {
    /// 256-tap sinc with cubic table interpolation.
    SincBest,
    /// 128-tap sinc.
    #[default]
    SincMedium,
    /// 64-tap sinc.
    SincFastest,
    /// Repeats the most recent input frame.
    ZeroOrderHold,
    /// Straight line between neighbouring input frames.
    Linear,
}

impl Quality {
    /// All quality levels, best first.
    pub const ALL: [Quality; 5] = [
        Quality::SincBest,
        Quality::SincMedium,
        Quality::SincFastest,
        Quality::ZeroOrderHold,
        Quality::Linear,
    ];

    /// Looks up a quality level by its numeric index.
    pub fn from_index(index: i32) -> Result<Self, Error> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(Error::Initialization(ErrorCode::BadConverter))
    }

    /// Returns the numeric index.
    pub fn index(self) -> i32 {
        match self {
            Quality::SincBest => 0,
            Quality::SincMedium => 1,
            Quality::SincFastest => 2,
            Quality::ZeroOrderHold => 3,
            Quality::Linear => 4,
        }
    }

    /// Returns the kebab-case name.
    pub fn name(self) -> &'static str {
        match self {
            Quality::SincBest => "sinc-best",
            Quality::SincMedium => "sinc-medium",
            Quality::SincFastest => "sinc-fastest",
            Quality::ZeroOrderHold => "zero-order-hold",
            Quality::Linear => "linear",
        }
    }

    /// Returns true for the band-limited sinc kernels.
    pub fn is_sinc(self) -> bool {
        matches!(
            self,
            Quality::SincBest | Quality::SincMedium | Quality::SincFastest
        )
    }

    /// Sinc table parameters. `None` for the polynomial kernels.
    pub(crate) fn sinc_params(self) -> Option<SincInterpolationParameters> {
        let (sinc_len, oversampling_factor, interpolation) = match self {
            Quality::SincBest => (256, 256, SincInterpolationType::Cubic),
            Quality::SincMedium => (128, 256, SincInterpolationType::Linear),
            Quality::SincFastest => (64, 128, SincInterpolationType::Linear),
            Quality::ZeroOrderHold | Quality::Linear => return None,
        };
        Some(SincInterpolationParameters {
            sinc_len,
            f_cutoff: rubato::calculate_cutoff(sinc_len, WindowFunction::BlackmanHarris2),
            interpolation,
            oversampling_factor,
            window: WindowFunction::BlackmanHarris2,
        })
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Quality {
    type Err = Error;

    /// Accepts the kebab-case name, a few short aliases, or the numeric index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if let Ok(index) = s.parse::<i32>() {
            return Self::from_index(index);
        }
        match s.as_str() {
            "sinc-best" | "best" => Ok(Quality::SincBest),
            "sinc-medium" | "medium" => Ok(Quality::SincMedium),
            "sinc-fastest" | "fastest" | "fast" => Ok(Quality::SincFastest),
            "zero-order-hold" | "zoh" | "hold" => Ok(Quality::ZeroOrderHold),
            "linear" => Ok(Quality::Linear),
            _ => Err(Error::Initialization(ErrorCode::BadConverter)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_index_roundtrip() {
        for q in Quality::ALL {
            assert_eq!(Quality::from_index(q.index()).unwrap(), q);
        }
    }

    #[test]
    fn test_quality_unknown_index() {
        for index in [-1, 5, 42] {
            let err = Quality::from_index(index).unwrap_err();
            assert!(matches!(err, Error::Initialization(ErrorCode::BadConverter)));
        }
    }

    #[test]
    fn test_quality_from_str() {
        assert_eq!("sinc-medium".parse::<Quality>().unwrap(), Quality::SincMedium);
        assert_eq!("ZOH".parse::<Quality>().unwrap(), Quality::ZeroOrderHold);
        assert_eq!("fastest".parse::<Quality>().unwrap(), Quality::SincFastest);
        assert_eq!("4".parse::<Quality>().unwrap(), Quality::Linear);
        assert!("cubic".parse::<Quality>().is_err());
    }

    #[test]
    fn test_quality_display_matches_serde() {
        for q in Quality::ALL {
            let json = serde_json::to_string(&q).unwrap();
            assert_eq!(json, format!("\"{}\"", q));
        }
    }

    #[test]
    fn test_sinc_params() {
        assert!(Quality::Linear.sinc_params().is_none());
        assert!(Quality::ZeroOrderHold.sinc_params().is_none());

        let best = Quality::SincBest.sinc_params().unwrap();
        let fastest = Quality::SincFastest.sinc_params().unwrap();
        assert!(best.sinc_len > fastest.sinc_len);
        assert!(best.f_cutoff > 0.0 && best.f_cutoff < 1.0);
    }
}
