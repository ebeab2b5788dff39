//! Frame rates expressed as an integer timebase with optional NTSC pulldown.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimeError};
use crate::rational::Rational;

/// A frame rate as editorial interchange formats record it.
///
/// `timebase` is the nominal integer rate; `ntsc` selects the 1000/1001
/// pulldown variant (30 + ntsc is 29.97).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    /// Nominal integer rate.
    pub timebase: u32,
    /// Whether the 1000/1001 pulldown applies.
    pub ntsc: bool,
}

impl FrameRate {
    /// Film: 24 fps.
    pub const FILM_24: Self = Self::new(24, false);
    /// NTSC film: 23.976 fps.
    pub const NTSC_FILM: Self = Self::new(24, true);
    /// PAL: 25 fps.
    pub const PAL_25: Self = Self::new(25, false);
    /// NTSC: 29.97 fps.
    pub const NTSC_30: Self = Self::new(30, true);
    /// Web: 30 fps.
    pub const WEB_30: Self = Self::new(30, false);
    /// NTSC high rate: 59.94 fps.
    pub const NTSC_60: Self = Self::new(60, true);
    /// High frame rate: 60 fps.
    pub const HFR_60: Self = Self::new(60, false);

    /// Create a new frame rate.
    pub const fn new(timebase: u32, ntsc: bool) -> Self {
        Self { timebase, ntsc }
    }

    /// Exact rational value of this rate, in lowest terms.
    pub fn to_rational(&self) -> Rational {
        if self.ntsc {
            Rational::new(self.timebase as i64 * 1000, 1001).reduce()
        } else {
            Rational::from_int(self.timebase as i64)
        }
    }

    /// Rate as used by [`crate::RationalTime`].
    pub fn to_f64(&self) -> f64 {
        self.to_rational().to_f64()
    }

    /// Recover the timebase form of a floating-point rate.
    ///
    /// Integral rates map to themselves; otherwise the rate must be exactly
    /// the NTSC variant of some integer timebase, computed the same way
    /// [`FrameRate::to_f64`] computes it.
    pub fn from_f64(rate: f64) -> Result<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(TimeError::invalid_rate(rate));
        }
        if rate.fract() == 0.0 && rate <= u32::MAX as f64 {
            return Ok(Self::new(rate as u32, false));
        }
        let timebase = (rate * 1001.0 / 1000.0).round();
        if timebase > 0.0 && timebase <= u32::MAX as f64 {
            let candidate = Self::new(timebase as u32, true);
            if candidate.to_f64() == rate {
                return Ok(candidate);
            }
        }
        Err(TimeError::UnrepresentableRate { rate })
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::WEB_30
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ntsc {
            write!(f, "{:.3} fps", self.to_f64())
        } else {
            write!(f, "{} fps", self.timebase)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_rational() {
        assert_eq!(FrameRate::NTSC_30.to_rational(), Rational::new(30000, 1001));
        assert_eq!(FrameRate::FILM_24.to_rational(), Rational::from_int(24));
        assert_eq!(FrameRate::new(1001, true).to_rational(), Rational::from_int(1000));
    }

    #[test]
    fn test_from_f64_integral() {
        assert_eq!(FrameRate::from_f64(24.0).unwrap(), FrameRate::FILM_24);
        assert_eq!(FrameRate::from_f64(30.0).unwrap(), FrameRate::WEB_30);
    }

    #[test]
    fn test_from_f64_ntsc_roundtrip() {
        for rate in [FrameRate::NTSC_FILM, FrameRate::NTSC_30, FrameRate::NTSC_60] {
            assert_eq!(FrameRate::from_f64(rate.to_f64()).unwrap(), rate);
        }
    }

    #[test]
    fn test_from_f64_rejects_arbitrary_rates() {
        assert!(matches!(
            FrameRate::from_f64(23.5),
            Err(TimeError::UnrepresentableRate { .. })
        ));
        assert!(matches!(
            FrameRate::from_f64(0.0),
            Err(TimeError::InvalidRate { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(FrameRate::PAL_25.to_string(), "25 fps");
        assert_eq!(FrameRate::NTSC_30.to_string(), "29.970 fps");
    }
}
