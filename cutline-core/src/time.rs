//! Rational time values and ranges.
//!
//! A [`RationalTime`] keeps its value and rate as separate fields until a
//! caller asks for a final conversion, so combining values recorded at
//! different rates does not accumulate floating-point drift.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimeError};
use crate::rate::FrameRate;
use crate::rational::Rational;

/// Largest whole value handled with exact rational arithmetic.
const EXACT_LIMIT: f64 = (1u64 << 40) as f64;

/// A timestamp or duration measured in units of `1 / rate` seconds.
///
/// Two values compare equal when they denote the same instant, regardless of
/// the rate they were recorded at: `RationalTime::new(24.0, 24.0)` equals
/// `RationalTime::new(30.0, 30.0)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RationalTime {
    /// Number of units.
    pub value: f64,
    /// Units per second.
    pub rate: f64,
}

impl RationalTime {
    /// Create a new time value without validating the rate.
    pub const fn new(value: f64, rate: f64) -> Self {
        Self { value, rate }
    }

    /// Create a new time value, rejecting invalid rates and values.
    pub fn try_new(value: f64, rate: f64) -> Result<Self> {
        let time = Self { value, rate };
        time.validate()?;
        Ok(time)
    }

    /// Zero at the given rate.
    pub const fn zero(rate: f64) -> Self {
        Self { value: 0.0, rate }
    }

    /// Check whether `rate` can be used as a time base.
    pub fn is_valid_rate(rate: f64) -> bool {
        rate.is_finite() && rate > 0.0
    }

    /// Validate both fields.
    pub fn validate(&self) -> Result<()> {
        if !Self::is_valid_rate(self.rate) {
            return Err(TimeError::invalid_rate(self.rate));
        }
        if !self.value.is_finite() {
            return Err(TimeError::InvalidValue { value: self.value });
        }
        Ok(())
    }

    /// Check if this time is zero.
    pub fn is_zero(&self) -> bool {
        self.value == 0.0
    }

    /// Check if this time is negative.
    pub fn is_negative(&self) -> bool {
        self.value < 0.0
    }

    /// Return this time expressed at `rate`.
    ///
    /// The fractional part of the rescaled value is kept; rounding only
    /// happens in [`RationalTime::to_frames`].
    pub fn rescaled_to(&self, rate: f64) -> Result<Self> {
        self.validate()?;
        if !Self::is_valid_rate(rate) {
            return Err(TimeError::invalid_rate(rate));
        }
        Ok(Self {
            value: rescale_value(self.value, self.rate, rate),
            rate,
        })
    }

    /// Return only the value of this time expressed at `rate`.
    pub fn value_rescaled_to(&self, rate: f64) -> Result<f64> {
        Ok(self.rescaled_to(rate)?.value)
    }

    /// Nearest whole number of units at `rate`, rounding half away from zero.
    ///
    /// Whole frame counts between timebase rates (NTSC included) are
    /// converted exactly.
    pub fn to_frames(&self, rate: f64) -> Result<i64> {
        if let (Some((frames, source)), Ok(target)) = (self.exact_frames(), FrameRate::from_f64(rate)) {
            return source.rescale_rounded(frames, target.to_rational());
        }
        let value = self.value_rescaled_to(rate)?.round();
        if value.abs() >= i64::MAX as f64 {
            return Err(TimeError::Overflow(format!("{value} frames")));
        }
        Ok(value as i64)
    }

    /// Convert to seconds.
    pub fn to_seconds(&self) -> Result<f64> {
        self.validate()?;
        Ok(self.value / self.rate)
    }

    /// Create from seconds at the given rate.
    pub fn from_seconds(seconds: f64, rate: f64) -> Result<Self> {
        Self::try_new(seconds * rate, rate)
    }

    /// Add two times, rescaling to the finer of the two rates when they differ.
    pub fn checked_add(&self, other: &Self) -> Result<Self> {
        let (lhs, rhs, rate) = self.common_rate(other)?;
        Ok(Self::new(lhs + rhs, rate))
    }

    /// Subtract `other` from this time, rescaling to the finer of the two rates.
    pub fn checked_sub(&self, other: &Self) -> Result<Self> {
        let (lhs, rhs, rate) = self.common_rate(other)?;
        Ok(Self::new(lhs - rhs, rate))
    }

    /// Compare two times by the instant they denote.
    pub fn cmp_time(&self, other: &Self) -> Result<Ordering> {
        self.validate()?;
        other.validate()?;
        if self.rate == other.rate {
            return Ok(self.value.total_cmp(&other.value));
        }
        if let (Some((a, ra)), Some((b, rb))) = (self.exact_frames(), other.exact_frames()) {
            return Ok((Rational::from_int(a) / ra).cmp(&(Rational::from_int(b) / rb)));
        }
        // a/ra ? b/rb  <=>  a*rb ? b*ra   (both rates positive)
        let lhs = self.value * other.rate;
        let rhs = other.value * self.rate;
        Ok(lhs.total_cmp(&rhs))
    }

    /// The value as a whole frame count at an exact timebase rate.
    fn exact_frames(&self) -> Option<(i64, Rational)> {
        if self.value.fract() != 0.0 || self.value.abs() > EXACT_LIMIT {
            return None;
        }
        let rate = FrameRate::from_f64(self.rate).ok()?;
        Some((self.value as i64, rate.to_rational()))
    }

    fn common_rate(&self, other: &Self) -> Result<(f64, f64, f64)> {
        self.validate()?;
        other.validate()?;
        if self.rate == other.rate {
            return Ok((self.value, other.value, self.rate));
        }
        let rate = self.rate.max(other.rate);
        Ok((
            rescale_value(self.value, self.rate, rate),
            rescale_value(other.value, other.rate, rate),
            rate,
        ))
    }
}

/// `value * target / source`, exact when `target` is a whole multiple of `source`.
fn rescale_value(value: f64, source: f64, target: f64) -> f64 {
    if source == target {
        return value;
    }
    let factor = target / source;
    if factor.fract() == 0.0 {
        value * factor
    } else {
        value * target / source
    }
}

impl Default for RationalTime {
    fn default() -> Self {
        Self::zero(1.0)
    }
}

impl PartialEq for RationalTime {
    fn eq(&self, other: &Self) -> bool {
        match self.cmp_time(other) {
            Ok(ordering) => ordering == Ordering::Equal,
            Err(_) => self.value.to_bits() == other.value.to_bits() && self.rate.to_bits() == other.rate.to_bits(),
        }
    }
}

impl PartialOrd for RationalTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.cmp_time(other).ok()
    }
}

impl Add for RationalTime {
    type Output = Self;

    /// # Panics
    ///
    /// Panics if either operand has an invalid rate. Use
    /// [`RationalTime::checked_add`] for untrusted input.
    fn add(self, rhs: Self) -> Self::Output {
        match self.checked_add(&rhs) {
            Ok(sum) => sum,
            Err(err) => panic!("cannot add {self} and {rhs}: {err}"),
        }
    }
}

impl Sub for RationalTime {
    type Output = Self;

    /// # Panics
    ///
    /// Panics if either operand has an invalid rate. Use
    /// [`RationalTime::checked_sub`] for untrusted input.
    fn sub(self, rhs: Self) -> Self::Output {
        match self.checked_sub(&rhs) {
            Ok(difference) => difference,
            Err(err) => panic!("cannot subtract {rhs} from {self}: {err}"),
        }
    }
}

impl fmt::Display for RationalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.value, self.rate)
    }
}

/// A span of time: a start and a non-negative duration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeRange {
    /// First instant covered by the range.
    pub start_time: RationalTime,
    /// Length of the range.
    pub duration: RationalTime,
}

impl TimeRange {
    /// Create a range without validation.
    pub const fn new(start_time: RationalTime, duration: RationalTime) -> Self {
        Self {
            start_time,
            duration,
        }
    }

    /// Create a range, rejecting invalid rates and negative durations.
    pub fn try_new(start_time: RationalTime, duration: RationalTime) -> Result<Self> {
        let range = Self::new(start_time, duration);
        range.validate()?;
        Ok(range)
    }

    /// A range starting at zero (at the duration's rate).
    pub const fn from_duration(duration: RationalTime) -> Self {
        Self {
            start_time: RationalTime::zero(duration.rate),
            duration,
        }
    }

    /// Build a range from a start and an exclusive end.
    pub fn from_start_end(start_time: RationalTime, end_time_exclusive: RationalTime) -> Result<Self> {
        let duration = end_time_exclusive.checked_sub(&start_time)?;
        Self::try_new(start_time, duration)
    }

    /// Validate rates and the non-negative duration invariant.
    pub fn validate(&self) -> Result<()> {
        self.start_time.validate()?;
        self.duration.validate()?;
        if self.duration.is_negative() {
            return Err(TimeError::NegativeDuration {
                value: self.duration.value,
                rate: self.duration.rate,
            });
        }
        Ok(())
    }

    /// Rate of the wider representation in this range.
    pub fn rate(&self) -> f64 {
        rate_for_range(self)
    }

    /// First instant after the range.
    pub fn end_time_exclusive(&self) -> Result<RationalTime> {
        self.start_time.checked_add(&self.duration)
    }

    /// Last whole unit inside the range, or the start for an empty range.
    pub fn end_time_inclusive(&self) -> Result<RationalTime> {
        let end = self.end_time_exclusive()?;
        if self.duration.value <= 0.0 {
            return Ok(self.start_time);
        }
        end.checked_sub(&RationalTime::new(1.0, self.duration.rate))
    }

    /// Check if `time` falls inside `[start, end)`.
    pub fn contains(&self, time: &RationalTime) -> Result<bool> {
        let end = self.end_time_exclusive()?;
        Ok(self.start_time.cmp_time(time)? != Ordering::Greater
            && time.cmp_time(&end)? == Ordering::Less)
    }

    /// Check if `other` lies completely inside this range.
    pub fn contains_range(&self, other: &TimeRange) -> Result<bool> {
        let end = self.end_time_exclusive()?;
        let other_end = other.end_time_exclusive()?;
        Ok(self.start_time.cmp_time(&other.start_time)? != Ordering::Greater
            && other_end.cmp_time(&end)? != Ordering::Greater)
    }

    /// Check if the two ranges share any instant.
    pub fn overlaps(&self, other: &TimeRange) -> Result<bool> {
        let end = self.end_time_exclusive()?;
        let other_end = other.end_time_exclusive()?;
        Ok(self.start_time.cmp_time(&other_end)? == Ordering::Less
            && other.start_time.cmp_time(&end)? == Ordering::Less)
    }

    /// Smallest range covering both ranges.
    pub fn extended_by(&self, other: &TimeRange) -> Result<TimeRange> {
        let start = min_time(self.start_time, other.start_time)?;
        let end = max_time(self.end_time_exclusive()?, other.end_time_exclusive()?)?;
        TimeRange::from_start_end(start, end)
    }

    /// This range clamped to `bounds`; empty at the nearest edge when disjoint.
    pub fn clamped(&self, bounds: &TimeRange) -> Result<TimeRange> {
        let bounds_end = bounds.end_time_exclusive()?;
        let start = min_time(max_time(self.start_time, bounds.start_time)?, bounds_end)?;
        let end = max_time(min_time(self.end_time_exclusive()?, bounds_end)?, start)?;
        TimeRange::from_start_end(start, end)
    }

    /// Shift the start of the range by `offset`.
    pub fn shifted_by(&self, offset: &RationalTime) -> Result<TimeRange> {
        Ok(TimeRange::new(self.start_time.checked_add(offset)?, self.duration))
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} +{}]", self.start_time, self.duration)
    }
}

/// The rate governing a range: the finer of its start and duration rates.
pub fn rate_for_range(range: &TimeRange) -> f64 {
    range.start_time.rate.max(range.duration.rate)
}

fn min_time(a: RationalTime, b: RationalTime) -> Result<RationalTime> {
    Ok(if a.cmp_time(&b)? == Ordering::Greater { b } else { a })
}

fn max_time(a: RationalTime, b: RationalTime) -> Result<RationalTime> {
    Ok(if a.cmp_time(&b)? == Ordering::Less { b } else { a })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rt(value: f64, rate: f64) -> RationalTime {
        RationalTime::new(value, rate)
    }

    #[test]
    fn test_equality_across_rates() {
        assert_eq!(rt(24.0, 24.0), rt(30.0, 30.0));
        assert_eq!(rt(100.0, 24.0), rt(125.0, 30.0));
        assert_ne!(rt(100.0, 24.0), rt(100.0, 30.0));
    }

    #[test]
    fn test_ntsc_comparison_is_exact() {
        let ntsc = FrameRate::NTSC_30.to_f64();
        // 30000 frames at 29.97 is exactly 1001 seconds.
        assert_eq!(rt(30000.0, ntsc), rt(24024.0, 24.0));
        assert!(rt(30000.0, ntsc) < rt(24025.0, 24.0));
        assert!(rt(30001.0, ntsc) > rt(24024.0, 24.0));
    }

    #[test]
    fn test_ntsc_to_frames_is_exact() {
        let ntsc = FrameRate::NTSC_30.to_f64();
        assert_eq!(rt(30000.0, ntsc).to_frames(24.0).unwrap(), 24024);
        assert_eq!(rt(24024.0, 24.0).to_frames(ntsc).unwrap(), 30000);
        // Fractional values take the floating-point path.
        assert_eq!(rt(0.5, 24.0).to_frames(48.0).unwrap(), 1);
    }

    #[test]
    fn test_add_same_rate_keeps_rate() {
        let sum = rt(13.0, 30.0) + rt(100.0, 30.0);
        assert_eq!(sum.value, 113.0);
        assert_eq!(sum.rate, 30.0);
    }

    #[test]
    fn test_add_mixed_rates_uses_finer_rate() {
        let sum = rt(24.0, 24.0) + rt(15.0, 30.0);
        assert_eq!(sum.rate, 30.0);
        assert_eq!(sum.value, 45.0);
        assert_eq!(sum, rt(1.5, 1.0));
    }

    #[test]
    fn test_fractional_remainder_survives_repeated_ops() {
        let mut total = rt(0.0, 30.0);
        for _ in 0..3 {
            total = total + rt(1.0, 24.0);
        }
        // 3 frames at 24 is exactly 3.75 frames at 30
        assert_eq!(total.value, 3.75);
        assert_eq!(total, rt(3.0, 24.0));
    }

    #[test]
    fn test_subtract() {
        let diff = rt(956.0, 30.0) - rt(124.0, 30.0);
        assert_eq!(diff, rt(832.0, 30.0));
    }

    #[test]
    fn test_rescale_exact_multiple() {
        let t = rt(7.0, 24.0).rescaled_to(48.0).unwrap();
        assert_eq!(t.value, 14.0);
        assert_eq!(t.rate, 48.0);
    }

    #[test]
    fn test_rescale_rejects_zero_rate() {
        assert_eq!(
            rt(10.0, 24.0).rescaled_to(0.0),
            Err(TimeError::InvalidRate { rate: 0.0 })
        );
        assert!(rt(10.0, 0.0).rescaled_to(24.0).is_err());
        assert!(rt(10.0, 0.0).checked_add(&rt(1.0, 24.0)).is_err());
    }

    #[test]
    #[should_panic(expected = "cannot add")]
    fn test_add_operator_panics_on_zero_rate() {
        let _ = rt(1.0, 0.0) + rt(1.0, 24.0);
    }

    #[test]
    fn test_to_frames_rounds_half_away_from_zero() {
        assert_eq!(rt(1.0, 48.0).to_frames(24.0).unwrap(), 1);
        assert_eq!(rt(1.0, 60.0).to_frames(24.0).unwrap(), 0);
        assert_eq!(rt(-1.0, 48.0).to_frames(24.0).unwrap(), -1);
    }

    #[test]
    fn test_ordering() {
        assert!(rt(1.0, 24.0) < rt(2.0, 30.0));
        assert!(rt(13.0, 24.0) > rt(13.0, 30.0));
        assert_eq!(rt(1.0, 0.0).partial_cmp(&rt(1.0, 24.0)), None);
    }

    #[test]
    fn test_range_end_times() {
        let range = TimeRange::new(rt(10.0, 24.0), rt(5.0, 24.0));
        assert_eq!(range.end_time_exclusive().unwrap(), rt(15.0, 24.0));
        assert_eq!(range.end_time_inclusive().unwrap(), rt(14.0, 24.0));
        let empty = TimeRange::new(rt(10.0, 24.0), rt(0.0, 24.0));
        assert_eq!(empty.end_time_inclusive().unwrap(), rt(10.0, 24.0));
    }

    #[test]
    fn test_range_rejects_negative_duration() {
        let err = TimeRange::try_new(rt(0.0, 24.0), rt(-1.0, 24.0)).unwrap_err();
        assert!(matches!(err, TimeError::NegativeDuration { .. }));
    }

    #[test]
    fn test_range_contains_and_overlaps() {
        let a = TimeRange::new(rt(0.0, 24.0), rt(24.0, 24.0));
        let b = TimeRange::new(rt(30.0, 30.0), rt(30.0, 30.0));
        assert!(a.contains(&rt(23.0, 24.0)).unwrap());
        assert!(!a.contains(&rt(24.0, 24.0)).unwrap());
        assert!(!a.overlaps(&b).unwrap());
        let c = TimeRange::new(rt(12.0, 24.0), rt(24.0, 24.0));
        assert!(a.overlaps(&c).unwrap());
        assert!(a.contains_range(&TimeRange::new(rt(1.0, 24.0), rt(2.0, 24.0))).unwrap());
    }

    #[test]
    fn test_range_extend_and_clamp() {
        let a = TimeRange::new(rt(0.0, 24.0), rt(24.0, 24.0));
        let b = TimeRange::new(rt(48.0, 24.0), rt(24.0, 24.0));
        let both = a.extended_by(&b).unwrap();
        assert_eq!(both.start_time, rt(0.0, 24.0));
        assert_eq!(both.duration, rt(72.0, 24.0));

        let wide = TimeRange::new(rt(-10.0, 24.0), rt(100.0, 24.0));
        let clamped = wide.clamped(&a).unwrap();
        assert_eq!(clamped, a);

        let disjoint = b.clamped(&a).unwrap();
        assert_eq!(disjoint.start_time, rt(24.0, 24.0));
        assert!(disjoint.duration.is_zero());
    }

    #[test]
    fn test_rate_for_range() {
        let range = TimeRange::new(rt(0.0, 24.0), rt(10.0, 48.0));
        assert_eq!(rate_for_range(&range), 48.0);
        assert_eq!(range.rate(), 48.0);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&rt(73.0, 30.0)).unwrap();
        assert_eq!(json, r#"{"value":73.0,"rate":30.0}"#);
    }
}
