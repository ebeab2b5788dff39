//! Exact rational numbers for frame rates and rescaling.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Div;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimeError};

/// A rational number represented as a numerator and denominator.
///
/// Used for exact representation of frame rates such as 30000/1001.
/// Intermediate products are computed in `i128` and reduced before being
/// narrowed back, so chains of operations do not drift.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rational {
    /// Numerator
    pub num: i64,
    /// Denominator (always positive)
    pub den: i64,
}

impl Rational {
    /// Create a new rational number.
    ///
    /// # Panics
    ///
    /// Panics if denominator is zero.
    pub fn new(num: i64, den: i64) -> Self {
        assert!(den != 0, "Denominator cannot be zero");
        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        Self { num, den }
    }

    /// Create a rational from an integer.
    pub const fn from_int(n: i64) -> Self {
        Self { num: n, den: 1 }
    }

    /// Create a zero rational.
    pub const fn zero() -> Self {
        Self { num: 0, den: 1 }
    }

    /// Check if this rational is zero.
    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Reduce the rational to its simplest form.
    pub fn reduce(&self) -> Self {
        if self.num == 0 {
            return Self::zero();
        }
        let g = gcd(self.num.unsigned_abs() as u128, self.den.unsigned_abs() as u128) as i64;
        Self {
            num: self.num / g,
            den: self.den / g,
        }
    }

    /// Convert to f64.
    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Rescale an integer count expressed in units of `1/self` into units of
    /// `1/target`, rounding half away from zero.
    ///
    /// For frame rates this converts a frame count at one rate into the
    /// nearest frame count at another.
    pub fn rescale_rounded(&self, value: i64, target: Rational) -> Result<i64> {
        if self.is_zero() || target.is_zero() {
            return Err(TimeError::ZeroDenominator);
        }
        // value / self * target  =  value * self.den * target.num / (self.num * target.den)
        let num = value as i128 * self.den as i128 * target.num as i128;
        let den = self.num as i128 * target.den as i128;
        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        let quotient = num / den;
        let remainder = num % den;
        let rounded = if remainder.abs() * 2 >= den {
            quotient + num.signum()
        } else {
            quotient
        };
        i64::try_from(rounded).map_err(|_| TimeError::Overflow(format!("{value} rescaled")))
    }

    fn from_wide(num: i128, den: i128) -> Self {
        let g = gcd(num.unsigned_abs(), den.unsigned_abs()).max(1) as i128;
        let (num, den) = (num / g, den / g);
        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        Self {
            num: num as i64,
            den: den as i64,
        }
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({}/{})", self.num, self.den)
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.num as i128 * other.den as i128;
        let rhs = other.num as i128 * self.den as i128;
        lhs.cmp(&rhs)
    }
}

impl Div for Rational {
    type Output = Self;

    /// # Panics
    ///
    /// Panics if `rhs` is zero.
    fn div(self, rhs: Self) -> Self::Output {
        assert!(rhs.num != 0, "Cannot divide by zero");
        Self::from_wide(
            self.num as i128 * rhs.den as i128,
            self.den as i128 * rhs.num as i128,
        )
    }
}

/// Greatest common divisor (Euclid).
fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}
