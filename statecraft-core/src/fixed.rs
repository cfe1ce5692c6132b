//! Fixed-point arithmetic for deterministic AI scoring.
//!
//! Every score, balance and weight the decision engine compares is a [`Fixed`].
//! Two runs over the same world must pick the same rival, the same technology and
//! the same factory, so floats never enter the comparison paths.

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// Fixed-point value with scale 10000 (0.25 → 2500, 1.0 → 10000).
///
/// Backed by `i64` so national treasuries and summed populations cannot overflow.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Fixed(pub i64);

impl Fixed {
    /// Scale factor: 10000 = 1.0
    pub const SCALE: i64 = 10000;

    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(10000);
    pub const HALF: Fixed = Fixed(5000);
    pub const TWO: Fixed = Fixed(20000);

    /// Smallest divisor accepted by [`Fixed::checked_ratio`] (0.001).
    pub const EPSILON: Fixed = Fixed(10);

    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Fixed(raw)
    }

    /// Create from integer (e.g., 5 → 50_000)
    #[inline]
    pub const fn from_int(v: i64) -> Self {
        Fixed(v * Self::SCALE)
    }

    /// Create from a ratio of integers, rounding toward zero (3/4 → 0.75).
    #[inline]
    pub const fn from_ratio(num: i64, den: i64) -> Self {
        if den == 0 {
            return Fixed::ZERO;
        }
        Fixed(num * Self::SCALE / den)
    }

    /// Convert from f32 (config and scenario layer only, not in decision logic).
    ///
    /// Uses `.round()` for cross-platform determinism. NaN/Inf map to zero,
    /// overflow saturates.
    #[inline]
    pub fn from_f32(v: f32) -> Self {
        if !v.is_finite() {
            return Fixed::ZERO;
        }
        let scaled = v as f64 * Self::SCALE as f64;
        if scaled >= i64::MAX as f64 {
            return Fixed(i64::MAX);
        }
        if scaled <= i64::MIN as f64 {
            return Fixed(i64::MIN);
        }
        Fixed(scaled.round() as i64)
    }

    /// Convert to f32 (display only)
    #[inline]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / Self::SCALE as f32
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Truncate to integer (rounds toward zero)
    #[inline]
    pub const fn to_int(self) -> i64 {
        self.0 / Self::SCALE
    }

    #[inline]
    pub fn min(self, other: Fixed) -> Fixed {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    #[inline]
    pub fn max(self, other: Fixed) -> Fixed {
        if self.0 >= other.0 {
            self
        } else {
            other
        }
    }

    #[inline]
    pub fn clamp(self, lo: Fixed, hi: Fixed) -> Fixed {
        self.max(lo).min(hi)
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub fn saturating_add(self, other: Fixed) -> Fixed {
        Fixed(self.0.saturating_add(other.0))
    }

    #[inline]
    pub fn saturating_sub(self, other: Fixed) -> Fixed {
        Fixed(self.0.saturating_sub(other.0))
    }

    /// `self / divisor`, or `None` when the divisor is zero or below [`Fixed::EPSILON`].
    ///
    /// Demographic fractions and cost ratios go through this so an empty state
    /// or a free technology is skipped instead of scored.
    #[inline]
    pub fn checked_ratio(self, divisor: Fixed) -> Option<Fixed> {
        if divisor.0.abs() < Self::EPSILON.0 {
            None
        } else {
            Some(self / divisor)
        }
    }
}

impl Add for Fixed {
    type Output = Fixed;
    #[inline]
    fn add(self, other: Fixed) -> Fixed {
        Fixed(self.0 + other.0)
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, other: Fixed) {
        self.0 += other.0;
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    #[inline]
    fn sub(self, other: Fixed) -> Fixed {
        Fixed(self.0 - other.0)
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, other: Fixed) {
        self.0 -= other.0;
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    #[inline]
    fn neg(self) -> Fixed {
        Fixed(-self.0)
    }
}

impl Mul for Fixed {
    type Output = Fixed;
    #[inline]
    fn mul(self, other: Fixed) -> Fixed {
        Fixed((self.0 as i128 * other.0 as i128 / Fixed::SCALE as i128) as i64)
    }
}

impl MulAssign for Fixed {
    #[inline]
    fn mul_assign(&mut self, other: Fixed) {
        *self = *self * other;
    }
}

impl Div for Fixed {
    type Output = Fixed;
    /// Division by zero yields zero.
    #[inline]
    fn div(self, other: Fixed) -> Fixed {
        if other.0 == 0 {
            return Fixed::ZERO;
        }
        Fixed((self.0 as i128 * Fixed::SCALE as i128 / other.0 as i128) as i64)
    }
}

impl Sum for Fixed {
    fn sum<I: Iterator<Item = Fixed>>(iter: I) -> Fixed {
        iter.fold(Fixed::ZERO, |acc, v| acc + v)
    }
}

impl std::fmt::Debug for Fixed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fixed({} = {})", self.0, self.to_f32())
    }
}

impl std::fmt::Display for Fixed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}", self.to_f32())
    }
}
