//! # Money Module
//!
//! Provides the `Money` type used for visit costs and the per-minute rate.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Billing is minutes × rate, summed over every finished visit.           │
//! │                                                                         │
//! │  With f64:   0.1 + 0.2 = 0.30000000000000004   (totals drift)           │
//! │  With cents: 10 + 20 = 30                      (totals are exact)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tablemeter_core::money::Money;
//!
//! let rate = Money::from_major_minor(5, 0);     // 5.00 per minute
//! let cost = rate.checked_times(2);             // 2 whole minutes
//! assert_eq!(cost, Some(Money::from_cents(1000)));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// A monetary value in the smallest currency unit (cents).
///
/// Signed so `from_major_minor` can express negative amounts, although visit
/// costs themselves are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use tablemeter_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies by a whole count (minutes, for visit billing).
    ///
    /// Returns `None` if the product does not fit in an `i64` of cents.
    ///
    /// ```rust
    /// use tablemeter_core::money::Money;
    ///
    /// let rate = Money::from_cents(500);
    /// assert_eq!(rate.checked_times(3), Some(Money::from_cents(1500)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_times(2), None);
    /// ```
    #[inline]
    pub const fn checked_times(&self, count: i64) -> Option<Self> {
        match self.0.checked_mul(count) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

/// Debug-oriented display without a currency symbol; locale formatting is
/// left to whoever presents the figure.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
