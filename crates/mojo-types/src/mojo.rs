//! The mojo currency type
//!
//! Mojo is the virtual currency of the credibility economy. Balances are
//! conceptually non-negative; the ledger enforces that invariant at every
//! mutation, so the type itself only carries the arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

/// An amount of mojo
///
/// A thin wrapper over `f64` (mojo amounts are fractional: odds-scaled
/// payouts rarely land on whole numbers). Displayed with two decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mojo(pub f64);

impl Mojo {
    /// Create a new amount
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// The zero amount
    pub fn zero() -> Self {
        Self(0.0)
    }

    /// Raw value
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Check if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Check if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0 > 0.0
    }

    /// Subtract, flooring at zero
    pub fn saturating_sub(&self, other: Mojo) -> Self {
        Self((self.0 - other.0).max(0.0))
    }

    /// Scale by a factor (used for odds-based payouts)
    pub fn scale(&self, factor: f64) -> Self {
        Self(self.0 * factor)
    }

    /// Approximate equality for settlement assertions (f64 rounding)
    pub fn approx_eq(&self, other: Mojo) -> bool {
        (self.0 - other.0).abs() < 1e-9
    }
}

impl Add for Mojo {
    type Output = Mojo;

    fn add(self, rhs: Mojo) -> Mojo {
        Mojo(self.0 + rhs.0)
    }
}

impl AddAssign for Mojo {
    fn add_assign(&mut self, rhs: Mojo) {
        self.0 += rhs.0;
    }
}

impl Sub for Mojo {
    type Output = Mojo;

    fn sub(self, rhs: Mojo) -> Mojo {
        Mojo(self.0 - rhs.0)
    }
}

impl Sum for Mojo {
    fn sum<I: Iterator<Item = Mojo>>(iter: I) -> Mojo {
        iter.fold(Mojo::zero(), |acc, m| acc + m)
    }
}

impl fmt::Display for Mojo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} mojo", self.0)
    }
}

impl From<f64> for Mojo {
    fn from(value: f64) -> Self {
        Self(value)
    }
}
