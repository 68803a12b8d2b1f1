// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul},
};

/// Cost charged to a request that was served outside its preferred zone.
///
/// Always finite and non-negative.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Penalty(f64);

impl Penalty {
    pub const ZERO: Penalty = Penalty(0.0);

    /// Creates a penalty, clamping negative and non-finite inputs to zero.
    #[inline]
    pub fn new(value: f64) -> Self {
        if value.is_finite() && value > 0.0 {
            Penalty(value)
        } else {
            Penalty(0.0)
        }
    }

    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// `base × multiplier × factor`, the shape every cross-zone tier uses.
    #[inline]
    pub fn scaled(base: Penalty, multiplier: PenaltyMultiplier, factor: f64) -> Self {
        Penalty::new(base.0 * multiplier.value() * factor)
    }

    /// Compares within `eps`; penalties are products of decimal multipliers.
    #[inline]
    pub fn approx_eq(self, other: Penalty, eps: f64) -> bool {
        (self.0 - other.0).abs() <= eps
    }
}

impl Display for Penalty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Penalty {
    type Output = Penalty;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Penalty::new(self.0 + rhs.0)
    }
}

impl AddAssign for Penalty {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul<f64> for Penalty {
    type Output = Penalty;

    #[inline]
    fn mul(self, rhs: f64) -> Self::Output {
        Penalty::new(self.0 * rhs)
    }
}

impl Zero for Penalty {
    #[inline]
    fn zero() -> Self {
        Penalty::ZERO
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl Sum for Penalty {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Penalty::zero(), |acc, p| acc + p)
    }
}

impl<'a> Sum<&'a Penalty> for Penalty {
    fn sum<I: Iterator<Item = &'a Penalty>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidPenaltyMultiplierError {
    value: f64,
}

impl InvalidPenaltyMultiplierError {
    #[inline]
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl Display for InvalidPenaltyMultiplierError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Penalty multiplier {} must be a finite number >= 1.0",
            self.value
        )
    }
}

impl std::error::Error for InvalidPenaltyMultiplierError {}

/// Per-zone factor applied on top of the base penalty. Never below `1.0`.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct PenaltyMultiplier(f64);

impl PenaltyMultiplier {
    pub const ONE: PenaltyMultiplier = PenaltyMultiplier(1.0);

    #[inline]
    pub fn new(value: f64) -> Result<Self, InvalidPenaltyMultiplierError> {
        if value.is_finite() && value >= 1.0 {
            Ok(PenaltyMultiplier(value))
        } else {
            Err(InvalidPenaltyMultiplierError::new(value))
        }
    }

    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Default for PenaltyMultiplier {
    fn default() -> Self {
        PenaltyMultiplier(1.5)
    }
}

impl Display for PenaltyMultiplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl TryFrom<f64> for PenaltyMultiplier {
    type Error = InvalidPenaltyMultiplierError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        PenaltyMultiplier::new(value)
    }
}

impl From<PenaltyMultiplier> for f64 {
    fn from(value: PenaltyMultiplier) -> Self {
        value.0
    }
}
