// Crypto Tax Engine
// Written in 2025 by
//   The cryptotax Developers
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the CC0 Public Domain Dedication
// along with this software.
// If not, see <http://creativecommons.org/publicdomain/zero/1.0/>.
//

//! Price
//!
//! Monetary amounts in the reporting currency. All monetary arithmetic in
//! the engine happens on this type at full decimal precision; rounding to
//! two places happens only at output boundaries via [Price::round2].
//!

use crate::units::Amount;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::{cmp, fmt, iter, ops, str};

/// A monetary amount, in units of the reporting currency
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Deserialize, Serialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero money
    pub const ZERO: Price = Price(Decimal::ZERO);

    /// Whether this is a strictly positive amount
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Whether this amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The larger of two prices
    pub fn max(self, other: Price) -> Price {
        cmp::max(self, other)
    }

    /// The smaller of two prices
    pub fn min(self, other: Price) -> Price {
        cmp::min(self, other)
    }

    /// Rounds to two decimal places, half-up
    ///
    /// This is the output-boundary rule; intermediate figures are never
    /// rounded, to avoid cumulative drift across many small transactions.
    pub fn round2(self) -> Price {
        Price(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Accessor for the underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Price {
        Price(d)
    }
}

impl str::FromStr for Price {
    type Err = rust_decimal::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        str::FromStr::from_str(s).map(Price)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut copy = self.round2().0;
        copy.rescale(2);
        fmt::Display::fmt(&copy, f)
    }
}

impl ops::Add for Price {
    type Output = Price;
    fn add(self, other: Price) -> Price {
        Price(self.0 + other.0)
    }
}

impl ops::Sub for Price {
    type Output = Price;
    fn sub(self, other: Price) -> Price {
        Price(self.0 - other.0)
    }
}

impl ops::AddAssign for Price {
    fn add_assign(&mut self, other: Price) {
        self.0 += other.0;
    }
}

impl ops::SubAssign for Price {
    fn sub_assign(&mut self, other: Price) {
        self.0 -= other.0;
    }
}

/// Unit cost times quantity, i.e. the cost basis of a partial lot
impl ops::Mul<Amount> for Price {
    type Output = Price;
    fn mul(self, qty: Amount) -> Price {
        Price(self.0 * qty.as_decimal())
    }
}

impl ops::Mul<Decimal> for Price {
    type Output = Price;
    fn mul(self, rate: Decimal) -> Price {
        Price(self.0 * rate)
    }
}

impl iter::Sum for Price {
    fn sum<I>(iter: I) -> Self
    where
        I: Iterator<Item = Self>,
    {
        iter.fold(Price::ZERO, |acc, n| acc + n)
    }
}

/// Construct a price from a decimal expression, e.g. price!(100.00) or price!(123)
#[macro_export]
macro_rules! price {
    ($num:expr) => {
        $num.to_string().parse::<$crate::units::Price>().unwrap()
    };
}
