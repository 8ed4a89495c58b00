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

//! Amount
//!
//! Asset quantities. Distinct from [crate::units::Price] so that money and
//! coin counts cannot be mixed up in the matching arithmetic.
//!

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{cmp, fmt, iter, ops, str};

/// A quantity of some asset
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Deserialize, Serialize,
)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Zero quantity
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Whether this is a strictly positive quantity
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Whether this quantity is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The smaller of two quantities
    pub fn min(self, other: Amount) -> Amount {
        cmp::min(self, other)
    }

    /// Accessor for the underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Amount {
    fn from(d: Decimal) -> Amount {
        Amount(d)
    }
}

impl str::FromStr for Amount {
    type Err = rust_decimal::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        str::FromStr::from_str(s).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0.normalize(), f)
    }
}

impl ops::Add for Amount {
    type Output = Amount;
    fn add(self, other: Amount) -> Amount {
        Amount(self.0 + other.0)
    }
}

impl ops::Sub for Amount {
    type Output = Amount;
    fn sub(self, other: Amount) -> Amount {
        Amount(self.0 - other.0)
    }
}

impl ops::AddAssign for Amount {
    fn add_assign(&mut self, other: Amount) {
        self.0 += other.0;
    }
}

impl ops::SubAssign for Amount {
    fn sub_assign(&mut self, other: Amount) {
        self.0 -= other.0;
    }
}

impl iter::Sum for Amount {
    fn sum<I>(iter: I) -> Self
    where
        I: Iterator<Item = Self>,
    {
        iter.fold(Amount::ZERO, |acc, n| acc + n)
    }
}

/// Construct an amount from a decimal expression, e.g. amount!(0.5) or amount!(7)
#[macro_export]
macro_rules! amount {
    ($num:expr) => {
        $num.to_string().parse::<$crate::units::Amount>().unwrap()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_from_str() {
        assert_eq!("7".parse(), Ok(Amount(Decimal::new(7, 0))));
        assert_eq!("0.00000001".parse(), Ok(Amount(Decimal::new(1, 8))));
        assert!("7 BTC".parse::<Amount>().is_err());
    }

    #[test]
    fn amount_ordering() {
        assert!(amount!(0.1).is_positive());
        assert!(!Amount::ZERO.is_positive());
        assert!(!amount!(-3).is_positive());
        assert_eq!(amount!(5).min(amount!(3)), amount!(3));
    }

    #[test]
    fn amount_sum() {
        let total: Amount = vec![amount!(1.5), amount!(2.5), amount!(3)].into_iter().sum();
        assert_eq!(total, amount!(7));
    }
}
