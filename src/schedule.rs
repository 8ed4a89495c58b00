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

//! Tax Schedules
//!
//! Per-country bracket rules mapping taxable profit to a tax amount.
//!
//! Country codes are parsed into the closed [Country] enumeration exactly
//! once, at the boundary; the bracket logic never re-parses strings.
//! Adding a country means adding one case here; existing cases are never
//! altered, since historical calculations must stay reproducible for the
//! same input/country pair.
//!

use crate::units::Price;
use rust_decimal::Decimal;
use serde::Serialize;
use std::{fmt, str};

/// The base tax rate shared by every schedule (13%)
const RATE_BASE: Decimal = Decimal::from_parts(13, 0, 0, false, 2);
/// Russia's upper-bracket rate (15%)
const RATE_RU_UPPER: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// A country with a known tax schedule
///
/// Unknown country codes resolve to [Country::Other] rather than being
/// rejected; a permissive default suited to a demo system.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Country {
    Russia,
    Belarus,
    Other,
}

impl Country {
    /// Resolves a raw country code; accepts full names and short codes
    /// case-insensitively, mapping anything unknown to `Other`
    pub fn from_code(code: &str) -> Country {
        match code.trim().to_ascii_uppercase().as_str() {
            "RUSSIA" | "RU" => Country::Russia,
            "BELARUS" | "BY" => Country::Belarus,
            _ => Country::Other,
        }
    }

    /// The reporting currency for results computed under this schedule
    pub fn currency(&self) -> &'static str {
        match self {
            Country::Russia => "RUB",
            Country::Belarus => "BYN",
            Country::Other => "RUB",
        }
    }
}

impl str::FromStr for Country {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Country::from_code(s))
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Country::Russia => f.write_str("RUSSIA"),
            Country::Belarus => f.write_str("BELARUS"),
            Country::Other => f.write_str("OTHER"),
        }
    }
}

/// Computes the tax owed on a taxable profit under a country's schedule
///
/// - RUSSIA: progressive; 13% on the portion up to 2,400,000 currency
///   units, 15% on the portion above.
/// - BELARUS: flat 13% after a 10,000-unit tax-free allowance.
/// - OTHER: flat 13% on the full profit.
///
/// Non-positive profit always owes zero.
pub fn resolve_tax(profit: Price, country: Country) -> Price {
    if !profit.is_positive() {
        return Price::ZERO;
    }
    match country {
        Country::Russia => {
            let threshold = Price::from(Decimal::new(2_400_000, 0));
            let lower = profit.min(threshold);
            let upper = Price::ZERO.max(profit - threshold);
            lower * RATE_BASE + upper * RATE_RU_UPPER
        }
        Country::Belarus => {
            let allowance = Price::from(Decimal::new(10_000, 0));
            Price::ZERO.max(profit - allowance) * RATE_BASE
        }
        Country::Other => profit * RATE_BASE,
    }
}
