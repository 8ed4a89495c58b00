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

//! Assets
//!
//! Canonical asset labels. Imported records carry free-form asset strings;
//! once a record survives normalization its label is canonicalized into
//! this type (trimmed, upper-cased) so that "btc", " BTC " and "Btc" all
//! key the same ledger.
//!

use serde::Serialize;
use std::{fmt, str};

/// Error returned when an asset label is blank
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct BlankAsset;

impl fmt::Display for BlankAsset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("asset label is blank")
    }
}

impl std::error::Error for BlankAsset {}

/// A canonical asset label, e.g. `BTC`
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct Asset(String);

impl Asset {
    /// Whether a raw asset string would canonicalize to this asset
    pub fn matches(&self, raw: &str) -> bool {
        raw.trim().eq_ignore_ascii_case(&self.0)
    }

    /// Accessor for the canonical label
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl str::FromStr for Asset {
    type Err = BlankAsset;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let canon = s.trim();
        if canon.is_empty() {
            return Err(BlankAsset);
        }
        Ok(Asset(canon.to_ascii_uppercase()))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_canonicalization() {
        let btc: Asset = " btc ".parse().unwrap();
        assert_eq!(btc.as_str(), "BTC");
        assert_eq!(btc, "BTC".parse().unwrap());
        assert!(btc.matches("Btc"));
        assert!(btc.matches("  BTC"));
        assert!(!btc.matches("ETH"));
    }

    #[test]
    fn asset_blank_is_rejected() {
        assert_eq!("".parse::<Asset>(), Err(BlankAsset));
        assert_eq!("   ".parse::<Asset>(), Err(BlankAsset));
    }
}
