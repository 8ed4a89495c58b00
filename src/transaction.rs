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

//! Transactions
//!
//! The input data model: imported buy/sell/staking records, and the
//! normalizer that turns a dirty batch of them into a time-ordered stream
//! fit for FIFO matching.
//!

use crate::units::{Amount, Asset, Price, UtcTime};
use crate::TimeMap;
use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The economic nature of an imported record
///
/// Import pipelines produce more types than the engine distinguishes
/// (swaps, mining, P2P, ...); everything that is not a buy, sell or
/// staking event is lumped into `Other`, whose only effect on the
/// calculation is its fee.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Buy,
    Sell,
    Staking,
    #[serde(other)]
    Other,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransactionType::Buy => f.write_str("BUY"),
            TransactionType::Sell => f.write_str("SELL"),
            TransactionType::Staking => f.write_str("STAKING"),
            TransactionType::Other => f.write_str("OTHER"),
        }
    }
}

/// A single imported transaction record
///
/// These arrive from upstream import pipelines and may be dirty; nothing
/// is validated at deserialization time. The normalizer decides what is
/// usable.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct Transaction {
    /// Raw asset label as imported; may be blank on corrupt records
    pub asset: String,
    #[serde(rename = "type")]
    pub ty: TransactionType,
    /// Quantity of the asset bought, sold or earned
    pub amount: Amount,
    /// Unit price in the reporting currency
    pub price: Price,
    /// Recorded total of the trade; kept separate from `price * amount`
    /// to respect any slippage or rounding the importer recorded
    pub total: Price,
    /// Trade fee; missing on many imports, in which case it is zero
    #[serde(default)]
    pub fee: Price,
    pub timestamp: UtcTime,
}

impl Transaction {
    /// Whether the record is structurally usable for the calculation
    ///
    /// Corrupt records (blank asset, non-positive amount, price or total)
    /// are dropped, not corrected: a zero-total "trade" is import garbage,
    /// not a zero-value economic event.
    pub fn is_well_formed(&self) -> bool {
        !self.asset.trim().is_empty()
            && self.amount.is_positive()
            && self.price.is_positive()
            && self.total.is_positive()
    }

    /// The canonical asset label, if the record has one
    pub fn canonical_asset(&self) -> Option<Asset> {
        self.asset.parse().ok()
    }
}

/// An inclusive calendar-date range used to restrict a calculation
#[derive(Copy, Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Whether a timestamp's date falls within the range (inclusive)
    pub fn contains(&self, time: UtcTime) -> bool {
        let date = time.date();
        self.start <= date && date <= self.end
    }
}

/// Filters and time-orders a batch of imported transactions
///
/// Drops structurally corrupt records, optionally restricts to a single
/// asset (case-insensitively) and/or an inclusive date range, and returns
/// the survivors sorted ascending by timestamp with ties broken by input
/// order. An empty result is a valid outcome, never an error.
pub fn normalize(
    transactions: Vec<Transaction>,
    filter_asset: Option<&Asset>,
    date_range: Option<&DateRange>,
) -> Vec<Transaction> {
    let input_len = transactions.len();
    let mut ordered = TimeMap::new();
    for tx in transactions {
        if !tx.is_well_formed() {
            debug!(
                "normalize: dropping malformed record {} {} at {}",
                tx.ty, tx.asset, tx.timestamp
            );
            continue;
        }
        if let Some(asset) = filter_asset {
            if !asset.matches(&tx.asset) {
                continue;
            }
        }
        if let Some(range) = date_range {
            if !range.contains(tx.timestamp) {
                continue;
            }
        }
        ordered.insert(tx.timestamp, tx);
    }
    info!(
        "normalize: {} of {} records usable (asset filter: {}, date filter: {})",
        ordered.len(),
        input_len,
        filter_asset.map(|a| a.as_str()).unwrap_or("none"),
        if date_range.is_some() { "yes" } else { "no" },
    );
    ordered.into_iter().map(|(_, tx)| tx).collect()
}
