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

//! Crypto Tax Engine
//!
//! FIFO cost-basis tax calculation for digital assets: given a batch of
//! buy/sell/staking records and a country code, reconstructs which
//! purchases funded each sale, computes realized gains, and applies the
//! country's progressive tax schedule.
//!
//! The engine is a pure function over an in-memory batch; fetching
//! transactions, persisting results and rendering reports are its
//! callers' business.
//!

pub mod csv;
pub mod engine;
pub mod ledger;
pub mod logger;
pub mod realize;
pub mod schedule;
pub mod timemap;
pub mod transaction;
pub mod units;

pub use engine::{calculate, Options, TaxResult};
pub use ledger::{Consumption, Lot, LotLedger};
pub use realize::RealizationEvent;
pub use schedule::{resolve_tax, Country};
pub use timemap::TimeMap;
pub use transaction::{normalize, DateRange, Transaction, TransactionType};
