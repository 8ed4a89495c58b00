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

//! Lot Ledger
//!
//! A per-asset FIFO queue of unconsumed purchase lots. Each sale consumes
//! from the head of the queue; a lot may be consumed across several sales
//! but each unit of purchased quantity funds exactly one unit of a sale.
//!
//! Ledgers are owned by a single calculation and discarded with it; there
//! is no shared or global lot state.
//!

use crate::transaction::{Transaction, TransactionType};
use crate::units::{Amount, Asset, Price, UtcTime};
use log::debug;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// An unconsumed (or partially consumed) purchase of an asset
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Lot {
    asset: Asset,
    remaining: Amount,
    unit_cost: Price,
    acquired_at: UtcTime,
}

impl fmt::Display for Lot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} at {} acquired {}",
            self.remaining, self.asset, self.unit_cost, self.acquired_at,
        )
    }
}

impl Lot {
    /// Constructs a lot from a BUY transaction
    ///
    /// # Panics
    ///
    /// Panics if the transaction is not a well-formed BUY; the normalizer
    /// must have run before lots are created.
    pub fn from_buy(tx: &Transaction) -> Lot {
        assert_eq!(tx.ty, TransactionType::Buy, "lots come from BUYs only");
        assert!(tx.amount.is_positive(), "malformed BUY reached the ledger");
        Lot {
            asset: tx
                .canonical_asset()
                .expect("malformed BUY reached the ledger"),
            remaining: tx.amount,
            unit_cost: tx.price,
            acquired_at: tx.timestamp,
        }
    }

    /// Accessor for the still-unconsumed quantity
    pub fn remaining(&self) -> Amount {
        self.remaining
    }

    /// Accessor for the per-unit acquisition cost
    pub fn unit_cost(&self) -> Price {
        self.unit_cost
    }

    /// Accessor for the acquisition time
    pub fn acquired_at(&self) -> UtcTime {
        self.acquired_at
    }
}

/// A slice of a lot taken by one sale
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Consumption {
    pub acquired_at: UtcTime,
    pub amount: Amount,
    pub unit_cost: Price,
}

impl Consumption {
    /// The cost basis contributed by this slice
    pub fn cost_basis(&self) -> Price {
        self.unit_cost * self.amount
    }
}

/// FIFO queue of unconsumed lots for one asset, oldest first
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LotLedger {
    asset: Asset,
    lots: VecDeque<Lot>,
}

impl LotLedger {
    /// Constructs an empty ledger for one asset
    pub fn new(asset: Asset) -> Self {
        LotLedger {
            asset,
            lots: VecDeque::new(),
        }
    }

    /// Accessor for the ledger's asset
    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    /// Appends a lot to the tail of the queue
    ///
    /// # Panics
    ///
    /// Panics if the lot belongs to a different asset's ledger; mixing
    /// assets in one queue would corrupt every figure downstream.
    pub fn push(&mut self, lot: Lot) {
        assert_eq!(
            lot.asset, self.asset,
            "lot pushed onto the wrong asset's ledger",
        );
        debug!("[{}] new lot: {}", self.asset, lot);
        self.lots.push_back(lot);
    }

    /// Total still-unconsumed quantity across all lots
    pub fn remaining_total(&self) -> Amount {
        self.lots.iter().map(|lot| lot.remaining).sum()
    }

    /// Whether the ledger holds no unconsumed lots
    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    /// Consumes `amount` from the head of the queue
    ///
    /// Head lots are consumed fully (and popped) until the request is
    /// covered; a lot larger than the remaining request is decremented in
    /// place and stays at the head. Returns the consumed slices in
    /// consumption order, plus the shortfall: the portion of the request
    /// that no lot could cover because the queue emptied first.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is not strictly positive. A non-positive request
    /// can only come from a bug upstream, never from dirty user data, so
    /// it is treated as internal corruption rather than an error value.
    pub fn consume(&mut self, amount: Amount) -> (Vec<Consumption>, Amount) {
        assert!(
            amount.is_positive(),
            "[{}] tried to consume non-positive quantity {}",
            self.asset,
            amount,
        );

        let mut consumed = Vec::new();
        let mut remainder = amount;
        while remainder.is_positive() {
            let head = match self.lots.front_mut() {
                Some(head) => head,
                None => {
                    debug!(
                        "[{}] queue empty with {} of {} unmatched",
                        self.asset, remainder, amount,
                    );
                    break;
                }
            };

            if head.remaining <= remainder {
                // Full consumption; pop the lot, never to be resurrected
                let lot = self
                    .lots
                    .pop_front()
                    .expect("head lot vanished mid-consumption");
                debug!("[{}] fully consuming lot: {}", self.asset, lot);
                remainder -= lot.remaining;
                consumed.push(Consumption {
                    acquired_at: lot.acquired_at,
                    amount: lot.remaining,
                    unit_cost: lot.unit_cost,
                });
            } else {
                // Partial consumption; the head shrinks and stays
                head.remaining -= remainder;
                debug!(
                    "[{}] partially consuming {} from lot: {}",
                    self.asset, remainder, head,
                );
                consumed.push(Consumption {
                    acquired_at: head.acquired_at,
                    amount: remainder,
                    unit_cost: head.unit_cost,
                });
                remainder = Amount::ZERO;
            }
        }
        (consumed, remainder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{amount, price};

    fn buy(amount: Amount, unit_cost: Price, t: i64) -> Lot {
        Lot {
            asset: "BTC".parse().unwrap(),
            remaining: amount,
            unit_cost,
            acquired_at: UtcTime::from_unix_i64(t).unwrap(),
        }
    }

    fn ledger_with(lots: Vec<Lot>) -> LotLedger {
        let mut ledger = LotLedger::new("BTC".parse().unwrap());
        for lot in lots {
            ledger.push(lot);
        }
        ledger
    }

    #[test]
    fn consume_spans_lots_in_fifo_order() {
        // B1(qty 5 @ 20), B2(qty 5 @ 40); selling 7 must exhaust B1 before
        // touching B2
        let mut ledger = ledger_with(vec![
            buy(amount!(5), price!(20), 1),
            buy(amount!(5), price!(40), 2),
        ]);

        let (consumed, shortfall) = ledger.consume(amount!(7));
        assert!(shortfall.is_zero());
        assert_eq!(consumed.len(), 2);
        assert_eq!(consumed[0].amount, amount!(5));
        assert_eq!(consumed[0].unit_cost, price!(20));
        assert_eq!(consumed[1].amount, amount!(2));
        assert_eq!(consumed[1].unit_cost, price!(40));
        let basis: Price = consumed.iter().map(Consumption::cost_basis).sum();
        assert_eq!(basis, price!(180));
        assert_eq!(ledger.remaining_total(), amount!(3));
    }

    #[test]
    fn no_double_counting_across_sales() {
        // two sales of 3 against B1(qty 5) + B2(qty 5): the second sale
        // draws 2 from B1's remainder and 1 from B2, never re-reading B1's
        // original 5
        let mut ledger = ledger_with(vec![
            buy(amount!(5), price!(10), 1),
            buy(amount!(5), price!(30), 2),
        ]);

        let (first, shortfall) = ledger.consume(amount!(3));
        assert!(shortfall.is_zero());
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].amount, amount!(3));
        assert_eq!(first[0].unit_cost, price!(10));

        let (second, shortfall) = ledger.consume(amount!(3));
        assert!(shortfall.is_zero());
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].amount, amount!(2));
        assert_eq!(second[0].unit_cost, price!(10));
        assert_eq!(second[1].amount, amount!(1));
        assert_eq!(second[1].unit_cost, price!(30));

        assert_eq!(ledger.remaining_total(), amount!(4));
    }

    #[test]
    fn exact_consumption_pops_the_lot() {
        let mut ledger = ledger_with(vec![buy(amount!(2), price!(50), 1)]);
        let (consumed, shortfall) = ledger.consume(amount!(2));
        assert_eq!(consumed.len(), 1);
        assert!(shortfall.is_zero());
        assert!(ledger.is_empty());
    }

    #[test]
    fn shortfall_when_queue_empties() {
        let mut ledger = ledger_with(vec![buy(amount!(1), price!(100), 1)]);
        let (consumed, shortfall) = ledger.consume(amount!(4));
        assert_eq!(consumed.len(), 1);
        assert_eq!(consumed[0].amount, amount!(1));
        assert_eq!(shortfall, amount!(3));
        assert!(ledger.is_empty());

        // nothing at all to match
        let (consumed, shortfall) = ledger.consume(amount!(2));
        assert!(consumed.is_empty());
        assert_eq!(shortfall, amount!(2));
    }

    #[test]
    fn quantity_conservation() {
        let mut ledger = ledger_with(vec![
            buy(amount!(5), price!(10), 1),
            buy(amount!(3), price!(20), 2),
            buy(amount!(2), price!(30), 3),
        ]);
        let bought = amount!(10);

        let mut consumed_total = Amount::ZERO;
        let mut shortfall_total = Amount::ZERO;
        for request in [amount!(4), amount!(4), amount!(4)] {
            let (consumed, shortfall) = ledger.consume(request);
            let sale_total: Amount = consumed.iter().map(|c| c.amount).sum();
            consumed_total += sale_total;
            shortfall_total += shortfall;
        }
        assert_eq!(consumed_total + ledger.remaining_total(), bought);
        assert_eq!(shortfall_total, amount!(2));
    }

    #[test]
    #[should_panic(expected = "non-positive quantity")]
    fn non_positive_consume_is_fatal() {
        let mut ledger = ledger_with(vec![buy(amount!(1), price!(1), 1)]);
        ledger.consume(Amount::ZERO);
    }
}
