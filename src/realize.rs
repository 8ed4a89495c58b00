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

//! Realization Matching
//!
//! Walks an asset's sales in time order, consuming purchase lots from the
//! ledger and recording one realization event per sale: which lots funded
//! it, at what cost basis, and the resulting gain.
//!

use crate::csv::{self, PrintCsv};
use crate::ledger::{Consumption, LotLedger};
use crate::transaction::{Transaction, TransactionType};
use crate::units::{Amount, Asset, Price, UtcTime};
use log::{debug, warn};
use serde::Serialize;
use std::fmt;

/// The realized outcome of one sale transaction
///
/// A single sale may reference several matched lots when its quantity
/// spans multiple purchases. An event is emitted even when no lot could
/// be matched at all; in that case the cost basis is zero and the event
/// is flagged under-collateralized.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct RealizationEvent {
    pub asset: Asset,
    pub sale_date: UtcTime,
    pub sale_amount: Amount,
    /// Recorded sale total (not `price * amount`, to respect any slippage
    /// or rounding in the imported record)
    pub sale_revenue: Price,
    pub cost_basis: Price,
    pub fee: Price,
    /// Realized gain, floored at zero: losses are not carried
    pub profit: Price,
    /// Set when the sale could not be fully matched against purchased
    /// quantity; the unmatched remainder was disposed at zero cost basis
    pub under_collateralized: bool,
    pub matched_lots: Vec<Consumption>,
}

impl fmt::Display for RealizationEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "sale of {} {} on {}: revenue {}, basis {}, profit {}{}",
            self.sale_amount,
            self.asset,
            self.sale_date,
            self.sale_revenue,
            self.cost_basis,
            self.profit,
            if self.under_collateralized {
                " (under-collateralized)"
            } else {
                ""
            },
        )
    }
}

impl RealizationEvent {
    /// A copy with every monetary figure rounded to two places, half-up
    pub fn rounded(&self) -> RealizationEvent {
        RealizationEvent {
            sale_revenue: self.sale_revenue.round2(),
            cost_basis: self.cost_basis.round2(),
            fee: self.fee.round2(),
            profit: self.profit.round2(),
            ..self.clone()
        }
    }

    /// Constructs a CSV outputter for this event
    pub fn csv_printer(&self) -> csv::CsvPrinter<EventCsv> {
        csv::CsvPrinter(EventCsv { event: self })
    }
}

/// CSV printer for a realization event
pub struct EventCsv<'event> {
    event: &'event RealizationEvent,
}

impl<'event> PrintCsv for EventCsv<'event> {
    fn print(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let oldest_lot = self
            .event
            .matched_lots
            .first()
            .map(|lot| csv::DateTime(lot.acquired_at));
        let csv = (
            &self.event.asset,
            csv::DateTime(self.event.sale_date),
            self.event.sale_amount,
            self.event.sale_revenue.round2(),
            self.event.cost_basis.round2(),
            self.event.fee.round2(),
            self.event.profit.round2(),
            oldest_lot,
            self.event.matched_lots.len(),
            if self.event.under_collateralized {
                "UNDER-COLLATERALIZED"
            } else {
                ""
            },
        );
        csv.print(f)
    }
}

/// Matches an asset's sales against its purchase ledger
///
/// Sales must already be in ascending timestamp order (the normalizer
/// guarantees this). Emits one event per sale; never fails: a sale with
/// no matching purchases becomes a zero-cost-basis disposal, flagged for
/// downstream auditing.
pub fn realize_sales(
    asset: &Asset,
    sales: &[Transaction],
    ledger: &mut LotLedger,
) -> Vec<RealizationEvent> {
    assert_eq!(asset, ledger.asset(), "sales matched against wrong ledger");

    let mut events = Vec::with_capacity(sales.len());
    for sale in sales {
        assert_eq!(sale.ty, TransactionType::Sell, "non-sale in sales list");

        let (matched_lots, shortfall) = ledger.consume(sale.amount);
        let cost_basis: Price = matched_lots.iter().map(Consumption::cost_basis).sum();
        let revenue = sale.total;
        let profit = Price::ZERO.max(revenue - cost_basis - sale.fee);
        let under_collateralized = shortfall.is_positive();

        if under_collateralized {
            // Conservative default: the unmatched remainder is a disposal
            // with zero cost basis, which a reviewer must audit by hand.
            warn!(
                "[{}] sale of {} at {} exceeds purchased quantity by {}; \
                 unmatched portion gets zero cost basis",
                asset, sale.amount, sale.timestamp, shortfall,
            );
        }

        let event = RealizationEvent {
            asset: asset.clone(),
            sale_date: sale.timestamp,
            sale_amount: sale.amount,
            sale_revenue: revenue,
            cost_basis,
            fee: sale.fee,
            profit,
            under_collateralized,
            matched_lots,
        };
        debug!("[{}] realized: {}", asset, event);
        events.push(event);
    }
    events
}
