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

//! Calculation Engine
//!
//! The one-way pipeline over an in-memory transaction batch: normalize,
//! build per-asset lot ledgers, match sales against them, aggregate, and
//! resolve the country tax schedule. The computation is synchronous,
//! side-effect-free and owns all of its state; concurrent calculations
//! for different users need no synchronization.
//!

use crate::ledger::{Lot, LotLedger};
use crate::realize::{realize_sales, RealizationEvent};
use crate::schedule::{resolve_tax, Country};
use crate::transaction::{normalize, DateRange, Transaction, TransactionType};
use crate::units::{Amount, Asset, Price};
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;

/// Parameters of one calculation
#[derive(Clone, Debug)]
pub struct Options {
    pub country: Country,
    /// Labels the output only; callers filter by date via `date_range`
    pub tax_year: i32,
    pub filter_asset: Option<Asset>,
    pub date_range: Option<DateRange>,
}

/// The complete result of one calculation
///
/// Constructed once per invocation and never mutated afterwards. All
/// monetary figures are kept at full precision; [TaxResult::rounded]
/// applies the two-decimal half-up output rule.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct TaxResult {
    pub tax_year: i32,
    pub country: Country,
    pub currency: &'static str,
    /// False when nothing survived normalization; distinguishes "zero tax
    /// owed" from "nothing to compute"
    pub has_data: bool,
    /// Number of records that survived normalization
    pub transaction_count: usize,
    /// Sum of sale revenues across all realization events
    pub total_income: Price,
    /// Sum of BUY totals plus all fees (buys, sells and others)
    pub total_expenses: Price,
    /// Fees alone, tracked separately even though they are folded into
    /// `total_expenses`
    pub total_fees: Price,
    /// The coarse figure: max(0, income - expenses). This is what drives
    /// `tax_amount`.
    pub taxable_profit: Price,
    /// Sum of per-sale profits, which nets cost basis per sale. Differs
    /// from `taxable_profit` when expenses include unmatched buys or
    /// non-sale fees; both figures are exposed because downstream report
    /// consumers historically read the coarse one.
    pub realized_profit: Price,
    pub tax_amount: Price,
    pub events: BTreeMap<Asset, Vec<RealizationEvent>>,
}

impl TaxResult {
    fn empty(opts: &Options) -> TaxResult {
        TaxResult {
            tax_year: opts.tax_year,
            country: opts.country,
            currency: opts.country.currency(),
            has_data: false,
            transaction_count: 0,
            total_income: Price::ZERO,
            total_expenses: Price::ZERO,
            total_fees: Price::ZERO,
            taxable_profit: Price::ZERO,
            realized_profit: Price::ZERO,
            tax_amount: Price::ZERO,
            events: BTreeMap::new(),
        }
    }

    /// A copy with every monetary figure rounded to two places, half-up
    pub fn rounded(&self) -> TaxResult {
        TaxResult {
            total_income: self.total_income.round2(),
            total_expenses: self.total_expenses.round2(),
            total_fees: self.total_fees.round2(),
            taxable_profit: self.taxable_profit.round2(),
            realized_profit: self.realized_profit.round2(),
            tax_amount: self.tax_amount.round2(),
            events: self
                .events
                .iter()
                .map(|(asset, events)| {
                    (
                        asset.clone(),
                        events.iter().map(RealizationEvent::rounded).collect(),
                    )
                })
                .collect(),
            ..self.clone()
        }
    }
}

/// Runs one complete tax calculation over a transaction batch
///
/// Pure function of its inputs: identical input produces a byte-identical
/// result, and nothing outside the returned value is touched. Dirty input
/// records are dropped by the normalizer; business-rule oddities (sales
/// exceeding purchases) are flagged in the result, never raised as errors.
pub fn calculate(transactions: Vec<Transaction>, opts: &Options) -> TaxResult {
    info!(
        "calculate: {} records, country {}, year {}, asset filter {}",
        transactions.len(),
        opts.country,
        opts.tax_year,
        opts.filter_asset
            .as_ref()
            .map(Asset::as_str)
            .unwrap_or("none"),
    );

    let normalized = normalize(
        transactions,
        opts.filter_asset.as_ref(),
        opts.date_range.as_ref(),
    );
    if normalized.is_empty() {
        info!("calculate: nothing to compute after normalization");
        return TaxResult::empty(opts);
    }
    let transaction_count = normalized.len();

    // Group by canonical asset, preserving the normalizer's time order
    // within each group.
    let mut by_asset: BTreeMap<Asset, Vec<Transaction>> = BTreeMap::new();
    for tx in normalized {
        let asset = tx
            .canonical_asset()
            .expect("malformed record survived normalization");
        by_asset.entry(asset).or_default().push(tx);
    }

    let mut total_income = Price::ZERO;
    let mut total_expenses = Price::ZERO;
    let mut total_fees = Price::ZERO;
    let mut realized_profit = Price::ZERO;
    let mut events = BTreeMap::new();

    for (asset, txs) in by_asset {
        debug!("[{}] {} records", asset, txs.len());

        // Load every BUY into the ledger (oldest first), then match the
        // sales in time order against it.
        let mut ledger = LotLedger::new(asset.clone());
        let mut bought = Amount::ZERO;
        for tx in txs.iter().filter(|tx| tx.ty == TransactionType::Buy) {
            bought += tx.amount;
            total_expenses += tx.total;
            ledger.push(Lot::from_buy(tx));
        }
        for tx in &txs {
            total_fees += tx.fee;
            total_expenses += tx.fee;
        }

        let sales: Vec<Transaction> = txs
            .into_iter()
            .filter(|tx| tx.ty == TransactionType::Sell)
            .collect();
        let asset_events = realize_sales(&asset, &sales, &mut ledger);

        let consumed: Amount = asset_events
            .iter()
            .flat_map(|ev| ev.matched_lots.iter())
            .map(|lot| lot.amount)
            .sum();
        // No quantity is created or destroyed by matching; a failure here
        // is internal corruption, not bad user data.
        assert_eq!(
            consumed + ledger.remaining_total(),
            bought,
            "[{}] purchased quantity not conserved",
            asset,
        );

        for event in &asset_events {
            total_income += event.sale_revenue;
            realized_profit += event.profit;
        }
        events.insert(asset, asset_events);
    }

    let taxable_profit = Price::ZERO.max(total_income - total_expenses);
    let tax_amount = resolve_tax(taxable_profit, opts.country);
    info!(
        "calculate: income {}, expenses {}, taxable profit {}, tax {}",
        total_income, total_expenses, taxable_profit, tax_amount,
    );

    TaxResult {
        tax_year: opts.tax_year,
        country: opts.country,
        currency: opts.country.currency(),
        has_data: true,
        transaction_count,
        total_income,
        total_expenses,
        total_fees,
        taxable_profit,
        realized_profit,
        tax_amount,
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UtcTime;
    use crate::{amount, price};

    fn opts(country: Country) -> Options {
        Options {
            country,
            tax_year: 2024,
            filter_asset: None,
            date_range: None,
        }
    }

    fn record(
        asset: &str,
        ty: TransactionType,
        amount: Amount,
        price: Price,
        total: Price,
        fee: Price,
        t: i64,
    ) -> Transaction {
        Transaction {
            asset: asset.into(),
            ty,
            amount,
            price,
            total,
            fee,
            timestamp: UtcTime::from_unix_i64(t).unwrap(),
        }
    }

    fn buy(asset: &str, amount: Amount, price: Price, total: Price, t: i64) -> Transaction {
        record(asset, TransactionType::Buy, amount, price, total, Price::ZERO, t)
    }

    fn sell(asset: &str, amount: Amount, total: Price, fee: Price, t: i64) -> Transaction {
        record(asset, TransactionType::Sell, amount, price!(1), total, fee, t)
    }

    #[test]
    fn empty_input_has_no_data() {
        let result = calculate(vec![], &opts(Country::Russia));
        assert!(!result.has_data);
        assert_eq!(result.taxable_profit, Price::ZERO);
        assert_eq!(result.tax_amount, Price::ZERO);
        assert_eq!(result.transaction_count, 0);
        assert!(result.events.is_empty());
        // labeling metadata still present
        assert_eq!(result.tax_year, 2024);
        assert_eq!(result.currency, "RUB");
    }

    #[test]
    fn all_malformed_input_has_no_data() {
        let mut bad = buy("BTC", amount!(1), price!(10), price!(10), 1);
        bad.total = Price::ZERO;
        let result = calculate(vec![bad], &opts(Country::Other));
        assert!(!result.has_data);
    }

    #[test]
    fn fifo_end_to_end() {
        // B1(5 @ 20 = 100), B2(5 @ 40 = 200), then S(7 for 350): basis
        // must be 180, so per-event profit 170. Coarse figure:
        // 350 - (100 + 200) = 50.
        let txs = vec![
            buy("BTC", amount!(5), price!(20), price!(100), 100),
            buy("BTC", amount!(5), price!(40), price!(200), 200),
            sell("BTC", amount!(7), price!(350), Price::ZERO, 300),
        ];
        let result = calculate(txs, &opts(Country::Other));

        assert!(result.has_data);
        assert_eq!(result.transaction_count, 3);
        assert_eq!(result.total_income, price!(350));
        assert_eq!(result.total_expenses, price!(300));
        assert_eq!(result.taxable_profit, price!(50));
        assert_eq!(result.realized_profit, price!(170));
        assert_eq!(result.tax_amount, price!(6.5));

        let btc: Asset = "BTC".parse().unwrap();
        let events = &result.events[&btc];
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].cost_basis, price!(180));
    }

    #[test]
    fn sequential_sales_never_double_count() {
        // two sales of 3 against B1(5) + B2(5): second sale draws 2 from
        // B1's remainder and 1 from B2
        let txs = vec![
            buy("BTC", amount!(5), price!(10), price!(50), 100),
            buy("BTC", amount!(5), price!(30), price!(150), 200),
            sell("BTC", amount!(3), price!(90), Price::ZERO, 300),
            sell("BTC", amount!(3), price!(90), Price::ZERO, 400),
        ];
        let result = calculate(txs, &opts(Country::Other));

        let btc: Asset = "BTC".parse().unwrap();
        let events = &result.events[&btc];
        assert_eq!(events[0].cost_basis, price!(30)); // 3 @ 10
        assert_eq!(events[1].cost_basis, price!(50)); // 2 @ 10 + 1 @ 30
        let consumed: Amount = events
            .iter()
            .flat_map(|ev| ev.matched_lots.iter())
            .map(|lot| lot.amount)
            .sum();
        assert_eq!(consumed, amount!(6));
    }

    #[test]
    fn assets_are_matched_independently() {
        let txs = vec![
            buy("BTC", amount!(1), price!(100), price!(100), 100),
            buy("ETH", amount!(10), price!(10), price!(100), 200),
            sell("ETH", amount!(10), price!(200), Price::ZERO, 300),
            sell("BTC", amount!(1), price!(300), Price::ZERO, 400),
        ];
        let result = calculate(txs, &opts(Country::Other));

        assert_eq!(result.events.len(), 2);
        let btc: Asset = "BTC".parse().unwrap();
        let eth: Asset = "ETH".parse().unwrap();
        assert_eq!(result.events[&btc][0].cost_basis, price!(100));
        assert_eq!(result.events[&eth][0].cost_basis, price!(100));
        assert_eq!(result.total_income, price!(500));
        assert_eq!(result.total_expenses, price!(200));
        assert_eq!(result.taxable_profit, price!(300));
    }

    #[test]
    fn staking_and_other_contribute_fees_only() {
        let txs = vec![
            buy("BTC", amount!(1), price!(100), price!(100), 100),
            record(
                "BTC",
                TransactionType::Staking,
                amount!(0.1),
                price!(100),
                price!(10),
                price!(2),
                200,
            ),
            sell("BTC", amount!(1), price!(400), price!(3), 300),
        ];
        let result = calculate(txs, &opts(Country::Other));

        // staking neither creates nor consumes lots
        let btc: Asset = "BTC".parse().unwrap();
        assert_eq!(result.events[&btc].len(), 1);
        assert!(!result.events[&btc][0].under_collateralized);
        // expenses: 100 (buy) + 2 + 3 (fees); fees tracked separately too
        assert_eq!(result.total_expenses, price!(105));
        assert_eq!(result.total_fees, price!(5));
        assert_eq!(result.taxable_profit, price!(295));
    }

    #[test]
    fn under_collateralized_sale_is_flagged_not_fatal() {
        let txs = vec![sell("DOGE", amount!(1000), price!(80), Price::ZERO, 100)];
        let result = calculate(txs, &opts(Country::Other));

        let doge: Asset = "DOGE".parse().unwrap();
        assert!(result.events[&doge][0].under_collateralized);
        assert_eq!(result.events[&doge][0].cost_basis, Price::ZERO);
        assert_eq!(result.taxable_profit, price!(80));
    }

    #[test]
    fn asset_filter_restricts_the_whole_calculation() {
        let txs = vec![
            buy("BTC", amount!(1), price!(100), price!(100), 100),
            buy("ETH", amount!(1), price!(50), price!(50), 200),
            sell("BTC", amount!(1), price!(200), Price::ZERO, 300),
        ];
        let mut options = opts(Country::Other);
        options.filter_asset = Some("eth".parse().unwrap());
        let result = calculate(txs, &options);

        assert!(result.has_data);
        assert_eq!(result.transaction_count, 1);
        assert_eq!(result.total_income, Price::ZERO);
        assert_eq!(result.total_expenses, price!(50));
        assert_eq!(result.taxable_profit, Price::ZERO);
    }

    #[test]
    fn calculation_is_idempotent() {
        let txs = vec![
            buy("BTC", amount!(2), price!(100), price!(200), 100),
            sell("BTC", amount!(1.5), price!(450), price!(1.25), 200),
            sell("BTC", amount!(1), price!(300), Price::ZERO, 300),
        ];
        let first = calculate(txs.clone(), &opts(Country::Russia));
        let second = calculate(txs, &opts(Country::Russia));
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first.rounded()).unwrap(),
            serde_json::to_string(&second.rounded()).unwrap(),
        );
    }

    #[test]
    fn russia_schedule_applied_to_coarse_profit() {
        let txs = vec![
            buy("BTC", amount!(1), price!(100_000), price!(100_000), 100),
            sell("BTC", amount!(1), price!(2_500_100), Price::ZERO, 200),
        ];
        let result = calculate(txs, &opts(Country::Russia));

        assert_eq!(result.taxable_profit, price!(2_400_100));
        // 2,400,000 at 13% + 100 at 15%
        assert_eq!(result.tax_amount, price!(312_015));
        assert_eq!(result.currency, "RUB");
    }

    #[test]
    fn rounding_applies_only_at_the_boundary() {
        // three sales each with a third-ish unit cost; accumulation stays
        // exact until rounded() is called
        let txs = vec![
            buy("BTC", amount!(3), price!(33.333333), price!(99.999999), 100),
            sell("BTC", amount!(3), price!(150.005), Price::ZERO, 200),
        ];
        let result = calculate(txs, &opts(Country::Other));

        assert_eq!(result.taxable_profit, price!(50.005001));
        let rounded = result.rounded();
        assert_eq!(rounded.taxable_profit, price!(50.01));
        assert_eq!(rounded.total_expenses, price!(100));
        // the unrounded result is untouched
        assert_eq!(result.total_expenses, price!(99.999999));
    }
}
