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

//! Crypto Tax CLI
//!
//! Thin driver around the calculation engine: reads a JSON transaction
//! batch, runs one calculation, prints the result.
//!

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use cryptotax::logger::Logger;
use cryptotax::schedule::Country;
use cryptotax::transaction::{DateRange, Transaction};
use cryptotax::units::Asset;
use cryptotax::{calculate, Options};
use std::{fs, io, path::PathBuf};

#[derive(Parser)]
#[command(name = "cryptotax-cli", about = "FIFO cost-basis crypto tax calculator")]
struct Cli {
    /// Also write a precise debug log to this file
    #[arg(long, global = true)]
    debug_log: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a tax calculation over a JSON transaction batch
    Calculate {
        /// Path to a JSON array of transaction records
        transactions: PathBuf,
        /// Country code (RUSSIA/RU, BELARUS/BY; anything else is OTHER)
        #[arg(long, default_value = "RUSSIA")]
        country: String,
        /// Tax year label for the output
        #[arg(long)]
        year: i32,
        /// Restrict the calculation to one asset
        #[arg(long)]
        asset: Option<String>,
        /// Inclusive start date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        /// Inclusive end date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
        /// Print the full result as JSON instead of a text summary
        #[arg(long)]
        json: bool,
    },
    /// Print realized sale events as CSV rows for spreadsheet import
    ExportEvents {
        /// Path to a JSON array of transaction records
        transactions: PathBuf,
        /// Country code (only affects the labeling, not the events)
        #[arg(long, default_value = "RUSSIA")]
        country: String,
        /// Tax year label for the output
        #[arg(long)]
        year: i32,
        /// Restrict the calculation to one asset
        #[arg(long)]
        asset: Option<String>,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
}

/// Reads a JSON array of transaction records from a file
fn load_transactions(path: &PathBuf) -> Result<Vec<Transaction>, anyhow::Error> {
    let filename = path.to_string_lossy().into_owned();
    let fh = fs::File::open(path).with_context(|| format!("opening transaction batch {filename}"))?;
    let bf = io::BufReader::new(fh);
    serde_json::from_reader(bf).with_context(|| format!("parsing transaction batch {filename}"))
}

fn build_options(
    country: &str,
    year: i32,
    asset: Option<&str>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Options, anyhow::Error> {
    let filter_asset = match asset {
        Some(raw) => Some(
            raw.parse::<Asset>()
                .with_context(|| format!("asset filter {raw:?}"))?,
        ),
        None => None,
    };
    let date_range = match (from, to) {
        (Some(start), Some(end)) => {
            if start > end {
                return Err(anyhow::Error::msg(format!(
                    "date range starts after it ends ({start} > {end})"
                )));
            }
            Some(DateRange { start, end })
        }
        (None, None) => None,
        _ => {
            return Err(anyhow::Error::msg(
                "--from and --to must be given together",
            ))
        }
    };
    Ok(Options {
        country: Country::from_code(country),
        tax_year: year,
        filter_asset,
        date_range,
    })
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    match &cli.debug_log {
        Some(path) => Logger::init(path).context("initializing logger")?,
        None => Logger::init_stdout_only().context("initializing logger")?,
    }

    match cli.command {
        Command::Calculate {
            transactions,
            country,
            year,
            asset,
            from,
            to,
            json,
        } => {
            let opts = build_options(&country, year, asset.as_deref(), from, to)?;
            let batch = load_transactions(&transactions)?;
            let result = calculate(batch, &opts).rounded();

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&result).context("encoding result")?
                );
            } else if !result.has_data {
                println!("No usable transactions; nothing to compute.");
            } else {
                println!("Tax year:        {}", result.tax_year);
                println!("Country:         {}", result.country);
                println!("Transactions:    {}", result.transaction_count);
                println!();
                println!("Total income:    {} {}", result.total_income, result.currency);
                println!("Total expenses:  {} {}", result.total_expenses, result.currency);
                println!("  of which fees: {} {}", result.total_fees, result.currency);
                println!("Taxable profit:  {} {}", result.taxable_profit, result.currency);
                println!("Realized profit: {} {}", result.realized_profit, result.currency);
                println!("Tax owed:        {} {}", result.tax_amount, result.currency);
                for events in result.events.values() {
                    for event in events {
                        if event.under_collateralized {
                            println!();
                            println!("WARNING: {event} -- review this sale by hand");
                        }
                    }
                }
            }
        }
        Command::ExportEvents {
            transactions,
            country,
            year,
            asset,
        } => {
            let opts = build_options(&country, year, asset.as_deref(), None, None)?;
            let batch = load_transactions(&transactions)?;
            let result = calculate(batch, &opts);

            println!(
                "Asset,Sale Date,Quantity,Proceeds,Cost Basis,Fee,Gain,\
                 Oldest Lot,Lots Consumed,Flags"
            );
            for events in result.events.values() {
                for event in events {
                    println!("{}", event.csv_printer());
                }
            }
        }
    }

    Ok(())
}
