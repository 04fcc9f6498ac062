use crate::data::Bar;
use crate::instrument::product_prefix;
use crate::report::BatchStats;
use crate::tracker::position::{Position, Signal};
use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum LookupError {
    #[error("no majors row for product {product} on {date}")]
    NoMajorsRow { product: String, date: NaiveDate },
    #[error("unusable open price {price} for product {product} on {date}")]
    UnusableOpenPrice {
        product: String,
        date: NaiveDate,
        price: f64,
    },
}

//position tracker parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerParams {
    //sessions from open to close on the trading-day calendar
    pub holding_days: usize,
}

impl Default for TrackerParams {
    fn default() -> Self {
        TrackerParams { holding_days: 10 }
    }
}

//a majors (or continuous) table indexed for per-day product lookups
//
//rows keep file order within a day, so the first row matching a product is
//the one a lookup returns
pub struct MajorsTable {
    rows: Vec<Bar>,
    trading_days: Vec<NaiveDate>,
    by_day: HashMap<NaiveDate, Vec<usize>>,
}

impl MajorsTable {
    pub fn new(rows: Vec<Bar>) -> Self {
        let mut by_day: HashMap<NaiveDate, Vec<usize>> = HashMap::new();
        for (idx, bar) in rows.iter().enumerate() {
            by_day.entry(bar.date).or_default().push(idx);
        }

        let mut trading_days: Vec<NaiveDate> = by_day.keys().copied().collect();
        trading_days.sort();

        MajorsTable {
            rows,
            trading_days,
            by_day,
        }
    }

    //the global sorted trading-day calendar
    pub fn trading_days(&self) -> &[NaiveDate] {
        &self.trading_days
    }

    //first row on the date whose contract product prefix matches, case-insensitively
    pub fn major_row(&self, date: NaiveDate, product: &str) -> Option<&Bar> {
        self.by_day.get(&date)?.iter().map(|&i| &self.rows[i]).find(
            |bar| {
                product_prefix(&bar.contract)
                    .map_or(false, |prefix| prefix.eq_ignore_ascii_case(product))
            },
        )
    }

    //the trading day a fixed number of sessions after date, clamped to the
    //last session when the calendar runs out
    pub fn session_after(&self, date: NaiveDate, sessions: usize) -> Option<NaiveDate> {
        let last = *self.trading_days.last()?;

        let start = match self.trading_days.binary_search(&date) {
            Ok(idx) => idx,
            Err(idx) => idx,
        };

        Some(match self.trading_days.get(start + sessions) {
            Some(&day) => day,
            None => last,
        })
    }
}

//resolves one signal into a position: the open price is the close of the
//day's major row and the quantity the floor of amount over that price
pub fn open_position(
    signal: &Signal,
    majors: &MajorsTable,
    params: &TrackerParams,
) -> Result<Position, LookupError> {
    let row = majors
        .major_row(signal.date, &signal.product)
        .ok_or_else(|| LookupError::NoMajorsRow {
            product: signal.product.clone(),
            date: signal.date,
        })?;

    let open_price = row.close;
    if !(open_price > 0.0) {
        return Err(LookupError::UnusableOpenPrice {
            product: signal.product.clone(),
            date: signal.date,
            price: open_price,
        });
    }

    let quantity = (signal.amount / open_price).floor() as i64;
    let close_date = majors
        .session_after(signal.date, params.holding_days)
        .unwrap_or(signal.date);

    Ok(Position {
        open_date: signal.date,
        product: signal.product.clone(),
        direction: signal.direction,
        open_contract: row.contract.clone(),
        open_price,
        amount: signal.amount,
        quantity,
        close_date,
    })
}

//opens a position per signal; signals that cannot be resolved are logged
//and counted as skipped, never fatal for the batch
pub fn open_positions(
    signals: &[Signal],
    majors: &MajorsTable,
    params: &TrackerParams,
) -> (Vec<Position>, BatchStats) {
    let mut stats = BatchStats::new();
    let mut positions = Vec::new();

    for signal in signals {
        match open_position(signal, majors, params) {
            Ok(position) => {
                positions.push(position);
                stats.processed += 1;
            }
            Err(err) => {
                warn!("skipping signal: {}", err);
                stats.skipped += 1;
            }
        }
    }

    (positions, stats)
}
