use crate::report::BatchStats;
use crate::tracker::matcher::{open_positions, MajorsTable, TrackerParams};
use crate::tracker::position::{Direction, Position, Signal};
use chrono::NaiveDate;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Serialize;

//one ledger row per open position per trading day
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LedgerRow {
    pub date: NaiveDate,
    pub product: String,
    pub contract: String,
    #[serde(rename = "position")]
    pub direction: Direction,
    pub quantity: i64,
    pub daily_settlement: f64,
    pub daily_pnl: f64,
}

//per (date, product) aggregation of the ledger
//
//holding_profit covers days strictly before the close date, closing_profit
//exactly the close day; both ends of the marking window are inclusive
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub product: String,
    pub total_profit: f64,
    pub holding_profit: f64,
    pub closing_profit: f64,
    pub long_profit: f64,
    pub short_profit: f64,
    pub profit_per_unit: f64,
    #[serde(skip)]
    pub total_quantity: i64,
}

//one row per position with its realized outcome at the close-day mark
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MatchedPosition {
    pub open_date: NaiveDate,
    pub product: String,
    #[serde(rename = "position")]
    pub direction: Direction,
    pub open_contract: String,
    pub amount: f64,
    pub open_price: f64,
    pub open_quantity: i64,
    pub close_date: NaiveDate,
    pub close_price: Option<f64>,
    pub profit_per_unit: Option<f64>,
    pub total_profit: Option<f64>,
}

//walks the trading-day calendar and marks every open position against the
//day's settlement; days with no majors row for the product are skipped
pub fn daily_ledger(
    positions: &[Position],
    majors: &MajorsTable,
) -> (Vec<LedgerRow>, Vec<DailySummary>) {
    let mut ledger = Vec::new();
    let mut summaries: IndexMap<(NaiveDate, String), DailySummary> = IndexMap::new();

    for &day in majors.trading_days() {
        for position in positions.iter().filter(|p| p.is_open_on(day)) {
            let row = match majors.major_row(day, &position.product) {
                Some(row) => row,
                None => {
                    debug!(
                        "no mark for product {} on {}, skipping day",
                        position.product, day
                    );
                    continue;
                }
            };

            let mark = row.mark_price();
            let pnl = position.daily_pnl(mark);

            ledger.push(LedgerRow {
                date: day,
                product: position.product.clone(),
                contract: row.contract.clone(),
                direction: position.direction,
                quantity: position.quantity,
                daily_settlement: mark,
                daily_pnl: pnl,
            });

            let entry = summaries
                .entry((day, position.product.clone()))
                .or_insert_with(|| DailySummary {
                    date: day,
                    product: position.product.clone(),
                    total_profit: 0.0,
                    holding_profit: 0.0,
                    closing_profit: 0.0,
                    long_profit: 0.0,
                    short_profit: 0.0,
                    profit_per_unit: 0.0,
                    total_quantity: 0,
                });

            entry.total_quantity += position.quantity;
            if day < position.close_date {
                entry.holding_profit += pnl;
            } else {
                entry.closing_profit += pnl;
            }
            match position.direction {
                Direction::Long => entry.long_profit += pnl,
                Direction::Short => entry.short_profit += pnl,
            }
            entry.total_profit += pnl;
        }
    }

    let summaries = summaries
        .into_values()
        .map(|mut summary| {
            //zero total quantity guards the per-unit figure
            summary.profit_per_unit = if summary.total_quantity != 0 {
                summary.total_profit / summary.total_quantity as f64
            } else {
                0.0
            };
            summary
        })
        .collect();

    (ledger, summaries)
}

//realizes each position at its close-day mark; a missing close-day row
//leaves the outcome fields empty
pub fn matched_report(positions: &[Position], majors: &MajorsTable) -> Vec<MatchedPosition> {
    positions
        .iter()
        .map(|position| {
            let close_row = majors.major_row(position.close_date, &position.product);
            if close_row.is_none() {
                warn!(
                    "no close-day row for product {} on {}",
                    position.product, position.close_date
                );
            }

            let close_price = close_row.map(|row| row.mark_price());
            let profit_per_unit = close_price
                .map(|price| position.direction.sign() * (price - position.open_price));
            let total_profit = profit_per_unit.map(|ppu| ppu * position.quantity as f64);

            MatchedPosition {
                open_date: position.open_date,
                product: position.product.clone(),
                direction: position.direction,
                open_contract: position.open_contract.clone(),
                amount: position.amount,
                open_price: position.open_price,
                open_quantity: position.quantity,
                close_date: position.close_date,
                close_price,
                profit_per_unit,
                total_profit,
            }
        })
        .collect()
}

//everything one tracking run produces
pub struct TrackResult {
    pub positions: Vec<Position>,
    pub ledger: Vec<LedgerRow>,
    pub summaries: Vec<DailySummary>,
    pub matched: Vec<MatchedPosition>,
    pub stats: BatchStats,
}

//full tracking pass: signals to positions, positions to daily ledger,
//summaries and the matched report
pub fn track_signals(
    signals: &[Signal],
    majors: &MajorsTable,
    params: &TrackerParams,
) -> TrackResult {
    let (positions, stats) = open_positions(signals, majors, params);
    let (ledger, summaries) = daily_ledger(&positions, majors);
    let matched = matched_report(&positions, majors);

    TrackResult {
        positions,
        ledger,
        summaries,
        matched,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Bar;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, n).unwrap()
    }

    fn major_bar(date: NaiveDate, contract: &str, close: f64, settlement: f64) -> Bar {
        Bar::new_unchecked(
            date,
            contract.to_string(),
            None,
            close,
            close,
            close,
            close,
            Some(settlement),
            100.0,
            100.0,
        )
    }

    //fifteen sessions of product x: close pinned at 1000, settlement
    //climbing 10 per session from 1000
    fn fifteen_day_table() -> MajorsTable {
        let rows: Vec<Bar> = (1..=15)
            .map(|n| major_bar(day(n), "X2101", 1000.0, 1000.0 + 10.0 * (n - 1) as f64))
            .collect();
        MajorsTable::new(rows)
    }

    fn long_signal(date: NaiveDate, product: &str, amount: f64) -> Signal {
        Signal {
            date,
            product: product.to_string(),
            direction: Direction::Long,
            amount,
        }
    }

    #[test]
    fn total_profit_realizes_at_the_close_day_mark() {
        let majors = fifteen_day_table();
        let signals = vec![long_signal(day(1), "X", 100000.0)];

        let result = track_signals(&signals, &majors, &TrackerParams::default());

        assert_eq!(result.matched.len(), 1);
        let matched = &result.matched[0];
        assert_eq!(matched.open_price, 1000.0);
        assert_eq!(matched.open_quantity, 100);
        assert_eq!(matched.close_date, day(11));
        //settlement on the close day is 1100
        assert_eq!(matched.close_price, Some(1100.0));
        assert_eq!(matched.profit_per_unit, Some(100.0));
        assert_eq!(matched.total_profit, Some(10000.0));
    }

    #[test]
    fn ledger_covers_the_inclusive_marking_window() {
        let majors = fifteen_day_table();
        let signals = vec![long_signal(day(1), "X", 100000.0)];

        let result = track_signals(&signals, &majors, &TrackerParams::default());

        //open day through close day inclusive: 11 rows
        assert_eq!(result.ledger.len(), 11);
        assert_eq!(result.ledger.first().unwrap().date, day(1));
        assert_eq!(result.ledger.last().unwrap().date, day(11));

        //daily pnl follows the settlement drift
        assert_eq!(result.ledger[0].daily_pnl, 0.0);
        assert_eq!(result.ledger[5].daily_pnl, 5000.0);
        assert_eq!(result.ledger[10].daily_pnl, 10000.0);
    }

    #[test]
    fn holding_and_closing_profit_split_at_the_close_date() {
        let majors = fifteen_day_table();
        let signals = vec![long_signal(day(1), "X", 100000.0)];

        let result = track_signals(&signals, &majors, &TrackerParams::default());

        for summary in &result.summaries {
            if summary.date < day(11) {
                assert_eq!(summary.closing_profit, 0.0);
                assert_eq!(summary.holding_profit, summary.total_profit);
            } else {
                assert_eq!(summary.date, day(11));
                assert_eq!(summary.closing_profit, 10000.0);
                assert_eq!(summary.holding_profit, 0.0);
            }
        }

        let close_summary = result.summaries.last().unwrap();
        assert_eq!(close_summary.total_profit, 10000.0);
        assert_eq!(close_summary.profit_per_unit, 100.0);
    }

    #[test]
    fn short_position_profits_when_the_mark_falls() {
        let rows = vec![
            major_bar(day(1), "X2101", 1000.0, 1000.0),
            major_bar(day(2), "X2101", 1000.0, 900.0),
        ];
        let majors = MajorsTable::new(rows);

        let signals = vec![Signal {
            date: day(1),
            product: "X".to_string(),
            direction: Direction::Short,
            amount: 100000.0,
        }];

        let result = track_signals(&signals, &majors, &TrackerParams::default());

        //two sessions only: the close clamps to the last day
        assert_eq!(result.positions[0].close_date, day(2));
        assert_eq!(result.ledger[1].daily_pnl, 10000.0);
        let summary = result.summaries.last().unwrap();
        assert_eq!(summary.short_profit, 10000.0);
        assert_eq!(summary.long_profit, 0.0);
    }

    #[test]
    fn days_without_a_mark_row_are_skipped() {
        //product x misses day 3 while product y keeps it on the calendar
        let mut rows: Vec<Bar> = (1..=5)
            .filter(|&n| n != 3)
            .map(|n| major_bar(day(n), "X2101", 1000.0, 1000.0))
            .collect();
        rows.push(major_bar(day(3), "Y2101", 500.0, 500.0));
        let majors = MajorsTable::new(rows);

        let signals = vec![long_signal(day(1), "X", 100000.0)];
        let result = track_signals(&signals, &majors, &TrackerParams::default());

        //close clamps to day 5; day 3 produces no x row
        assert_eq!(result.positions[0].close_date, day(5));
        assert!(result.ledger.iter().all(|row| row.date != day(3)));
        assert_eq!(result.ledger.len(), 4);
        assert!(result
            .summaries
            .iter()
            .all(|summary| summary.date != day(3)));
    }

    #[test]
    fn unmatched_signal_produces_no_rows_and_one_skip() {
        let majors = fifteen_day_table();
        let signals = vec![long_signal(day(1), "CU", 100000.0)];

        let result = track_signals(&signals, &majors, &TrackerParams::default());

        assert!(result.positions.is_empty());
        assert!(result.ledger.is_empty());
        assert!(result.matched.is_empty());
        assert_eq!(result.stats.skipped, 1);
        assert_eq!(result.stats.processed, 0);
    }

    #[test]
    fn positions_of_one_product_aggregate_per_day() {
        let majors = fifteen_day_table();
        let signals = vec![
            long_signal(day(1), "X", 100000.0),
            Signal {
                date: day(1),
                product: "X".to_string(),
                direction: Direction::Short,
                amount: 50000.0,
            },
        ];

        let result = track_signals(&signals, &majors, &TrackerParams::default());

        //day 2 settlement is 1010: long +1000, short -500
        let day2 = result
            .summaries
            .iter()
            .find(|summary| summary.date == day(2))
            .unwrap();
        assert_eq!(day2.long_profit, 1000.0);
        assert_eq!(day2.short_profit, -500.0);
        assert_eq!(day2.total_profit, 500.0);
        assert_eq!(day2.total_quantity, 150);
    }
}
