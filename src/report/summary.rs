use crate::tracker::MatchedPosition;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//summary metrics over one tracked signal batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSummary {
    pub num_positions: usize,
    //positions with a realized close-day outcome
    pub num_realized: usize,
    pub num_wins: usize,
    pub num_losses: usize,
    pub win_rate: f64,
    pub total_profit: f64,
    pub avg_profit: f64,
    pub profit_std_dev: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
}

impl TradeSummary {
    //calculates summary metrics from the matched-position report
    pub fn from_matched(matched: &[MatchedPosition]) -> Self {
        let profits: Vec<f64> = matched.iter().filter_map(|m| m.total_profit).collect();

        let num_realized = profits.len();
        let num_wins = profits.iter().filter(|&&p| p > 0.0).count();
        let num_losses = profits.iter().filter(|&&p| p < 0.0).count();

        let win_rate = if num_realized > 0 {
            num_wins as f64 / num_realized as f64
        } else {
            0.0
        };

        let total_profit: f64 = profits.iter().sum();

        let slice: &[f64] = &profits;
        let avg_profit = if num_realized > 0 { slice.mean() } else { 0.0 };
        let profit_std_dev = if num_realized >= 2 { slice.std_dev() } else { 0.0 };

        let largest_win = profits.iter().copied().fold(0.0f64, f64::max);
        let largest_loss = profits.iter().copied().fold(0.0f64, f64::min);

        TradeSummary {
            num_positions: matched.len(),
            num_realized,
            num_wins,
            num_losses,
            win_rate,
            total_profit,
            avg_profit,
            profit_std_dev,
            largest_win,
            largest_loss,
        }
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        table.add_row(Row::new(vec![
            Cell::new("Positions"),
            Cell::new(&format!("{}", self.num_positions)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Realized"),
            Cell::new(&format!("{}", self.num_realized)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Wins"),
            Cell::new(&format!("{}", self.num_wins)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Losses"),
            Cell::new(&format!("{}", self.num_losses)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Win Rate"),
            Cell::new(&format!("{:.2}%", self.win_rate * 100.0)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Total Profit"),
            Cell::new(&format!("{:.2}", self.total_profit)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Avg Profit"),
            Cell::new(&format!("{:.2}", self.avg_profit)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Profit Std Dev"),
            Cell::new(&format!("{:.2}", self.profit_std_dev)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Largest Win"),
            Cell::new(&format!("{:.2}", self.largest_win)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Largest Loss"),
            Cell::new(&format!("{:.2}", self.largest_loss)),
        ]));

        table.printstd();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::Direction;
    use chrono::NaiveDate;

    fn matched(total_profit: Option<f64>) -> MatchedPosition {
        let date: NaiveDate = "2021-01-04".parse().unwrap();
        MatchedPosition {
            open_date: date,
            product: "X".to_string(),
            direction: Direction::Long,
            open_contract: "X2101".to_string(),
            amount: 100000.0,
            open_price: 1000.0,
            open_quantity: 100,
            close_date: "2021-01-18".parse().unwrap(),
            close_price: total_profit.map(|p| 1000.0 + p / 100.0),
            profit_per_unit: total_profit.map(|p| p / 100.0),
            total_profit,
        }
    }

    #[test]
    fn summarizes_realized_outcomes() {
        let report = vec![
            matched(Some(100.0)),
            matched(Some(-50.0)),
            matched(None),
        ];

        let summary = TradeSummary::from_matched(&report);
        assert_eq!(summary.num_positions, 3);
        assert_eq!(summary.num_realized, 2);
        assert_eq!(summary.num_wins, 1);
        assert_eq!(summary.num_losses, 1);
        assert_eq!(summary.win_rate, 0.5);
        assert_eq!(summary.total_profit, 50.0);
        assert_eq!(summary.avg_profit, 25.0);
        assert_eq!(summary.largest_win, 100.0);
        assert_eq!(summary.largest_loss, -50.0);
    }

    #[test]
    fn empty_report_yields_zeroed_summary() {
        let summary = TradeSummary::from_matched(&[]);
        assert_eq!(summary.num_positions, 0);
        assert_eq!(summary.win_rate, 0.0);
        assert_eq!(summary.avg_profit, 0.0);
        assert_eq!(summary.profit_std_dev, 0.0);
    }

    #[test]
    fn single_outcome_has_zero_std_dev() {
        let summary = TradeSummary::from_matched(&[matched(Some(100.0))]);
        assert_eq!(summary.num_realized, 1);
        assert_eq!(summary.avg_profit, 100.0);
        assert_eq!(summary.profit_std_dev, 0.0);
    }
}
