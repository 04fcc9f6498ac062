use crate::data::Bar;
use crate::instrument::ContractId;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

//contract roll strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollStrategy {
    #[serde(rename = "volume")]
    Volume,
    #[serde(rename = "oi")]
    OpenInterest,
    #[serde(rename = "time")]
    Time,
    #[serde(rename = "fixed")]
    Fixed,
}

impl RollStrategy {
    //parse roll strategy from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "volume" => Some(RollStrategy::Volume),
            "oi" | "open_interest" => Some(RollStrategy::OpenInterest),
            "time" => Some(RollStrategy::Time),
            "fixed" => Some(RollStrategy::Fixed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RollStrategy::Volume => "volume",
            RollStrategy::OpenInterest => "oi",
            RollStrategy::Time => "time",
            RollStrategy::Fixed => "fixed",
        }
    }
}

//determines the date through which a contract stays active
//
//volume/oi roll on the first common date where the next contract's figure
//strictly exceeds the current one's and need a next contract to exist;
//time truncates every contract, the final one included, at month end minus
//dominant_days; fixed rolls at month end minus rollover_days but leaves the
//final contract untruncated
pub fn detect_roll_date(
    strategy: RollStrategy,
    id: &ContractId,
    bars: &[Bar],
    next_bars: Option<&[Bar]>,
    dominant_days: i64,
    rollover_days: i64,
) -> Option<NaiveDate> {
    match strategy {
        RollStrategy::Volume => {
            next_bars.and_then(|next| first_crossover(bars, next, |b| b.volume))
        }
        RollStrategy::OpenInterest => {
            next_bars.and_then(|next| first_crossover(bars, next, |b| b.open_interest))
        }
        RollStrategy::Time => Some(id.month_end() - Duration::days(dominant_days)),
        RollStrategy::Fixed => next_bars.map(|_| id.month_end() - Duration::days(rollover_days)),
    }
}

//first date traded by both contracts where the next one's figure is strictly higher
fn first_crossover(
    current: &[Bar],
    next: &[Bar],
    figure: impl Fn(&Bar) -> f64,
) -> Option<NaiveDate> {
    let next_by_date: BTreeMap<NaiveDate, f64> =
        next.iter().map(|b| (b.date, figure(b))).collect();

    current
        .iter()
        .find(|b| {
            next_by_date
                .get(&b.date)
                .map_or(false, |&next_figure| next_figure > figure(b))
        })
        .map(|b| b.date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, contract: &str, volume: f64, oi: f64) -> Bar {
        Bar::new_unchecked(
            date.parse().unwrap(),
            contract.to_string(),
            None,
            100.0,
            100.0,
            100.0,
            100.0,
            None,
            volume,
            oi,
        )
    }

    #[test]
    fn parse_accepts_known_strategies() {
        assert_eq!(RollStrategy::parse("volume"), Some(RollStrategy::Volume));
        assert_eq!(RollStrategy::parse("OI"), Some(RollStrategy::OpenInterest));
        assert_eq!(
            RollStrategy::parse("open_interest"),
            Some(RollStrategy::OpenInterest)
        );
        assert_eq!(RollStrategy::parse("time"), Some(RollStrategy::Time));
        assert_eq!(RollStrategy::parse("fixed"), Some(RollStrategy::Fixed));
        assert_eq!(RollStrategy::parse("bogus"), None);
    }

    #[test]
    fn volume_crossover_picks_first_strictly_higher_day() {
        let id = ContractId::parse("X2101").unwrap();
        let current = vec![
            bar("2021-01-04", "X2101", 100.0, 0.0),
            bar("2021-01-05", "X2101", 80.0, 0.0),
        ];
        let next = vec![
            bar("2021-01-04", "X2102", 50.0, 0.0),
            bar("2021-01-05", "X2102", 120.0, 0.0),
        ];

        let roll = detect_roll_date(RollStrategy::Volume, &id, &current, Some(&next), 0, 0);
        assert_eq!(roll, Some("2021-01-05".parse().unwrap()));
    }

    #[test]
    fn equal_volume_does_not_roll() {
        let id = ContractId::parse("X2101").unwrap();
        let current = vec![bar("2021-01-04", "X2101", 100.0, 0.0)];
        let next = vec![bar("2021-01-04", "X2102", 100.0, 0.0)];

        let roll = detect_roll_date(RollStrategy::Volume, &id, &current, Some(&next), 0, 0);
        assert_eq!(roll, None);
    }

    #[test]
    fn volume_roll_needs_overlapping_dates() {
        let id = ContractId::parse("X2101").unwrap();
        let current = vec![bar("2021-01-04", "X2101", 10.0, 0.0)];
        let next = vec![bar("2021-01-06", "X2102", 500.0, 0.0)];

        let roll = detect_roll_date(RollStrategy::Volume, &id, &current, Some(&next), 0, 0);
        assert_eq!(roll, None);
    }

    #[test]
    fn oi_crossover_uses_open_interest() {
        let id = ContractId::parse("X2101").unwrap();
        let current = vec![bar("2021-01-04", "X2101", 0.0, 300.0)];
        let next = vec![bar("2021-01-04", "X2102", 0.0, 400.0)];

        let roll = detect_roll_date(RollStrategy::OpenInterest, &id, &current, Some(&next), 0, 0);
        assert_eq!(roll, Some("2021-01-04".parse().unwrap()));
    }

    #[test]
    fn time_roll_applies_without_next_contract() {
        let id = ContractId::parse("X2101").unwrap();
        let roll = detect_roll_date(RollStrategy::Time, &id, &[], None, 3, 0);
        assert_eq!(roll, Some("2021-01-28".parse().unwrap()));
    }

    #[test]
    fn fixed_roll_skips_final_contract() {
        let id = ContractId::parse("X2101").unwrap();
        let next = vec![bar("2021-01-04", "X2102", 0.0, 0.0)];

        let with_next = detect_roll_date(RollStrategy::Fixed, &id, &[], Some(&next), 0, 2);
        assert_eq!(with_next, Some("2021-01-29".parse().unwrap()));

        let last = detect_roll_date(RollStrategy::Fixed, &id, &[], None, 0, 2);
        assert_eq!(last, None);
    }
}
