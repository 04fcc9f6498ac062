use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BarError {
    #[error("Invalid OHLC values: high ({high}) < low ({low})")]
    InvalidHighLow { high: f64, low: f64 },
    #[error("Invalid OHLC values: close ({close}) outside high-low range [{low}, {high}]")]
    InvalidClose { close: f64, high: f64, low: f64 },
    #[error("Invalid OHLC values: open ({open}) outside high-low range [{low}, {high}]")]
    InvalidOpen { open: f64, high: f64, low: f64 },
    #[error("Negative volume: {0}")]
    NegativeVolume(f64),
}

//one trading day's record for one contract
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub contract: String,
    pub exchange: Option<String>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub settlement: Option<f64>,
    pub volume: f64,
    pub open_interest: f64,
}

impl Bar {
    //creates a new Bar with validation
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: NaiveDate,
        contract: String,
        exchange: Option<String>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        settlement: Option<f64>,
        volume: f64,
        open_interest: f64,
    ) -> Result<Self, BarError> {
        //validate high >= low
        if high < low {
            return Err(BarError::InvalidHighLow { high, low });
        }

        //validate close within [low, high]
        if close < low || close > high {
            return Err(BarError::InvalidClose { close, high, low });
        }

        //validate open within [low, high]
        if open < low || open > high {
            return Err(BarError::InvalidOpen { open, high, low });
        }

        //validate non-negative volume
        if volume < 0.0 {
            return Err(BarError::NegativeVolume(volume));
        }

        Ok(Bar {
            date,
            contract,
            exchange,
            open,
            high,
            low,
            close,
            settlement,
            volume,
            open_interest,
        })
    }

    //creates a Bar without validation
    //limit days in exchange data can leave open/close pinned outside the traded range
    #[allow(clippy::too_many_arguments)]
    pub fn new_unchecked(
        date: NaiveDate,
        contract: String,
        exchange: Option<String>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        settlement: Option<f64>,
        volume: f64,
        open_interest: f64,
    ) -> Self {
        Bar {
            date,
            contract,
            exchange,
            open,
            high,
            low,
            close,
            settlement,
            volume,
            open_interest,
        }
    }

    //returns the daily mark price: settlement when published, close otherwise
    pub fn mark_price(&self) -> f64 {
        self.settlement.unwrap_or(self.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn new_rejects_inverted_range() {
        let result = Bar::new(
            day("2021-09-01"),
            "cu2110".to_string(),
            None,
            100.0,
            99.0,
            101.0,
            100.0,
            None,
            10.0,
            0.0,
        );
        assert!(matches!(result, Err(BarError::InvalidHighLow { .. })));
    }

    #[test]
    fn new_rejects_negative_volume() {
        let result = Bar::new(
            day("2021-09-01"),
            "cu2110".to_string(),
            None,
            100.0,
            101.0,
            99.0,
            100.0,
            None,
            -1.0,
            0.0,
        );
        assert!(matches!(result, Err(BarError::NegativeVolume(_))));
    }

    #[test]
    fn mark_price_prefers_settlement() {
        let mut bar = Bar::new_unchecked(
            day("2021-09-01"),
            "cu2110".to_string(),
            None,
            100.0,
            101.0,
            99.0,
            100.0,
            Some(100.5),
            10.0,
            0.0,
        );
        assert_eq!(bar.mark_price(), 100.5);

        bar.settlement = None;
        assert_eq!(bar.mark_price(), 100.0);
    }
}
