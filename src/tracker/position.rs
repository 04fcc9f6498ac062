use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//trade direction carried by a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    //parse direction from a signal's position column
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "long" => Some(Direction::Long),
            "short" => Some(Direction::Short),
            _ => None,
        }
    }

    //converts to pnl sign (long = +1, short = -1)
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

//one entry signal row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Signal {
    pub date: NaiveDate,
    pub product: String,
    pub direction: Direction,
    pub amount: f64,
}

//a position opened from one signal and held a fixed number of sessions
//
//owned by the tracker for its whole lifetime: built from one signal row and
//only ever extended with derived fields, never shared
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub open_date: NaiveDate,
    pub product: String,
    pub direction: Direction,
    pub open_contract: String,
    pub open_price: f64,
    pub amount: f64,
    pub quantity: i64,
    pub close_date: NaiveDate,
}

impl Position {
    //signed mark-to-market pnl of the whole position against the open price
    pub fn daily_pnl(&self, mark_price: f64) -> f64 {
        self.direction.sign() * (mark_price - self.open_price) * self.quantity as f64
    }

    //true while date falls inside the holding window, both ends inclusive
    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        self.open_date <= date && date <= self.close_date
    }
}
