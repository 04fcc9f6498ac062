use log::debug;
use serde::{Deserialize, Serialize};

//price adjustment method applied across roll boundaries
//
//backward and forward both shift the incoming segment by the additive
//difference at the overlap date, same as difference; downstream consumers
//depend on the two staying identical, so do not split them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustMethod {
    Backward,
    Forward,
    Ratio,
    Difference,
    None,
}

impl AdjustMethod {
    //parse adjustment method from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "backward" => Some(AdjustMethod::Backward),
            "forward" => Some(AdjustMethod::Forward),
            "ratio" => Some(AdjustMethod::Ratio),
            "difference" | "diff" => Some(AdjustMethod::Difference),
            "none" | "raw" => Some(AdjustMethod::None),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustMethod::Backward => "backward",
            AdjustMethod::Forward => "forward",
            AdjustMethod::Ratio => "ratio",
            AdjustMethod::Difference => "difference",
            AdjustMethod::None => "none",
        }
    }
}

//running adjustment accumulator carried along the roll sequence
//
//additive methods keep one offset, ratio keeps one multiplier; at a roll
//with no overlap date the accumulator is left untouched, so the previous
//roll's constants keep applying
#[derive(Debug, Clone)]
pub struct Adjuster {
    method: AdjustMethod,
    offset: f64,
    ratio: f64,
}

impl Adjuster {
    pub fn new(method: AdjustMethod) -> Self {
        Adjuster {
            method,
            offset: 0.0,
            ratio: 1.0,
        }
    }

    //recomputes the accumulator from the two closes on the overlap date
    pub fn update(&mut self, series_close: f64, contract_close: f64) {
        match self.method {
            AdjustMethod::Difference | AdjustMethod::Backward | AdjustMethod::Forward => {
                self.offset = series_close - contract_close;
            }
            AdjustMethod::Ratio => {
                if contract_close != 0.0 {
                    self.ratio = series_close / contract_close;
                } else {
                    //zero denominator: keep the prior ratio
                    debug!(
                        "zero close at overlap, keeping prior ratio {}",
                        self.ratio
                    );
                }
            }
            AdjustMethod::None => {}
        }
    }

    //applies the current accumulator to one raw price
    pub fn apply(&self, raw: f64) -> f64 {
        match self.method {
            AdjustMethod::Difference | AdjustMethod::Backward | AdjustMethod::Forward => {
                raw + self.offset
            }
            AdjustMethod::Ratio => raw * self.ratio,
            AdjustMethod::None => raw,
        }
    }
}
