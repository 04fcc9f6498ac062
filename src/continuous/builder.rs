use crate::continuous::adjust::{AdjustMethod, Adjuster};
use crate::continuous::roll::{detect_roll_date, RollStrategy};
use crate::data::Bar;
use crate::instrument::ContractId;
use chrono::NaiveDate;
use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

//one adjusted row of a continuous series, tagged with the pre-roll active contract
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContinuousBar {
    pub date: NaiveDate,
    pub contract: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub open_interest: f64,
}

//parameters of one continuous series build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuousParams {
    pub roll_strategy: RollStrategy,
    pub adjust_method: AdjustMethod,
    //restricts the roll sequence to contracts expiring in these months
    pub contract_months: Option<Vec<u32>>,
    //days before expiry to roll under the time strategy
    pub dominant_days: i64,
    //days before month end to roll under the fixed strategy
    pub rollover_days: i64,
}

impl Default for ContinuousParams {
    fn default() -> Self {
        ContinuousParams {
            roll_strategy: RollStrategy::Volume,
            adjust_method: AdjustMethod::Backward,
            contract_months: None,
            dominant_days: 0,
            rollover_days: 0,
        }
    }
}

//builds one continuous adjusted series from a single product's bars
//
//contracts are ordered by expiry key and walked oldest to newest; each
//contributes its rows up to and including its roll date, duplicate dates are
//never re-added (first writer wins), and the adjustment accumulator is
//recomputed at each overlap date. empty input yields an empty series
pub fn build_continuous(bars: &[Bar], params: &ContinuousParams) -> Vec<ContinuousBar> {
    //group rows by contract symbol in encounter order
    let mut by_contract: IndexMap<String, Vec<Bar>> = IndexMap::new();
    for bar in bars {
        by_contract
            .entry(bar.contract.clone())
            .or_default()
            .push(bar.clone());
    }

    //parse contract identities, skipping symbols that do not parse
    let mut contracts: Vec<(ContractId, Vec<Bar>)> = Vec::new();
    for (symbol, mut rows) in by_contract {
        match ContractId::parse(&symbol) {
            Ok(id) => {
                rows.sort_by_key(|b| b.date);
                contracts.push((id, rows));
            }
            Err(err) => warn!("skipping contract in roll sequence: {}", err),
        }
    }

    //stable sort: contracts with equal expiry keys stay in encounter order
    contracts.sort_by_key(|(id, _)| id.expiry_key());

    if let Some(months) = &params.contract_months {
        contracts.retain(|(id, _)| months.contains(&id.expiry_month));
    }

    let mut adjuster = Adjuster::new(params.adjust_method);
    let mut series: Vec<ContinuousBar> = Vec::new();
    let mut adjusted_close: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for i in 0..contracts.len() {
        let (id, rows) = &contracts[i];
        let next_rows = contracts.get(i + 1).map(|(_, rows)| rows.as_slice());

        let roll_date = detect_roll_date(
            params.roll_strategy,
            id,
            rows,
            next_rows,
            params.dominant_days,
            params.rollover_days,
        );

        //the overlap date is the earliest date shared with the series built so
        //far, taken from the contract's full date set before roll truncation;
        //with no overlap the previous roll's accumulator carries forward
        if i > 0 && params.adjust_method != AdjustMethod::None {
            let overlap = rows
                .iter()
                .find_map(|b| adjusted_close.get(&b.date).map(|prev| (*prev, b.close)));
            if let Some((series_close, contract_close)) = overlap {
                adjuster.update(series_close, contract_close);
            }
        }

        for bar in rows {
            if let Some(roll) = roll_date {
                if bar.date > roll {
                    break;
                }
            }

            //first writer wins for a given date
            if adjusted_close.contains_key(&bar.date) {
                continue;
            }

            let row = ContinuousBar {
                date: bar.date,
                contract: id.symbol.clone(),
                open: adjuster.apply(bar.open),
                high: adjuster.apply(bar.high),
                low: adjuster.apply(bar.low),
                close: adjuster.apply(bar.close),
                volume: bar.volume,
                open_interest: bar.open_interest,
            };

            adjusted_close.insert(bar.date, row.close);
            series.push(row);
        }
    }

    series.sort_by_key(|row| row.date);
    series
}
