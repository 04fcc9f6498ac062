use crate::data::bar::Bar;
use crate::instrument::product_prefix;
use crate::tracker::{Direction, Signal};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use indexmap::IndexMap;
use log::warn;
use std::path::Path;
use thiserror::Error;

//ordered alias tables per logical field, first match wins
//resolved once per input schema, never per row
const DATE_ALIASES: &[&str] = &["date", "trade_date", "trading_day"];
const CONTRACT_ALIASES: &[&str] = &[
    "contract",
    "contract_code",
    "delivery_month",
    "symbol",
    "instrument_id",
];
const EXCHANGE_ALIASES: &[&str] = &["exchange"];
const OPEN_ALIASES: &[&str] = &["open", "open_price", "open_px"];
const HIGH_ALIASES: &[&str] = &["high", "high_price", "high_px"];
const LOW_ALIASES: &[&str] = &["low", "low_price", "low_px"];
const CLOSE_ALIASES: &[&str] = &["close", "close_price", "close_px"];
const SETTLEMENT_ALIASES: &[&str] = &["settlement", "settle", "settlement_price"];
const VOLUME_ALIASES: &[&str] = &["volume", "vol", "turnover"];
const OPEN_INTEREST_ALIASES: &[&str] = &["open_interest", "oi", "position"];

const SIGNAL_POSITION_ALIASES: &[&str] = &["position", "direction"];
const SIGNAL_AMOUNT_ALIASES: &[&str] = &["amount", "notional_amount"];
const SIGNAL_PRODUCT_ALIASES: &[&str] = &["product"];

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("required column '{field}' not found, tried aliases {aliases:?}")]
    MissingColumn {
        field: &'static str,
        aliases: &'static [&'static str],
    },
}

fn find_column(headers: &StringRecord, aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.iter().any(|a| h.trim().eq_ignore_ascii_case(a)))
}

fn require_column(
    headers: &StringRecord,
    field: &'static str,
    aliases: &'static [&'static str],
) -> Result<usize, SchemaError> {
    find_column(headers, aliases).ok_or(SchemaError::MissingColumn { field, aliases })
}

//resolved column layout of a bar table csv
#[derive(Debug, Clone)]
struct BarSchema {
    date: usize,
    contract: usize,
    exchange: Option<usize>,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    settlement: Option<usize>,
    volume: Option<usize>,
    open_interest: Option<usize>,
}

impl BarSchema {
    fn resolve(headers: &StringRecord) -> Result<Self, SchemaError> {
        Ok(BarSchema {
            date: require_column(headers, "date", DATE_ALIASES)?,
            contract: require_column(headers, "contract", CONTRACT_ALIASES)?,
            exchange: find_column(headers, EXCHANGE_ALIASES),
            open: require_column(headers, "open", OPEN_ALIASES)?,
            high: require_column(headers, "high", HIGH_ALIASES)?,
            low: require_column(headers, "low", LOW_ALIASES)?,
            close: require_column(headers, "close", CLOSE_ALIASES)?,
            settlement: find_column(headers, SETTLEMENT_ALIASES),
            volume: find_column(headers, VOLUME_ALIASES),
            open_interest: find_column(headers, OPEN_INTEREST_ALIASES),
        })
    }
}

//parses a trading day given as an 8-digit integer (20210901) or an iso date
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(raw, "%Y%m%d").ok();
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y/%m/%d"))
        .ok()
}

fn field<'a>(record: &'a StringRecord, idx: usize) -> Option<&'a str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn float_field(record: &StringRecord, idx: usize) -> Option<f64> {
    field(record, idx).and_then(|s| s.parse().ok())
}

//loads a bar table csv, resolving column names through the alias tables
//rows with an unparseable date or price are logged and skipped
pub fn load_bars<P: AsRef<Path>>(path: P) -> Result<Vec<Bar>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let schema = BarSchema::resolve(reader.headers()?)
        .context(format!("Unusable bar table schema in {:?}", path))?;

    let mut bars = Vec::new();
    let mut skipped = 0usize;

    for (index, result) in reader.records().enumerate() {
        let line = index + 2;
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warn!("{:?} line {}: unreadable record: {}", path, line, err);
                skipped += 1;
                continue;
            }
        };

        let date = field(&record, schema.date).and_then(parse_date);
        let contract = field(&record, schema.contract);
        let open = float_field(&record, schema.open);
        let high = float_field(&record, schema.high);
        let low = float_field(&record, schema.low);
        let close = float_field(&record, schema.close);

        let (date, contract, open, high, low, close) = match (date, contract, open, high, low, close)
        {
            (Some(d), Some(c), Some(o), Some(h), Some(l), Some(cl)) => (d, c, o, h, l, cl),
            _ => {
                warn!("{:?} line {}: unparseable bar row, skipping", path, line);
                skipped += 1;
                continue;
            }
        };

        let bar = Bar::new_unchecked(
            date,
            contract.to_string(),
            schema
                .exchange
                .and_then(|idx| field(&record, idx))
                .map(str::to_string),
            open,
            high,
            low,
            close,
            schema.settlement.and_then(|idx| float_field(&record, idx)),
            schema
                .volume
                .and_then(|idx| float_field(&record, idx))
                .unwrap_or(0.0),
            schema
                .open_interest
                .and_then(|idx| float_field(&record, idx))
                .unwrap_or(0.0),
        );

        bars.push(bar);
    }

    if skipped > 0 {
        warn!("{:?}: skipped {} unparseable bar rows", path, skipped);
    }

    //sort by date to ensure chronological order
    bars.sort_by_key(|bar| bar.date);

    Ok(bars)
}

//loads entry signals (date, product, position, amount)
//products are canonicalized to uppercase at ingestion
pub fn load_signals<P: AsRef<Path>>(path: P) -> Result<Vec<Signal>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .context(format!("Failed to open signals file: {:?}", path))?;

    let headers = reader.headers()?;
    let date_idx = require_column(headers, "date", DATE_ALIASES)
        .context(format!("Unusable signals schema in {:?}", path))?;
    let product_idx = require_column(headers, "product", SIGNAL_PRODUCT_ALIASES)
        .context(format!("Unusable signals schema in {:?}", path))?;
    let position_idx = require_column(headers, "position", SIGNAL_POSITION_ALIASES)
        .context(format!("Unusable signals schema in {:?}", path))?;
    let amount_idx = require_column(headers, "amount", SIGNAL_AMOUNT_ALIASES)
        .context(format!("Unusable signals schema in {:?}", path))?;

    let mut signals = Vec::new();
    let mut skipped = 0usize;

    for (index, result) in reader.records().enumerate() {
        let line = index + 2;
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warn!("{:?} line {}: unreadable record: {}", path, line, err);
                skipped += 1;
                continue;
            }
        };

        let date = field(&record, date_idx).and_then(parse_date);
        let product = field(&record, product_idx);
        let direction = field(&record, position_idx).and_then(Direction::parse);
        let amount = float_field(&record, amount_idx);

        match (date, product, direction, amount) {
            (Some(date), Some(product), Some(direction), Some(amount)) => signals.push(Signal {
                date,
                product: product.to_uppercase(),
                direction,
                amount,
            }),
            _ => {
                warn!("{:?} line {}: unparseable signal row, skipping", path, line);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("{:?}: skipped {} unparseable signal rows", path, skipped);
    }

    Ok(signals)
}

//groups bars by uppercase product code derived from the contract symbol
//rows whose contract has no alphabetic prefix are logged and skipped
pub fn group_by_product(bars: &[Bar]) -> IndexMap<String, Vec<Bar>> {
    let mut products: IndexMap<String, Vec<Bar>> = IndexMap::new();

    for bar in bars {
        match product_prefix(&bar.contract) {
            Some(prefix) => products
                .entry(prefix.to_uppercase())
                .or_default()
                .push(bar.clone()),
            None => warn!(
                "contract {:?} on {} has no product prefix, skipping",
                bar.contract, bar.date
            ),
        }
    }

    products
}
