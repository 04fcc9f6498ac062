use crate::continuous::ContinuousBar;
use crate::tracker::{DailySummary, LedgerRow, MatchedPosition};
use anyhow::{Context, Result};
use csv::Writer;
use serde::Serialize;
use std::fs;
use std::path::Path;

//serializes rows to a temporary path in the target directory, then renames
//into place so a crash cannot leave a truncated output file behind
fn write_rows<T: Serialize, P: AsRef<Path>>(path: P, rows: &[T]) -> Result<()> {
    let path = path.as_ref();
    let tmp = path.with_extension("tmp");

    {
        let mut writer = Writer::from_path(&tmp)
            .context(format!("Failed to create output file: {:?}", tmp))?;

        for row in rows {
            writer.serialize(row)?;
        }

        writer
            .flush()
            .context(format!("Failed to flush output file: {:?}", tmp))?;
    }

    fs::rename(&tmp, path).context(format!("Failed to move output into place: {:?}", path))?;

    Ok(())
}

//writes a continuous series (date, contract, ohlc, volume, open_interest)
pub fn write_continuous_csv<P: AsRef<Path>>(path: P, rows: &[ContinuousBar]) -> Result<()> {
    write_rows(path, rows)
}

//writes the per-position per-day ledger
pub fn write_ledger_csv<P: AsRef<Path>>(path: P, rows: &[LedgerRow]) -> Result<()> {
    write_rows(path, rows)
}

//writes the per (date, product) pnl breakdown
pub fn write_daily_summary_csv<P: AsRef<Path>>(path: P, rows: &[DailySummary]) -> Result<()> {
    write_rows(path, rows)
}

//writes the matched-signals report, one row per position
pub fn write_matched_csv<P: AsRef<Path>>(path: P, rows: &[MatchedPosition]) -> Result<()> {
    write_rows(path, rows)
}
