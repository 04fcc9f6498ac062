use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, warn};
use rollkit::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rollkit")]
#[command(about = "A continuous contract builder and signal PnL tracker for futures data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //build continuous adjusted series from per-contract bars
    Continuous {
        //path to bar table csv
        #[arg(long)]
        data: PathBuf,

        //product code (every product in the data when omitted)
        #[arg(long)]
        product: Option<String>,

        //roll strategy (volume, oi, time, fixed)
        #[arg(long, default_value = "volume")]
        roll_strategy: String,

        //price adjustment method (backward, forward, ratio, difference, none)
        #[arg(long, default_value = "backward")]
        adjust_method: String,

        //contract months to keep in the roll sequence (eg 3 6 9 12)
        #[arg(long, num_args = 1..)]
        contract_months: Option<Vec<u32>>,

        //days before expiry to roll (time strategy)
        #[arg(long, default_value = "0")]
        dominant_days: i64,

        //days before month end to roll (fixed strategy)
        #[arg(long, default_value = "0")]
        rollover_days: i64,

        //output directory for continuous csv files
        #[arg(long, default_value = "continuous")]
        output_dir: PathBuf,
    },

    //track entry signals against a majors table and write pnl ledgers
    Track {
        //path to majors/continuous csv
        #[arg(long)]
        majors: PathBuf,

        //path to signals csv
        #[arg(long)]
        signals: PathBuf,

        //sessions from open to close
        #[arg(long, default_value = "10")]
        holding_days: usize,

        //output directory for ledger csv files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    //run several continuous jobs from a json configuration
    Batch {
        //path to json batch configuration
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Continuous {
            data,
            product,
            roll_strategy,
            adjust_method,
            contract_months,
            dominant_days,
            rollover_days,
            output_dir,
        } => {
            run_continuous(
                data,
                product,
                roll_strategy,
                adjust_method,
                contract_months,
                dominant_days,
                rollover_days,
                output_dir,
            )?;
        }
        Commands::Track {
            majors,
            signals,
            holding_days,
            output_dir,
        } => {
            run_track(majors, signals, holding_days, output_dir)?;
        }
        Commands::Batch { config } => {
            run_batch(config)?;
        }
    }

    Ok(())
}

//builds one product's series and writes it, keeping the batch counters current
fn build_and_write(
    product: &str,
    bars: &[Bar],
    params: &ContinuousParams,
    output_dir: &Path,
    stats: &mut BatchStats,
) {
    let series = build_continuous(bars, params);

    if series.is_empty() {
        warn!("no continuous rows for product {}, skipping", product);
        stats.skipped += 1;
        return;
    }

    let filename = format!(
        "{}_continuous_{}_{}.csv",
        product.to_lowercase(),
        params.roll_strategy.as_str(),
        params.adjust_method.as_str()
    );
    let path = output_dir.join(filename);

    match write_continuous_csv(&path, &series) {
        Ok(()) => {
            println!("{}: {} rows -> {:?}", product, series.len(), path);
            stats.processed += 1;
        }
        Err(err) => {
            error!("failed to write {:?}: {:#}", path, err);
            stats.failed += 1;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_continuous(
    data: PathBuf,
    product: Option<String>,
    roll_strategy_name: String,
    adjust_method_name: String,
    contract_months: Option<Vec<u32>>,
    dominant_days: i64,
    rollover_days: i64,
    output_dir: PathBuf,
) -> Result<()> {
    println!("Rollkit Continuous Series Builder");
    println!("=================================\n");

    let roll_strategy = RollStrategy::parse(&roll_strategy_name)
        .ok_or_else(|| anyhow::anyhow!("Unknown roll strategy: {}", roll_strategy_name))?;
    let adjust_method = AdjustMethod::parse(&adjust_method_name)
        .ok_or_else(|| anyhow::anyhow!("Unknown adjustment method: {}", adjust_method_name))?;

    println!("Loading data from {:?}...", data);
    let bars = load_bars(&data).context(format!("Failed to load data from {:?}", data))?;
    println!("Loaded {} bars", bars.len());

    let products = group_by_product(&bars);
    if products.is_empty() {
        anyhow::bail!("No usable contracts found in {:?}", data);
    }

    println!("Roll strategy: {}", roll_strategy.as_str());
    println!("Adjustment method: {}", adjust_method.as_str());
    if let Some(months) = &contract_months {
        println!("Contract months: {:?}", months);
    }
    println!();

    let params = ContinuousParams {
        roll_strategy,
        adjust_method,
        contract_months,
        dominant_days,
        rollover_days,
    };

    fs::create_dir_all(&output_dir)
        .context(format!("Failed to create output directory {:?}", output_dir))?;

    let mut stats = BatchStats::new();

    match product {
        Some(p) => {
            let key = p.to_uppercase();
            let bars = products
                .get(&key)
                .ok_or_else(|| anyhow::anyhow!("No data found for product {}", p))?;
            build_and_write(&key, bars, &params, &output_dir, &mut stats);
        }
        None => {
            for (name, bars) in &products {
                build_and_write(name, bars, &params, &output_dir, &mut stats);
            }
        }
    }

    println!("\nBatch complete: {}", stats);

    Ok(())
}

fn run_track(
    majors_path: PathBuf,
    signals_path: PathBuf,
    holding_days: usize,
    output_dir: PathBuf,
) -> Result<()> {
    println!("Rollkit Position Tracker");
    println!("========================\n");

    println!("Loading majors from {:?}...", majors_path);
    let rows = load_bars(&majors_path)
        .context(format!("Failed to load majors from {:?}", majors_path))?;

    if rows.is_empty() {
        anyhow::bail!("No majors rows found in {:?}", majors_path);
    }

    let majors = MajorsTable::new(rows);
    println!("Calendar spans {} trading days", majors.trading_days().len());

    println!("Loading signals from {:?}...", signals_path);
    let signals = load_signals(&signals_path)
        .context(format!("Failed to load signals from {:?}", signals_path))?;
    println!("Loaded {} signals", signals.len());
    println!("Holding period: {} sessions\n", holding_days);

    let params = TrackerParams { holding_days };
    let result = track_signals(&signals, &majors, &params);

    fs::create_dir_all(&output_dir)
        .context(format!("Failed to create output directory {:?}", output_dir))?;

    write_ledger_csv(output_dir.join("daily_pnl_tracking.csv"), &result.ledger)?;
    write_daily_summary_csv(output_dir.join("daily_pnl_summary.csv"), &result.summaries)?;
    write_matched_csv(
        output_dir.join("matched_signals_with_profit.csv"),
        &result.matched,
    )?;

    println!(
        "Wrote {} ledger rows, {} daily summaries, {} matched positions to {:?}",
        result.ledger.len(),
        result.summaries.len(),
        result.matched.len(),
        output_dir
    );

    println!("\nTracking Results");
    println!("================\n");
    let summary = TradeSummary::from_matched(&result.matched);
    summary.pretty_print_table();

    println!("\nSignals: {}", result.stats);

    Ok(())
}

fn run_batch(config_path: PathBuf) -> Result<()> {
    println!("Rollkit Batch Runner");
    println!("====================\n");

    let config = BatchConfiguration::from_json_file(&config_path).context(format!(
        "Failed to load batch configuration from {:?}",
        config_path
    ))?;

    println!("Loading data from {:?}...", config.data_path);
    let bars = load_bars(&config.data_path)
        .context(format!("Failed to load data from {:?}", config.data_path))?;
    println!("Loaded {} bars", bars.len());

    let products = group_by_product(&bars);

    fs::create_dir_all(&config.output_dir).context(format!(
        "Failed to create output directory {:?}",
        config.output_dir
    ))?;

    let mut stats = BatchStats::new();

    for (index, job) in config.jobs.iter().enumerate() {
        println!(
            "\nJob {}: roll={}, adjust={}",
            index + 1,
            job.roll_strategy.as_str(),
            job.adjust_method.as_str()
        );

        let params = job.to_params();

        match &job.product {
            Some(p) => {
                let key = p.to_uppercase();
                match products.get(&key) {
                    Some(bars) => build_and_write(&key, bars, &params, &config.output_dir, &mut stats),
                    None => {
                        error!("no data for product {} in job {}", p, index + 1);
                        stats.failed += 1;
                    }
                }
            }
            None => {
                for (name, bars) in &products {
                    build_and_write(name, bars, &params, &config.output_dir, &mut stats);
                }
            }
        }
    }

    println!("\nBatch complete: {}", stats);

    Ok(())
}
