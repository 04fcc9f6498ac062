//a Rust-based continuous contract builder and signal PnL tracker for futures market data

pub mod config;
pub mod continuous;
pub mod data;
pub mod instrument;
pub mod report;
pub mod tracker;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{BatchConfiguration, ContinuousJob};
    pub use crate::continuous::{
        build_continuous, AdjustMethod, Adjuster, ContinuousBar, ContinuousParams, RollStrategy,
    };
    pub use crate::data::{
        group_by_product, load_bars, load_signals, write_continuous_csv, write_daily_summary_csv,
        write_ledger_csv, write_matched_csv, Bar,
    };
    pub use crate::instrument::{product_prefix, ContractId, ParseError};
    pub use crate::report::{BatchStats, TradeSummary};
    pub use crate::tracker::{
        track_signals, DailySummary, Direction, LedgerRow, LookupError, MajorsTable,
        MatchedPosition, Position, Signal, TrackResult, TrackerParams,
    };
}
