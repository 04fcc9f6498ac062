pub mod ledger;
pub mod matcher;
pub mod position;

pub use ledger::{
    daily_ledger, matched_report, track_signals, DailySummary, LedgerRow, MatchedPosition,
    TrackResult,
};
pub use matcher::{open_position, open_positions, LookupError, MajorsTable, TrackerParams};
pub use position::{Direction, Position, Signal};
