pub mod bar;
pub mod loader;
pub mod writer;

pub use bar::Bar;
pub use loader::{group_by_product, load_bars, load_signals, parse_date, SchemaError};
pub use writer::{
    write_continuous_csv, write_daily_summary_csv, write_ledger_csv, write_matched_csv,
};
