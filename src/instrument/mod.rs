pub mod contract;

pub use contract::{product_prefix, ContractId, ParseError};
