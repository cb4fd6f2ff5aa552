//! Candle tables: schema contract, file I/O, providers and the scan universe.

pub mod ingest;
pub mod provider;
pub mod schema;
pub mod synthetic;
pub mod universe;

pub use ingest::{read_table, write_table};
pub use provider::{CandleProvider, DataError, FileProvider};
pub use schema::{candles_to_frame, CandleColumns, CandleSchema, SchemaError};
pub use synthetic::{random_walk, zigzag, SyntheticProvider};
pub use universe::Universe;
