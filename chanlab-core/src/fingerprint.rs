//! Content hashes for determinism checks.
//!
//! - `AnalysisHash`: BLAKE3 over the canonical JSON of an [`Analysis`],
//!   configuration included. Two runs over the same candles with the same
//!   configuration must produce the same hash.
//! - `DatasetHash`: BLAKE3 over the candles themselves, so a report can say
//!   which input it was computed from.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analyzer::Analysis;
use crate::domain::Candle;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisHash(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl fmt::Display for AnalysisHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Struct fields serialize in declaration order, so the JSON stream (and the
/// hash) is stable across runs and platforms.
fn hash_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut hasher = blake3::Hasher::new();
    serde_json::to_writer(&mut hasher, value)?;
    Ok(hasher.finalize().to_hex().to_string())
}

pub fn analysis_hash(analysis: &Analysis) -> Result<AnalysisHash, serde_json::Error> {
    hash_json(analysis).map(AnalysisHash)
}

pub fn dataset_hash(candles: &[Candle]) -> Result<DatasetHash, serde_json::Error> {
    hash_json(&candles).map(DatasetHash)
}
