//! Universe file: symbols to scan, grouped by sector.
//!
//! ```toml
//! [sectors]
//! Technology = ["AAPL", "MSFT"]
//! ETFs = ["SPY", "QQQ"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub sectors: BTreeMap<String, Vec<String>>,
}

impl Universe {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Every symbol, sector by sector in name order, without duplicates.
    pub fn all_tickers(&self) -> Vec<&str> {
        let mut seen = std::collections::BTreeSet::new();
        self.sectors
            .values()
            .flatten()
            .map(String::as_str)
            .filter(|t| seen.insert(*t))
            .collect()
    }

    pub fn sector_tickers(&self, sector: &str) -> Option<&[String]> {
        self.sectors.get(sector).map(Vec::as_slice)
    }

    pub fn sector_names(&self) -> Vec<&str> {
        self.sectors.keys().map(String::as_str).collect()
    }

    /// Symbols for one sector, or the whole universe when `sector` is `None`.
    pub fn select(&self, sector: Option<&str>) -> Result<Vec<String>, ConfigError> {
        match sector {
            None => Ok(self.all_tickers().into_iter().map(String::from).collect()),
            Some(name) => self
                .sector_tickers(name)
                .map(<[String]>::to_vec)
                .ok_or_else(|| ConfigError::UnknownSector(name.to_string())),
        }
    }
}
