//! Batch analysis of many symbols.
//!
//! Each symbol is an independent analyzer call, so symbols run in parallel on
//! the rayon pool. A symbol that fails to load or validate is reported and
//! skipped; it never stops the rest of the scan.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::analyzer::{candles_from_frame, AnalyzeError, Analyzer};
use crate::config::{AnalyzerConfig, ConfigError};
use crate::data::{CandleProvider, DataError};
use crate::domain::Signal;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error("fingerprint: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Per-symbol result line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSummary {
    pub symbol: String,
    pub bars: usize,
    pub fractals: usize,
    pub strokes: usize,
    pub segments: usize,
    pub centres: usize,
    pub buy_signals: usize,
    pub sell_signals: usize,
    pub latest_buy: Option<Signal>,
    pub latest_sell: Option<Signal>,
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanFailure {
    pub symbol: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub config: AnalyzerConfig,
    /// In the order the symbols were given.
    pub summaries: Vec<SymbolSummary>,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    /// Symbols with at least one buy signal.
    pub fn with_buys(&self) -> impl Iterator<Item = &SymbolSummary> {
        self.summaries.iter().filter(|s| s.latest_buy.is_some())
    }
}

pub struct Scanner {
    analyzer: Analyzer,
    parallel: bool,
}

impl Scanner {
    pub fn new(config: AnalyzerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            analyzer: Analyzer::new(config)?,
            parallel: true,
        })
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn scan(&self, provider: &dyn CandleProvider, symbols: &[String]) -> ScanReport {
        let results: Vec<(String, Result<SymbolSummary, ScanError>)> = if self.parallel {
            symbols
                .par_iter()
                .map(|s| (s.clone(), self.scan_symbol(provider, s)))
                .collect()
        } else {
            symbols
                .iter()
                .map(|s| (s.clone(), self.scan_symbol(provider, s)))
                .collect()
        };

        let mut summaries = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (symbol, result) in results {
            match result {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "symbol skipped");
                    failures.push(ScanFailure {
                        symbol,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            provider = provider.name(),
            analyzed = summaries.len(),
            failed = failures.len(),
            "scan complete"
        );

        ScanReport {
            config: *self.analyzer.config(),
            summaries,
            failures,
        }
    }

    fn scan_symbol(
        &self,
        provider: &dyn CandleProvider,
        symbol: &str,
    ) -> Result<SymbolSummary, ScanError> {
        let table = provider.fetch(symbol)?;
        let candles = candles_from_frame(&table)?;
        let analysis = self.analyzer.analyze(&candles)?;

        Ok(SymbolSummary {
            symbol: symbol.to_string(),
            bars: candles.len(),
            fractals: analysis.fractals.len(),
            strokes: analysis.strokes.len(),
            segments: analysis.segments.len(),
            centres: analysis.centres.len(),
            buy_signals: analysis.buy_signals.len(),
            sell_signals: analysis.sell_signals.len(),
            latest_buy: analysis.latest_buy().cloned(),
            latest_sell: analysis.latest_sell().cloned(),
            fingerprint: analysis.fingerprint()?.0,
        })
    }
}

/// Scan `symbols` with a fresh parallel [`Scanner`].
pub fn scan_universe(
    provider: &dyn CandleProvider,
    symbols: &[String],
    config: AnalyzerConfig,
) -> Result<ScanReport, ConfigError> {
    Ok(Scanner::new(config)?.scan(provider, symbols))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SyntheticProvider;
    use polars::prelude::DataFrame;

    struct FailingProvider;

    impl CandleProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn fetch(&self, symbol: &str) -> Result<DataFrame, DataError> {
            if symbol == "BAD" {
                Err(DataError::NotFound {
                    symbol: symbol.to_string(),
                    dir: "nowhere".into(),
                })
            } else {
                SyntheticProvider::default().fetch(symbol)
            }
        }
    }

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn failures_do_not_stop_the_scan() {
        let report = scan_universe(
            &FailingProvider,
            &symbols(&["AAA", "BAD", "CCC"]),
            AnalyzerConfig::default(),
        )
        .unwrap();
        assert_eq!(report.summaries.len(), 2);
        assert_eq!(report.summaries[0].symbol, "AAA");
        assert_eq!(report.summaries[1].symbol, "CCC");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].symbol, "BAD");
    }

    #[test]
    fn parallel_matches_sequential() {
        let names = symbols(&["SPY", "QQQ", "IWM", "DIA"]);
        let provider = SyntheticProvider::default();
        let config = AnalyzerConfig::default().with_delay(1);
        let parallel = Scanner::new(config).unwrap().scan(&provider, &names);
        let sequential = Scanner::new(config)
            .unwrap()
            .with_parallelism(false)
            .scan(&provider, &names);
        assert_eq!(parallel, sequential);
        assert!(parallel.summaries.iter().all(|s| s.bars == 500));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let err = scan_universe(
            &SyntheticProvider::default(),
            &symbols(&["SPY"]),
            AnalyzerConfig::default().with_delay(9),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDelay(9)));
    }
}
