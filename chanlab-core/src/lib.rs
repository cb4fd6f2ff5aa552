//! ChanLab Core — Chan structural analysis of OHLCV candle series.
//!
//! This crate contains:
//! - Domain types (candles, canonical bars, fractals, strokes, segments, centres, signals)
//! - The pipeline stages, leaf-first, in [`chan`]
//! - The [`Analyzer`] that composes them and validates its input
//! - Candle table schema, file and synthetic providers, universe files
//! - Result fingerprints and a parallel multi-symbol scan

pub mod analyzer;
pub mod chan;
pub mod config;
pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod scan;

pub use analyzer::{AnalyzeError, Analysis, Analyzer, AnnotatedAnalysis, ErrorKind};
pub use config::{AnalyzerConfig, BarType, ConfigError, Mode, StrokeRule};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: results and the analyzer can cross threads.
    ///
    /// The scan hands one analyzer to every rayon worker and ships results back.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Analyzer>();
        require_sync::<Analyzer>();
        require_send::<Analysis>();
        require_sync::<Analysis>();
        require_send::<AnnotatedAnalysis>();
        require_sync::<AnnotatedAnalysis>();
        require_send::<AnalyzeError>();
        require_sync::<AnalyzeError>();

        require_send::<domain::Candle>();
        require_sync::<domain::Candle>();
        require_send::<domain::Signal>();
        require_sync::<domain::Signal>();
        require_send::<domain::Centre>();
        require_sync::<domain::Centre>();

        require_send::<scan::Scanner>();
        require_sync::<scan::Scanner>();
        require_send::<scan::ScanReport>();
        require_sync::<scan::ScanReport>();
        require_send::<data::FileProvider>();
        require_sync::<data::FileProvider>();
        require_send::<data::SyntheticProvider>();
        require_sync::<data::SyntheticProvider>();
        require_send::<Box<dyn chan::FractalDetector>>();
        require_sync::<Box<dyn chan::FractalDetector>>();
    }
}
