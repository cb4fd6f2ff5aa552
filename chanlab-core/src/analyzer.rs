//! The analyzer: one pure pass from candles to structure and signals.
//!
//! ```text
//! candles ─► inclusion ─► fractals ─► strokes ─► segments ─► centres ─► signals ─► delay
//! ```
//!
//! Every call builds a fresh [`Analysis`]; nothing is carried between calls.
//! Input is validated before the first stage: a bad schema, a non-finite
//! price or a timestamp that does not strictly increase aborts the call.
//! Too little data is not an error and yields empty lists.

use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::chan::inclusion::valid_count;
use crate::chan::{
    build_segments, classify, detect_centres, detector_for, normalize, AnnotationColumns,
    ConfirmationDelay, FractalDetector, StrokeBuilder,
};
use crate::config::{AnalyzerConfig, ConfigError, Lookahead, Mode};
use crate::data::schema::{CandleSchema, CLOSE, HIGH, LOW, OPEN, TIMESTAMP};
use crate::data::SchemaError;
use crate::domain::{CanonicalBar, Candle, Centre, Fractal, Segment, Signal, Stroke};
use crate::fingerprint::{self, AnalysisHash};

/// Fewest valid canonical bars that can hold a three-bar fractal.
pub const MIN_CANONICAL_BARS: usize = 3;

/// Broad error classes callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing column, wrong type or unusable value.
    Structural,
    /// Timestamps not strictly increasing.
    Ordering,
}

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("timestamp at row {row} ({current}) does not follow {previous}")]
    Ordering {
        row: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error("invalid {column} value at row {row}")]
    InvalidValue { column: &'static str, row: usize },

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl AnalyzeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Ordering { .. } => ErrorKind::Ordering,
            Self::Schema(_) | Self::InvalidValue { .. } | Self::Polars(_) => ErrorKind::Structural,
        }
    }
}

/// Everything one analyzer call produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub config: AnalyzerConfig,
    pub lookahead: Lookahead,
    /// One entry per input candle.
    pub canonical: Vec<CanonicalBar>,
    pub fractals: Vec<Fractal>,
    pub strokes: Vec<Stroke>,
    pub segments: Vec<Segment>,
    pub centres: Vec<Centre>,
    pub buy_signals: Vec<Signal>,
    pub sell_signals: Vec<Signal>,
}

impl Analysis {
    fn empty(config: AnalyzerConfig, canonical: Vec<CanonicalBar>) -> Self {
        Self {
            config,
            lookahead: config.lookahead(),
            canonical,
            fractals: Vec::new(),
            strokes: Vec::new(),
            segments: Vec::new(),
            centres: Vec::new(),
            buy_signals: Vec::new(),
            sell_signals: Vec::new(),
        }
    }

    /// True when no structure was found.
    pub fn is_empty(&self) -> bool {
        self.fractals.is_empty()
            && self.strokes.is_empty()
            && self.segments.is_empty()
            && self.centres.is_empty()
            && self.buy_signals.is_empty()
            && self.sell_signals.is_empty()
    }

    pub fn latest_buy(&self) -> Option<&Signal> {
        self.buy_signals.last()
    }

    pub fn latest_sell(&self) -> Option<&Signal> {
        self.sell_signals.last()
    }

    /// Derived per-bar columns for a table of `len` rows.
    pub fn annotation_columns(&self, len: usize) -> AnnotationColumns {
        AnnotationColumns::new(len)
            .with_canonical(&self.canonical)
            .with_fractals(&self.fractals)
            .with_fractal_confirmations(
                &self.fractals,
                ConfirmationDelay(self.config.effective_delay()),
            )
            .with_strokes(&self.strokes)
            .with_segments(&self.segments)
            .with_centres(&self.centres)
            .with_signals(&self.buy_signals, &self.sell_signals)
    }

    /// Copy of `table` with every derived column attached.
    pub fn annotate(&self, table: &DataFrame) -> PolarsResult<DataFrame> {
        self.annotation_columns(table.height()).join(table)
    }

    /// Content hash of the whole result, configuration included.
    pub fn fingerprint(&self) -> Result<AnalysisHash, serde_json::Error> {
        fingerprint::analysis_hash(self)
    }
}

/// An analysis together with the annotated candle table.
#[derive(Debug, Clone)]
pub struct AnnotatedAnalysis {
    pub analysis: Analysis,
    pub table: DataFrame,
}

/// Runs the pipeline for a fixed configuration. Cheap to share across threads.
pub struct Analyzer {
    config: AnalyzerConfig,
    detector: Box<dyn FractalDetector>,
    strokes: StrokeBuilder,
    delay: ConfirmationDelay,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("config", &self.config)
            .field("detector", &self.detector.name())
            .finish()
    }
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.mode == Mode::Online && config.confirmation_delay > 0 {
            warn!(
                delay = config.confirmation_delay,
                "confirmation delay has no effect in online mode"
            );
        }
        Ok(Self {
            config,
            detector: detector_for(config.mode),
            strokes: StrokeBuilder::from_config(&config),
            delay: ConfirmationDelay(config.effective_delay()),
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze a candle sequence in timestamp order.
    pub fn analyze(&self, candles: &[Candle]) -> Result<Analysis, AnalyzeError> {
        validate_candles(candles)?;

        let canonical = normalize(candles);
        let valid = valid_count(&canonical);
        if valid < MIN_CANONICAL_BARS {
            debug!(bars = candles.len(), valid, "too few canonical bars, nothing to analyze");
            return Ok(Analysis::empty(self.config, canonical));
        }

        let fractals = self.detector.detect(candles, &canonical);
        let strokes = self.strokes.build(&fractals);
        let segments = build_segments(&strokes);
        let centres = detect_centres(&segments);
        let signals = self
            .delay
            .apply(classify(&segments, &centres, candles), candles);

        debug!(
            detector = self.detector.name(),
            bars = candles.len(),
            valid,
            fractals = fractals.len(),
            strokes = strokes.len(),
            segments = segments.len(),
            centres = centres.len(),
            buys = signals.buy_signals.len(),
            sells = signals.sell_signals.len(),
            "analysis complete"
        );

        Ok(Analysis {
            config: self.config,
            lookahead: self.config.lookahead(),
            canonical,
            fractals,
            strokes,
            segments,
            centres,
            buy_signals: signals.buy_signals,
            sell_signals: signals.sell_signals,
        })
    }

    /// Validate a candle table, analyze it and join the derived columns back
    /// onto a copy of it.
    pub fn analyze_frame(&self, table: &DataFrame) -> Result<AnnotatedAnalysis, AnalyzeError> {
        let candles = candles_from_frame(table)?;
        let analysis = self.analyze(&candles)?;
        let table = analysis.annotate(table)?;
        Ok(AnnotatedAnalysis { analysis, table })
    }
}

/// Convert a candle table to candles, rejecting nulls and non-finite prices.
/// A null volume reads as zero.
pub fn candles_from_frame(table: &DataFrame) -> Result<Vec<Candle>, AnalyzeError> {
    let cols = CandleSchema::read(table)?;
    let mut candles = Vec::with_capacity(cols.len());

    for row in 0..cols.len() {
        let timestamp = cols.timestamp[row]
            .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
            .map(|dt| dt.naive_utc())
            .ok_or(AnalyzeError::InvalidValue {
                column: TIMESTAMP,
                row,
            })?;
        let price = |values: &[Option<f64>], column: &'static str| {
            values[row]
                .filter(|v| v.is_finite())
                .ok_or(AnalyzeError::InvalidValue { column, row })
        };
        candles.push(Candle {
            timestamp,
            open: price(&cols.open, OPEN)?,
            high: price(&cols.high, HIGH)?,
            low: price(&cols.low, LOW)?,
            close: price(&cols.close, CLOSE)?,
            volume: cols.volume[row].unwrap_or(0.0),
        });
    }

    validate_candles(&candles)?;
    Ok(candles)
}

/// Reject non-finite prices and timestamps that do not strictly increase.
pub fn validate_candles(candles: &[Candle]) -> Result<(), AnalyzeError> {
    for (row, c) in candles.iter().enumerate() {
        for (column, value) in [(OPEN, c.open), (HIGH, c.high), (LOW, c.low), (CLOSE, c.close)] {
            if !value.is_finite() {
                return Err(AnalyzeError::InvalidValue { column, row });
            }
        }
        if row > 0 && c.timestamp <= candles[row - 1].timestamp {
            return Err(AnalyzeError::Ordering {
                row,
                previous: candles[row - 1].timestamp,
                current: c.timestamp,
            });
        }
    }
    Ok(())
}
