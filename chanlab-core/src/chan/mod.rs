//! Chan structural pipeline stages.
//!
//! Leaf-first, strictly forward:
//! inclusion → fractals → strokes → segments → centres → signals.
//! Each stage is a pure function of earlier outputs (plus the candles); the
//! optional confirmation delay re-times signals afterwards and the annotation
//! join writes everything back onto the candle table.

pub mod annotate;
pub mod centre;
pub mod classifier;
pub mod delay;
pub mod fractal;
pub mod inclusion;
pub mod segment;
pub mod stroke;

pub use annotate::AnnotationColumns;
pub use centre::detect_centres;
pub use classifier::{classify, Classification};
pub use delay::ConfirmationDelay;
pub use fractal::{detector_for, ConfirmedDetector, FractalDetector, OnlineDetector};
pub use inclusion::normalize;
pub use segment::build_segments;
pub use stroke::StrokeBuilder;

/// Build candles from (high, low) pairs for stage tests.
///
/// Daily timestamps from 2024-01-01; open and close sit at the midpoint.
#[cfg(test)]
pub fn make_candles(ranges: &[(f64, f64)]) -> Vec<crate::domain::Candle> {
    use crate::domain::Candle;
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    ranges
        .iter()
        .enumerate()
        .map(|(i, &(high, low))| {
            let mid = (high + low) / 2.0;
            Candle {
                timestamp: base + chrono::Duration::days(i as i64),
                open: mid,
                high,
                low,
                close: mid,
                volume: 1000.0,
            }
        })
        .collect()
}
