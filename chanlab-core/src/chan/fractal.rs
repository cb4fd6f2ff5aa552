//! Fractal detection.
//!
//! Two detectors share one trait so the rest of the pipeline is written once:
//!
//! - [`ConfirmedDetector`] scans windows of three consecutive *valid* canonical
//!   bars. Deciding about bar `i` reads bar `i + 1`.
//! - [`OnlineDetector`] compares each raw candle with the one before it and
//!   never reads past the bar it marks.

use crate::config::Mode;
use crate::domain::{CanonicalBar, Candle, Fractal, FractalKind};

/// Strategy for turning bars into top/bottom pivots.
pub trait FractalDetector: Send + Sync {
    fn name(&self) -> &str;

    /// Bars past the pivot this detector reads before deciding about it.
    fn lookahead(&self) -> usize;

    /// Detect fractals in bar order.
    ///
    /// `canonical` is the inclusion output for `candles` (same length).
    fn detect(&self, candles: &[Candle], canonical: &[CanonicalBar]) -> Vec<Fractal>;
}

/// Retrospective three-bar pivots on the canonical sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfirmedDetector;

impl FractalDetector for ConfirmedDetector {
    fn name(&self) -> &str {
        "confirmed"
    }

    fn lookahead(&self) -> usize {
        1
    }

    fn detect(&self, _candles: &[Candle], canonical: &[CanonicalBar]) -> Vec<Fractal> {
        let valid: Vec<&CanonicalBar> = canonical.iter().filter(|b| b.valid).collect();

        valid
            .windows(3)
            .filter_map(|w| {
                let (left, mid, right) = (w[0], w[1], w[2]);
                let kind = if mid.high > left.high
                    && mid.high > right.high
                    && mid.low > left.low
                    && mid.low > right.low
                {
                    FractalKind::Top
                } else if mid.low < left.low
                    && mid.low < right.low
                    && mid.high < left.high
                    && mid.high < right.high
                {
                    FractalKind::Bottom
                } else {
                    return None;
                };
                Some(Fractal {
                    bar_index: mid.bar_index,
                    timestamp: mid.timestamp,
                    kind,
                    high: mid.high,
                    low: mid.low,
                    confirmed: true,
                })
            })
            .collect()
    }
}

/// Causal two-bar pivots on raw candles.
///
/// Noisier than the confirmed detector; consecutive fractals may share a kind
/// and the stroke builder skips the repeats.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnlineDetector;

impl FractalDetector for OnlineDetector {
    fn name(&self) -> &str {
        "online"
    }

    fn lookahead(&self) -> usize {
        0
    }

    fn detect(&self, candles: &[Candle], _canonical: &[CanonicalBar]) -> Vec<Fractal> {
        candles
            .windows(2)
            .enumerate()
            .filter_map(|(i, w)| {
                let (prev, curr) = (&w[0], &w[1]);
                let kind = if curr.high > prev.high && curr.low > prev.low {
                    FractalKind::Top
                } else if curr.high < prev.high && curr.low < prev.low {
                    FractalKind::Bottom
                } else {
                    return None;
                };
                Some(Fractal {
                    bar_index: i + 1,
                    timestamp: curr.timestamp,
                    kind,
                    high: curr.high,
                    low: curr.low,
                    confirmed: false,
                })
            })
            .collect()
    }
}

/// Detector for the configured mode.
pub fn detector_for(mode: Mode) -> Box<dyn FractalDetector> {
    match mode {
        Mode::Confirmed => Box::new(ConfirmedDetector),
        Mode::Online => Box::new(OnlineDetector),
    }
}
