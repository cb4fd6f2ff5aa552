//! Candle: the fundamental market data unit, and timestamp lookup over a candle series.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// OHLCV candle at the analyzer's base sampling period.
///
/// Only `high` and `low` take part in structure detection; `close` prices
/// signals and `open`/`volume` are carried through for downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Returns true if any OHLC field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// Basic OHLC sanity check: high >= low and open/close inside the range.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}

/// Outcome of looking a timestamp up in a candle series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarLookup {
    /// A candle with exactly this timestamp exists at the index.
    Exact(usize),
    /// No exact match; the index is the nearest candle before the timestamp.
    Prior(usize),
    /// The timestamp precedes the first candle (or the series is empty).
    BeforeStart,
}

impl BarLookup {
    /// Index of the matched bar, exact or prior.
    pub fn index(self) -> Option<usize> {
        match self {
            Self::Exact(i) | Self::Prior(i) => Some(i),
            Self::BeforeStart => None,
        }
    }
}

/// Read-only timestamp index over a strictly increasing candle series.
#[derive(Debug, Clone, Copy)]
pub struct Timeline<'a> {
    candles: &'a [Candle],
}

impl<'a> Timeline<'a> {
    pub fn new(candles: &'a [Candle]) -> Self {
        Self { candles }
    }

    /// Locate `ts`, falling back to the nearest prior bar.
    pub fn locate(&self, ts: NaiveDateTime) -> BarLookup {
        match self.candles.binary_search_by(|c| c.timestamp.cmp(&ts)) {
            Ok(i) => BarLookup::Exact(i),
            Err(0) => BarLookup::BeforeStart,
            Err(i) => BarLookup::Prior(i - 1),
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}

/// Indices from [`Timeline::locate`] are always in range.
impl std::ops::Index<usize> for Timeline<'_> {
    type Output = Candle;

    fn index(&self, index: usize) -> &Candle {
        &self.candles[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn sample_candle(day: u32) -> Candle {
        Candle {
            timestamp: ts(day),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn candle_is_sane() {
        assert!(sample_candle(2).is_sane());
    }

    #[test]
    fn candle_detects_void() {
        let mut candle = sample_candle(2);
        candle.close = f64::NAN;
        assert!(candle.is_void());
        assert!(!candle.is_sane());
    }

    #[test]
    fn candle_detects_inverted_range() {
        let mut candle = sample_candle(2);
        candle.high = 97.0;
        assert!(!candle.is_sane());
    }

    #[test]
    fn timeline_exact_prior_and_before_start() {
        let candles = vec![sample_candle(2), sample_candle(4), sample_candle(8)];
        let timeline = Timeline::new(&candles);

        assert_eq!(timeline.locate(ts(4)), BarLookup::Exact(1));
        assert_eq!(timeline.locate(ts(5)), BarLookup::Prior(1));
        assert_eq!(timeline.locate(ts(20)), BarLookup::Prior(2));
        assert_eq!(timeline.locate(ts(1)), BarLookup::BeforeStart);
        assert_eq!(timeline.locate(ts(5)).index(), Some(1));
        assert_eq!(BarLookup::BeforeStart.index(), None);
    }

    #[test]
    fn located_bars_index_the_timeline() {
        let candles = vec![sample_candle(2), sample_candle(4), sample_candle(8)];
        let timeline = Timeline::new(&candles);
        for day in 2..12 {
            if let Some(i) = timeline.locate(ts(day)).index() {
                assert!(timeline[i].timestamp <= ts(day));
                assert!(timeline[i].close.is_finite());
            }
        }
        assert_eq!(timeline[2].timestamp, ts(8));
    }

    #[test]
    fn timeline_on_empty_series() {
        let timeline = Timeline::new(&[]);
        assert!(timeline.is_empty());
        assert_eq!(timeline.locate(ts(3)), BarLookup::BeforeStart);
    }
}
