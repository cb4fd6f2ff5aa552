//! Deterministic synthetic candles.
//!
//! Two generators: a seeded random walk behind [`SyntheticProvider`], used when
//! no market data is at hand, and [`zigzag`], a piecewise-linear path through
//! given turning points whose structure is known in advance.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{CandleProvider, DataError};
use super::schema::candles_to_frame;
use crate::domain::Candle;

/// Half the high-low range of every zigzag bar.
pub const ZIGZAG_HALF_RANGE: f64 = 0.5;

/// Random-walk provider. The seed is derived from the symbol, so the same
/// symbol always yields the same table.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    start: NaiveDate,
    bars: usize,
}

impl SyntheticProvider {
    pub fn new(start: NaiveDate, bars: usize) -> Self {
        Self { start, bars }
    }

    pub fn candles(&self, symbol: &str) -> Vec<Candle> {
        random_walk(symbol, self.start, self.bars)
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap_or_default();
        Self::new(start, 500)
    }
}

impl CandleProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, symbol: &str) -> Result<DataFrame, DataError> {
        Ok(candles_to_frame(&self.candles(symbol))?)
    }
}

/// `bars` weekday candles starting at `start`, seeded from `symbol`.
pub fn random_walk(symbol: &str, start: NaiveDate, bars: usize) -> Vec<Candle> {
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut candles = Vec::with_capacity(bars);
    let mut price = 100.0_f64;
    let mut day = start;

    while candles.len() < bars {
        if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            day += Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000.0..5_000_000.0_f64).round();

        candles.push(Candle {
            timestamp: midnight(day),
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        day += Duration::days(1);
    }

    candles
}

/// Daily candles whose close moves linearly between `waypoints`, reaching
/// waypoint `k` at bar `k * leg_bars`.
///
/// Every bar spans `close ± 0.5` and opens at the previous close, clipped to
/// the bar's range. As long as each leg moves more than one unit per bar, no
/// two bars engulf and every interior waypoint is a confirmed fractal.
pub fn zigzag(waypoints: &[f64], leg_bars: usize) -> Vec<Candle> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let mut closes = Vec::new();

    if let Some(&first) = waypoints.first() {
        closes.push(first);
    }
    if leg_bars > 0 {
        for leg in waypoints.windows(2) {
            let step = (leg[1] - leg[0]) / leg_bars as f64;
            closes.extend((1..=leg_bars).map(|k| leg[0] + step * k as f64));
        }
    }

    let mut prev_close = closes.first().copied().unwrap_or_default();
    closes
        .into_iter()
        .enumerate()
        .map(|(i, close)| {
            let (high, low) = (close + ZIGZAG_HALF_RANGE, close - ZIGZAG_HALF_RANGE);
            let candle = Candle {
                timestamp: midnight(base + Duration::days(i as i64)),
                open: prev_close.clamp(low, high),
                high,
                low,
                close,
                volume: 1_000.0,
            };
            prev_close = close;
            candle
        })
        .collect()
}

fn midnight(day: NaiveDate) -> NaiveDateTime {
    day.and_time(chrono::NaiveTime::MIN)
}
