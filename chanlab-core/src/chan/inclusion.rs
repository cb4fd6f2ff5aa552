//! Inclusion normalizer.
//!
//! Rewrites the (high, low) pair of each bar so that no valid bar engulfs, or
//! is engulfed by, its valid predecessor. When two adjacent bars engulf, the
//! pair is merged into the newer bar and the older bar is marked invalid:
//!
//! - up trend: high = max of highs, low = max of lows
//! - down trend: high = min of highs, low = min of lows
//!
//! The trend is the sign of the last non-engulfing step. Merging preserves it,
//! so in the valid subsequence every step moves both high and low the same way.

use crate::domain::{CanonicalBar, Candle, Direction};

/// Normalize a candle series into one canonical bar per input candle.
///
/// Invalid bars keep whatever values they had when they were absorbed.
pub fn normalize(candles: &[Candle]) -> Vec<CanonicalBar> {
    let mut bars: Vec<CanonicalBar> = candles
        .iter()
        .enumerate()
        .map(|(i, c)| CanonicalBar {
            bar_index: i,
            timestamp: c.timestamp,
            high: c.high,
            low: c.low,
            valid: true,
        })
        .collect();

    let mut trend: Option<Direction> = None;
    // Last valid bar before the current merge chain.
    let mut anchor: Option<usize> = None;

    for i in 1..bars.len() {
        let prev = bars[i - 1];
        let curr = bars[i];

        if !prev.engulfs(&curr) {
            trend = Some(if curr.high > prev.high {
                Direction::Up
            } else {
                Direction::Down
            });
            anchor = Some(i - 1);
            continue;
        }

        let direction = match trend {
            Some(d) => d,
            None => infer_trend(&bars, i),
        };

        let (high, low) = match direction {
            Direction::Up => (prev.high.max(curr.high), prev.low.max(curr.low)),
            Direction::Down => (prev.high.min(curr.high), prev.low.min(curr.low)),
        };
        bars[i].high = high;
        bars[i].low = low;
        bars[i - 1].valid = false;

        trend = match anchor.map(|a| bars[a].high) {
            Some(anchor_high) if high > anchor_high => Some(Direction::Up),
            Some(anchor_high) if high < anchor_high => Some(Direction::Down),
            _ => Some(direction),
        };
    }

    bars
}

/// Trend for a merge at `i` before any non-engulfing step has been seen.
///
/// Looks back for the first high that differs from bar `i - 1`; without one,
/// the current pair decides.
fn infer_trend(bars: &[CanonicalBar], i: usize) -> Direction {
    let prev_high = bars[i - 1].high;
    let earlier = bars[..i - 1]
        .iter()
        .rev()
        .map(|b| b.high)
        .find(|&h| h != prev_high);

    match earlier {
        Some(h) if prev_high > h => Direction::Up,
        Some(_) => Direction::Down,
        None if bars[i].high > prev_high => Direction::Up,
        None => Direction::Down,
    }
}

/// Number of valid bars in a canonical sequence.
pub fn valid_count(bars: &[CanonicalBar]) -> usize {
    bars.iter().filter(|b| b.valid).count()
}
