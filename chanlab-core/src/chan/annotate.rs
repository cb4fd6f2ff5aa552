//! Join-back of derived columns onto the candle table.
//!
//! Columns are computed into plain vectors first, then attached to a copy of
//! the input frame. Where structures share a bar (a stroke's end is the next
//! stroke's start), the later structure wins.

use polars::prelude::*;

use super::delay::ConfirmationDelay;
use crate::domain::{CanonicalBar, Centre, Fractal, Segment, Signal, Stroke};

pub const CANONICAL_HIGH: &str = "canonical_high";
pub const CANONICAL_LOW: &str = "canonical_low";
pub const CANONICAL_VALID: &str = "canonical_valid";
pub const FRACTAL_KIND: &str = "fractal_kind";
pub const FRACTAL_KNOWN: &str = "fractal_known";
pub const STROKE_DIRECTION: &str = "stroke_direction";
pub const SEGMENT_DIRECTION: &str = "segment_direction";
pub const CENTRE_HIGH: &str = "centre_high";
pub const CENTRE_LOW: &str = "centre_low";
pub const BUY_POINT: &str = "buy_point";
pub const SELL_POINT: &str = "sell_point";

/// Every derived column, in join order.
pub const DERIVED_COLUMNS: [&str; 11] = [
    CANONICAL_HIGH,
    CANONICAL_LOW,
    CANONICAL_VALID,
    FRACTAL_KIND,
    FRACTAL_KNOWN,
    STROKE_DIRECTION,
    SEGMENT_DIRECTION,
    CENTRE_HIGH,
    CENTRE_LOW,
    BUY_POINT,
    SELL_POINT,
];

/// Per-bar derived values, one entry per input candle.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationColumns {
    pub canonical_high: Vec<f64>,
    pub canonical_low: Vec<f64>,
    pub canonical_valid: Vec<bool>,
    pub fractal_kind: Vec<i32>,
    /// Kind of the fractal that becomes usable on this bar.
    pub fractal_known: Vec<i32>,
    pub stroke_direction: Vec<i32>,
    pub segment_direction: Vec<i32>,
    pub centre_high: Vec<Option<f64>>,
    pub centre_low: Vec<Option<f64>>,
    pub buy_point: Vec<i32>,
    pub sell_point: Vec<i32>,
}

impl AnnotationColumns {
    /// Zero-filled columns for `len` bars; canonical values are NaN and invalid
    /// until [`with_canonical`](Self::with_canonical) fills them.
    pub fn new(len: usize) -> Self {
        Self {
            canonical_high: vec![f64::NAN; len],
            canonical_low: vec![f64::NAN; len],
            canonical_valid: vec![false; len],
            fractal_kind: vec![0; len],
            fractal_known: vec![0; len],
            stroke_direction: vec![0; len],
            segment_direction: vec![0; len],
            centre_high: vec![None; len],
            centre_low: vec![None; len],
            buy_point: vec![0; len],
            sell_point: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.fractal_kind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fractal_kind.is_empty()
    }

    pub fn with_canonical(mut self, bars: &[CanonicalBar]) -> Self {
        for bar in bars {
            if bar.bar_index < self.len() {
                self.canonical_high[bar.bar_index] = bar.high;
                self.canonical_low[bar.bar_index] = bar.low;
                self.canonical_valid[bar.bar_index] = bar.valid;
            }
        }
        self
    }

    pub fn with_fractals(mut self, fractals: &[Fractal]) -> Self {
        for f in fractals {
            if let Some(slot) = self.fractal_kind.get_mut(f.bar_index) {
                *slot = f.kind.code();
            }
        }
        self
    }

    /// Mark each fractal on the bar where `delay` says it is known. Fractals
    /// known past the last row are left out.
    pub fn with_fractal_confirmations(
        mut self,
        fractals: &[Fractal],
        delay: ConfirmationDelay,
    ) -> Self {
        for f in fractals {
            if let Some(slot) = self.fractal_known.get_mut(delay.fractal_known_index(f)) {
                *slot = f.kind.code();
            }
        }
        self
    }

    pub fn with_strokes(mut self, strokes: &[Stroke]) -> Self {
        for s in strokes {
            fill_span(
                &mut self.stroke_direction,
                s.start_index,
                s.end_index,
                s.direction.code(),
            );
        }
        self
    }

    pub fn with_segments(mut self, segments: &[Segment]) -> Self {
        for s in segments {
            fill_span(
                &mut self.segment_direction,
                s.start_index,
                s.end_index,
                s.direction.code(),
            );
        }
        self
    }

    pub fn with_centres(mut self, centres: &[Centre]) -> Self {
        for c in centres {
            fill_span(&mut self.centre_high, c.start_index, c.end_index, Some(c.high));
            fill_span(&mut self.centre_low, c.start_index, c.end_index, Some(c.low));
        }
        self
    }

    pub fn with_signals(mut self, buys: &[Signal], sells: &[Signal]) -> Self {
        for s in buys {
            if let Some(slot) = self.buy_point.get_mut(s.bar_index) {
                *slot = s.kind.code();
            }
        }
        for s in sells {
            if let Some(slot) = self.sell_point.get_mut(s.bar_index) {
                *slot = s.kind.code();
            }
        }
        self
    }

    pub fn into_columns(self) -> Vec<Column> {
        vec![
            Column::new(CANONICAL_HIGH.into(), self.canonical_high),
            Column::new(CANONICAL_LOW.into(), self.canonical_low),
            Column::new(CANONICAL_VALID.into(), self.canonical_valid),
            Column::new(FRACTAL_KIND.into(), self.fractal_kind),
            Column::new(FRACTAL_KNOWN.into(), self.fractal_known),
            Column::new(STROKE_DIRECTION.into(), self.stroke_direction),
            Column::new(SEGMENT_DIRECTION.into(), self.segment_direction),
            Column::new(CENTRE_HIGH.into(), self.centre_high),
            Column::new(CENTRE_LOW.into(), self.centre_low),
            Column::new(BUY_POINT.into(), self.buy_point),
            Column::new(SELL_POINT.into(), self.sell_point),
        ]
    }

    /// Attach the columns to a copy of `table`, replacing any existing column
    /// of the same name.
    pub fn join(self, table: &DataFrame) -> PolarsResult<DataFrame> {
        let mut out = table.clone();
        for column in self.into_columns() {
            out.with_column(column)?;
        }
        Ok(out)
    }
}

fn fill_span<T: Clone>(column: &mut [T], start: usize, end: usize, value: T) {
    let end = end.min(column.len().saturating_sub(1));
    if start > end || start >= column.len() {
        return;
    }
    column[start..=end].fill(value);
}
