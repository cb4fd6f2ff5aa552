//! Segment: three direction-alternating strokes.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::stroke::{Direction, Stroke};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start_index: usize,
    pub end_index: usize,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Direction of the first member stroke.
    pub direction: Direction,
    pub high: f64,
    pub low: f64,
    pub strokes: [Stroke; 3],
    /// Position of `strokes[0]` in the stroke list the segment was built from.
    pub first_stroke: usize,
}

impl Segment {
    /// True if the segment's price range intersects the open band (low, high).
    pub fn overlaps(&self, low: f64, high: f64) -> bool {
        self.low < high && self.high > low
    }
}
