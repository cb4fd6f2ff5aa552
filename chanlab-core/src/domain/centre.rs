//! Centre: a consolidation zone where consecutive segments overlap.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::segment::Segment;

/// Price band shared by three or more consecutive segments.
///
/// `high` is the lowest member high and `low` the highest member low, so
/// `low < high` always holds and every member's range covers the band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Centre {
    pub start_index: usize,
    pub end_index: usize,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub high: f64,
    pub low: f64,
    /// Member range `[i, j)` of the segment list.
    pub segments: Range<usize>,
    /// False when extension stopped only because the segment list ran out.
    /// Such a centre may still absorb segments that later bars produce.
    pub closed: bool,
}

impl Centre {
    pub fn members<'a>(&self, segments: &'a [Segment]) -> &'a [Segment] {
        &segments[self.segments.clone()]
    }

    /// True if the bar span `[start_index, end_index]` lies inside the centre.
    pub fn contains_span(&self, start_index: usize, end_index: usize) -> bool {
        self.start_index <= start_index && end_index <= self.end_index
    }
}
