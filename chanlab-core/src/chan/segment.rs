//! Segment construction: non-overlapping triples of alternating strokes.

use crate::domain::{Segment, Stroke};

/// Walk the stroke list, consuming three strokes whenever their directions
/// strictly alternate and advancing one stroke otherwise. Each stroke belongs
/// to at most one segment.
pub fn build_segments(strokes: &[Stroke]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut i = 0;

    while i + 2 < strokes.len() {
        let (a, b, c) = (strokes[i], strokes[i + 1], strokes[i + 2]);
        if a.direction != b.direction && b.direction != c.direction {
            let members = [a, b, c];
            let high = members
                .iter()
                .map(Stroke::high)
                .fold(f64::NEG_INFINITY, f64::max);
            let low = members
                .iter()
                .map(Stroke::low)
                .fold(f64::INFINITY, f64::min);
            segments.push(Segment {
                start_index: a.start_index,
                end_index: c.end_index,
                start: a.start,
                end: c.end,
                direction: a.direction,
                high,
                low,
                strokes: members,
                first_stroke: i,
            });
            i += 3;
        } else {
            i += 1;
        }
    }

    segments
}
