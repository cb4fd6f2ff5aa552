//! Centre detection over the segment list.

use crate::domain::{Centre, Segment};

/// Find consolidation zones where three or more consecutive segments share a
/// price band.
///
/// A centre seeds on a triple whose overlap `(max lows, min highs)` is non
/// degenerate, then greedily absorbs following segments that still intersect
/// the band, tightening it each time. Scanning restarts at the last member, so
/// adjacent centres may share one segment.
pub fn detect_centres(segments: &[Segment]) -> Vec<Centre> {
    let mut centres = Vec::new();
    let mut i = 0;

    while i + 2 < segments.len() {
        let seed = &segments[i..i + 3];
        let mut high = seed.iter().map(|s| s.high).fold(f64::INFINITY, f64::min);
        let mut low = seed
            .iter()
            .map(|s| s.low)
            .fold(f64::NEG_INFINITY, f64::max);

        if low >= high {
            i += 1;
            continue;
        }

        let mut j = i + 3;
        while j < segments.len() && segments[j].overlaps(low, high) {
            high = high.min(segments[j].high);
            low = low.max(segments[j].low);
            j += 1;
        }

        let first = &segments[i];
        let last = &segments[j - 1];
        centres.push(Centre {
            start_index: first.start_index,
            end_index: last.end_index,
            start: first.start,
            end: last.end,
            high,
            low,
            segments: i..j,
            closed: j < segments.len(),
        });

        i = j - 1;
    }

    centres
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, Stroke};
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn ts(bar: usize) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(bar as i64)
    }

    /// Contiguous segments of 12 bars each with the given (low, high) ranges.
    fn segments(ranges: &[(f64, f64)]) -> Vec<Segment> {
        ranges
            .iter()
            .enumerate()
            .map(|(k, &(low, high))| {
                let start_index = k * 12;
                let end_index = (k + 1) * 12;
                let stroke = Stroke {
                    start_index,
                    end_index,
                    start: ts(start_index),
                    end: ts(end_index),
                    direction: Direction::Up,
                    start_price: low,
                    end_price: high,
                    bar_count: 12,
                };
                Segment {
                    start_index,
                    end_index,
                    start: ts(start_index),
                    end: ts(end_index),
                    direction: if k % 2 == 0 {
                        Direction::Down
                    } else {
                        Direction::Up
                    },
                    high,
                    low,
                    strokes: [stroke; 3],
                    first_stroke: k * 3,
                }
            })
            .collect()
    }

    #[test]
    fn three_overlapping_segments_seed_a_centre() {
        let segs = segments(&[(90.0, 110.0), (95.0, 115.0), (88.0, 105.0)]);
        let centres = detect_centres(&segs);
        assert_eq!(centres.len(), 1);
        let c = &centres[0];
        assert_eq!((c.low, c.high), (95.0, 105.0));
        assert_eq!(c.segments, 0..3);
        assert_eq!((c.start_index, c.end_index), (0, 36));
        assert!(!c.closed);
    }

    #[test]
    fn extension_tightens_and_closes() {
        let segs = segments(&[
            (90.0, 110.0),
            (92.0, 112.0),
            (88.0, 108.0),
            (100.0, 120.0),
            (130.0, 140.0),
        ]);
        let centres = detect_centres(&segs);
        assert_eq!(centres.len(), 1);
        let c = &centres[0];
        assert_eq!(c.segments, 0..4);
        assert_eq!((c.low, c.high), (100.0, 108.0));
        assert_eq!(c.end, segs[3].end);
        assert!(c.closed);
        for seg in c.members(&segs) {
            assert!(seg.low <= c.high && seg.high >= c.low);
        }
    }

    #[test]
    fn restart_at_last_member_can_share_a_segment() {
        // Segment 3 only touches the first band, so [0..3) closes; [2..5) seeds again.
        let segs = segments(&[
            (90.0, 110.0),
            (95.0, 108.0),
            (92.0, 109.0),
            (108.0, 120.0),
            (104.0, 125.0),
        ]);
        let centres = detect_centres(&segs);
        assert_eq!(centres.len(), 2);
        assert_eq!(centres[0].segments, 0..3);
        assert_eq!((centres[0].low, centres[0].high), (95.0, 108.0));
        assert!(centres[0].closed);
        assert_eq!(centres[1].segments, 2..5);
        assert_eq!((centres[1].low, centres[1].high), (108.0, 109.0));
    }

    #[test]
    fn touching_ranges_are_degenerate() {
        let segs = segments(&[(90.0, 100.0), (100.0, 110.0), (95.0, 105.0)]);
        assert!(detect_centres(&segs).is_empty());
    }

    #[test]
    fn fewer_than_three_segments() {
        assert!(detect_centres(&segments(&[(90.0, 110.0), (95.0, 115.0)])).is_empty());
    }

    #[test]
    fn contains_span_checks_bar_indices() {
        let segs = segments(&[(90.0, 110.0), (95.0, 115.0), (88.0, 105.0)]);
        let c = &detect_centres(&segs)[0];
        assert!(c.contains_span(12, 24));
        assert!(c.contains_span(0, 36));
        assert!(!c.contains_span(24, 48));
    }
}
