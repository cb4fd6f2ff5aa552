//! Type-1 / Type-2 buy and sell classification.
//!
//! Walks adjacent segment pairs `(prev, curr)` and compares `curr` against its
//! governing centre: the first centre containing `curr`'s span, else the latest
//! centre that ended by the time `curr` starts. Signals sit on `prev.end`, the
//! pivot where the direction changed.
//!
//! - Type-1 buy: down then up, and the up segment clears the centre high.
//! - Type-1 sell: up then down, and the down segment breaks the centre low.
//! - Type-2 buy: after a Type-1 buy, an up-down pair whose low holds the Type-1 price.
//! - Type-2 sell: after a Type-1 sell, a down-up pair whose high stays under it.
//!
//! Buy and sell lists are independent: both may fire on the same pivot.

use serde::{Deserialize, Serialize};

use crate::domain::{
    BarLookup, Candle, Centre, Direction, GoverningCentre, Segment, Side, Signal, SignalKind,
    Timeline,
};

/// Classifier output, in pivot order per side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub buy_signals: Vec<Signal>,
    pub sell_signals: Vec<Signal>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.buy_signals.is_empty() && self.sell_signals.is_empty()
    }
}

pub fn classify(segments: &[Segment], centres: &[Centre], candles: &[Candle]) -> Classification {
    let timeline = Timeline::new(candles);
    let mut out = Classification::default();
    let mut last_buy: Option<usize> = None;
    let mut last_sell: Option<usize> = None;

    for i in 1..segments.len() {
        let prev = &segments[i - 1];
        let curr = &segments[i];

        let Some(index) = governing_centre(centres, curr) else {
            continue;
        };
        let pivot = Pivot {
            prev,
            segment_index: i,
            centre: GoverningCentre {
                index,
                low: centres[index].low,
                high: centres[index].high,
            },
        };
        let (zl, zh) = (pivot.centre.low, pivot.centre.high);

        match (prev.direction, curr.direction) {
            (Direction::Down, Direction::Up) => {
                if curr.high > zh {
                    let reason = format!(
                        "up segment {i} high {:.2} broke above centre {index} high {zh:.2}",
                        curr.high
                    );
                    last_buy = Some(out.buy_signals.len());
                    out.buy_signals
                        .push(pivot.signal(&timeline, Side::Buy, SignalKind::First, None, reason));
                }
                if let Some(anchor) = last_sell {
                    let anchor_price = out.sell_signals[anchor].price;
                    if curr.high <= anchor_price {
                        let reason = format!(
                            "rebound high {:.2} held under type-1 sell {anchor_price:.2}",
                            curr.high
                        );
                        out.sell_signals.push(pivot.signal(
                            &timeline,
                            Side::Sell,
                            SignalKind::Second,
                            Some(anchor),
                            reason,
                        ));
                    }
                }
            }
            (Direction::Up, Direction::Down) => {
                if curr.low < zl {
                    let reason = format!(
                        "down segment {i} low {:.2} broke below centre {index} low {zl:.2}",
                        curr.low
                    );
                    last_sell = Some(out.sell_signals.len());
                    out.sell_signals
                        .push(pivot.signal(&timeline, Side::Sell, SignalKind::First, None, reason));
                }
                if let Some(anchor) = last_buy {
                    let anchor_price = out.buy_signals[anchor].price;
                    if curr.low >= anchor_price {
                        let reason = format!(
                            "pullback low {:.2} held above type-1 buy {anchor_price:.2}",
                            curr.low
                        );
                        out.buy_signals.push(pivot.signal(
                            &timeline,
                            Side::Buy,
                            SignalKind::Second,
                            Some(anchor),
                            reason,
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    out
}

fn governing_centre(centres: &[Centre], curr: &Segment) -> Option<usize> {
    centres
        .iter()
        .position(|c| c.contains_span(curr.start_index, curr.end_index))
        .or_else(|| centres.iter().rposition(|c| c.end_index <= curr.start_index))
}

/// The direction change at the end of `prev`, seen against one centre.
struct Pivot<'a> {
    prev: &'a Segment,
    segment_index: usize,
    centre: GoverningCentre,
}

impl Pivot<'_> {
    fn signal(
        &self,
        timeline: &Timeline<'_>,
        side: Side,
        kind: SignalKind,
        anchor: Option<usize>,
        reason: String,
    ) -> Signal {
        let label = match (kind, side) {
            (SignalKind::First, Side::Buy) => "type-1 buy",
            (SignalKind::First, Side::Sell) => "type-1 sell",
            (SignalKind::Second, Side::Buy) => "type-2 buy",
            (SignalKind::Second, Side::Sell) => "type-2 sell",
        };

        let (bar_index, price, note) = match timeline.locate(self.prev.end) {
            BarLookup::Exact(i) => (i, timeline[i].close, None),
            BarLookup::Prior(i) => (i, timeline[i].close, Some("priced at prior bar close")),
            BarLookup::BeforeStart => {
                let extreme = match side {
                    Side::Buy => self.prev.low,
                    Side::Sell => self.prev.high,
                };
                (self.prev.end_index, extreme, Some("priced at pivot extreme"))
            }
        };

        let description = match note {
            Some(note) => format!("{label}: {reason} ({note})"),
            None => format!("{label}: {reason}"),
        };

        Signal {
            bar_index,
            timestamp: self.prev.end,
            side,
            kind,
            price,
            description,
            centre: self.centre,
            segment_index: self.segment_index,
            anchor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Stroke;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn ts(bar: usize) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(bar as i64)
    }

    /// One candle per bar; close equals the bar index plus 100.
    fn candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let p = 100.0 + i as f64;
                Candle {
                    timestamp: ts(i),
                    open: p,
                    high: p + 1.0,
                    low: p - 1.0,
                    close: p,
                    volume: 1.0,
                }
            })
            .collect()
    }

    fn segment(start: usize, end: usize, direction: Direction, low: f64, high: f64) -> Segment {
        let stroke = Stroke {
            start_index: start,
            end_index: end,
            start: ts(start),
            end: ts(end),
            direction,
            start_price: low,
            end_price: high,
            bar_count: end - start,
        };
        Segment {
            start_index: start,
            end_index: end,
            start: ts(start),
            end: ts(end),
            direction,
            high,
            low,
            strokes: [stroke; 3],
            first_stroke: 0,
        }
    }

    fn centre(start: usize, end: usize, low: f64, high: f64) -> Centre {
        Centre {
            start_index: start,
            end_index: end,
            start: ts(start),
            end: ts(end),
            high,
            low,
            segments: 0..3,
            closed: true,
        }
    }

    #[test]
    fn type_one_and_type_two_buy() {
        let segs = vec![
            segment(0, 10, Direction::Down, 90.0, 110.0),
            segment(10, 20, Direction::Up, 92.0, 108.0),
            segment(20, 30, Direction::Down, 93.0, 109.0),
            segment(30, 40, Direction::Up, 93.0, 125.0),
            segment(40, 50, Direction::Down, 131.0, 135.0),
        ];
        let centres = vec![centre(0, 30, 92.0, 108.0)];
        let out = classify(&segs, &centres, &candles(60));

        assert!(out.sell_signals.is_empty());
        assert_eq!(out.buy_signals.len(), 2);

        let first = &out.buy_signals[0];
        assert_eq!(first.kind, SignalKind::First);
        assert_eq!(first.bar_index, 30);
        assert_eq!(first.timestamp, ts(30));
        assert_eq!(first.price, 130.0);
        assert_eq!(first.segment_index, 3);
        assert_eq!(first.centre.index, 0);
        assert!(first.description.starts_with("type-1 buy"));

        let second = &out.buy_signals[1];
        assert_eq!(second.kind, SignalKind::Second);
        assert_eq!(second.bar_index, 40);
        assert_eq!(second.anchor, Some(0));
        assert_eq!(second.price, 140.0);
    }

    #[test]
    fn type_one_and_type_two_sell() {
        let segs = vec![
            segment(0, 10, Direction::Up, 90.0, 110.0),
            segment(10, 20, Direction::Down, 92.0, 108.0),
            segment(20, 30, Direction::Up, 91.0, 107.0),
            segment(30, 40, Direction::Down, 70.0, 107.0),
            segment(40, 50, Direction::Up, 65.0, 75.0),
        ];
        let centres = vec![centre(0, 30, 92.0, 108.0)];
        // Flat closes at 100 so the type-1 sell price is 100.
        let mut bars = candles(60);
        for c in &mut bars {
            c.close = 100.0;
        }
        let out = classify(&segs, &centres, &bars);

        assert!(out.buy_signals.is_empty());
        assert_eq!(out.sell_signals.len(), 2);
        assert_eq!(out.sell_signals[0].kind, SignalKind::First);
        assert_eq!(out.sell_signals[0].bar_index, 30);
        assert_eq!(out.sell_signals[1].kind, SignalKind::Second);
        assert_eq!(out.sell_signals[1].anchor, Some(0));
        assert_eq!(out.sell_signals[1].bar_index, 40);
    }

    #[test]
    fn breakout_must_clear_the_band_strictly() {
        let segs = vec![
            segment(0, 10, Direction::Down, 90.0, 110.0),
            segment(10, 20, Direction::Up, 92.0, 108.0),
        ];
        let centres = vec![centre(0, 30, 92.0, 108.0)];
        assert!(classify(&segs, &centres, &candles(40)).is_empty());
    }

    #[test]
    fn no_centre_no_signals() {
        let segs = vec![
            segment(0, 10, Direction::Down, 90.0, 110.0),
            segment(10, 20, Direction::Up, 92.0, 150.0),
        ];
        assert!(classify(&segs, &[], &candles(40)).is_empty());
    }

    #[test]
    fn centre_after_segment_does_not_govern() {
        let segs = vec![
            segment(0, 10, Direction::Down, 90.0, 110.0),
            segment(10, 20, Direction::Up, 92.0, 150.0),
        ];
        let centres = vec![centre(30, 60, 92.0, 108.0)];
        assert!(classify(&segs, &centres, &candles(70)).is_empty());
    }

    #[test]
    fn missing_timestamp_falls_back_to_prior_close() {
        let segs = vec![
            segment(0, 10, Direction::Down, 90.0, 110.0),
            segment(10, 20, Direction::Up, 92.0, 150.0),
        ];
        let centres = vec![centre(0, 30, 92.0, 108.0)];
        let mut bars = candles(40);
        bars.remove(10);
        let out = classify(&segs, &centres, &bars);
        let signal = &out.buy_signals[0];
        assert_eq!(signal.bar_index, 9);
        assert_eq!(signal.price, 109.0);
        assert_eq!(signal.timestamp, ts(10));
        assert!(signal.description.contains("prior bar close"));
    }

    #[test]
    fn timestamp_before_table_uses_pivot_extreme() {
        let segs = vec![
            segment(0, 10, Direction::Down, 90.0, 110.0),
            segment(10, 20, Direction::Up, 92.0, 150.0),
        ];
        let centres = vec![centre(0, 30, 92.0, 108.0)];
        let late: Vec<Candle> = candles(40).into_iter().skip(15).collect();
        let out = classify(&segs, &centres, &late);
        let signal = &out.buy_signals[0];
        assert_eq!(signal.price, 90.0);
        assert_eq!(signal.bar_index, 10);
        assert!(signal.description.contains("pivot extreme"));
    }
}
