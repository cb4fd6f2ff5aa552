//! Fractal: a local top or bottom on the bar sequence.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FractalKind {
    Top,
    Bottom,
}

impl FractalKind {
    /// Column code used in the annotated table: top = 1, bottom = -1.
    pub fn code(self) -> i32 {
        match self {
            Self::Top => 1,
            Self::Bottom => -1,
        }
    }
}

/// A top or bottom pivot.
///
/// `confirmed` is true when both neighbours of the pivot were observed (the
/// retrospective detector). Online fractals are never patched: a later call
/// recomputes the whole list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fractal {
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
    pub kind: FractalKind,
    pub high: f64,
    pub low: f64,
    pub confirmed: bool,
}

impl Fractal {
    /// The pivot price a stroke anchors on: the high of a top, the low of a bottom.
    pub fn extreme(&self) -> f64 {
        match self.kind {
            FractalKind::Top => self.high,
            FractalKind::Bottom => self.low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn extreme_follows_kind() {
        let mut fractal = Fractal {
            bar_index: 3,
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            kind: FractalKind::Top,
            high: 12.0,
            low: 10.0,
            confirmed: true,
        };
        assert_eq!(fractal.extreme(), 12.0);
        fractal.kind = FractalKind::Bottom;
        assert_eq!(fractal.extreme(), 10.0);
    }

    #[test]
    fn kind_codes() {
        assert_eq!(FractalKind::Top.code(), 1);
        assert_eq!(FractalKind::Bottom.code(), -1);
    }
}
