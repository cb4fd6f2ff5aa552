//! Signal: Type-1 / Type-2 buy and sell events.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SignalKind {
    /// The segment after this point breaks out of the governing centre.
    First,
    /// A pullback after a Type-1 that does not breach the Type-1 price.
    Second,
}

impl SignalKind {
    /// Column code used in the annotated `buy_point` / `sell_point` columns.
    pub fn code(self) -> i32 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }
}

/// Snapshot of the centre a signal was classified against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoverningCentre {
    /// Position in the centre list.
    pub index: usize,
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
    pub side: Side,
    pub kind: SignalKind,
    pub price: f64,
    /// Human-readable; not meant to be parsed.
    pub description: String,
    pub centre: GoverningCentre,
    /// Index of the segment whose start is the signal pivot.
    pub segment_index: usize,
    /// For Type-2 signals, the position of the anchoring Type-1 in the same side's list.
    pub anchor: Option<usize>,
}
