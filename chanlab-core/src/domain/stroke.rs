//! Stroke: a directed move between two adjacent opposite fractals.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Direction of a stroke or segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Column code used in the annotated table: up = 1, down = -1.
    pub fn code(self) -> i32 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

/// Up strokes run from a bottom's low to a top's high; down strokes the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub start_index: usize,
    pub end_index: usize,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub direction: Direction,
    pub start_price: f64,
    pub end_price: f64,
    /// Raw bars between the two pivots (end_index - start_index).
    pub bar_count: usize,
}

impl Stroke {
    pub fn high(&self) -> f64 {
        self.start_price.max(self.end_price)
    }

    pub fn low(&self) -> f64 {
        self.start_price.min(self.end_price)
    }
}
