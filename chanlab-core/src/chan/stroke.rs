//! Stroke construction from an ordered fractal list.

use crate::config::{AnalyzerConfig, StrokeRule};
use crate::domain::{Direction, Fractal, FractalKind, Stroke};

/// Pairs adjacent opposite fractals into strokes.
///
/// Under [`StrokeRule::Lenient`] every opposite pair becomes a stroke and the
/// minimum bar count is only carried along. Because a stroke's direction is
/// fixed by the kind of its starting fractal, and repeats of one kind are
/// skipped, lenient strokes always alternate direction.
#[derive(Debug, Clone, Copy)]
pub struct StrokeBuilder {
    rule: StrokeRule,
    min_bars: usize,
}

impl StrokeBuilder {
    pub fn new(rule: StrokeRule, min_bars: usize) -> Self {
        Self { rule, min_bars }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.stroke_rule, config.min_stroke_bars())
    }

    pub fn min_bars(&self) -> usize {
        self.min_bars
    }

    pub fn rule(&self) -> StrokeRule {
        self.rule
    }

    pub fn build(&self, fractals: &[Fractal]) -> Vec<Stroke> {
        fractals
            .windows(2)
            .filter_map(|w| self.pair(&w[0], &w[1]))
            .collect()
    }

    fn pair(&self, from: &Fractal, to: &Fractal) -> Option<Stroke> {
        let direction = match (from.kind, to.kind) {
            (FractalKind::Bottom, FractalKind::Top) => Direction::Up,
            (FractalKind::Top, FractalKind::Bottom) => Direction::Down,
            _ => return None,
        };

        let bar_count = to.bar_index.checked_sub(from.bar_index)?;
        if self.rule == StrokeRule::MinBars && bar_count < self.min_bars {
            return None;
        }

        Some(Stroke {
            start_index: from.bar_index,
            end_index: to.bar_index,
            start: from.timestamp,
            end: to.timestamp,
            direction,
            start_price: from.extreme(),
            end_price: to.extreme(),
            bar_count,
        })
    }
}
