//! Delayed-confirmation adapter.
//!
//! Shifts confirmed-mode signals `d` bars past their pivot and reprices them at
//! the close of that later bar, so a signal is only reported once the bars that
//! confirm it have closed. Also reports the bar on which a fractal becomes
//! usable, which the annotation exposes as `fractal_known`.

use super::classifier::Classification;
use crate::domain::{Candle, Fractal, Signal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfirmationDelay(pub usize);

impl ConfirmationDelay {
    pub fn bars(self) -> usize {
        self.0
    }

    /// Bar index at which `fractal` becomes usable: the pivot, plus one bar for a
    /// confirmed fractal's right-hand neighbour, plus the delay.
    pub fn fractal_known_index(self, fractal: &Fractal) -> usize {
        fractal.bar_index + usize::from(fractal.confirmed) + self.0
    }

    /// Move `signal` to the bar `d` after its pivot, priced at that bar's close.
    /// Returns `None` when the target bar lies beyond the table.
    pub fn retime(self, signal: &Signal, candles: &[Candle]) -> Option<Signal> {
        if self.0 == 0 {
            return Some(signal.clone());
        }
        let target = signal.bar_index + self.0;
        let candle = candles.get(target)?;
        Some(Signal {
            bar_index: target,
            timestamp: candle.timestamp,
            price: candle.close,
            description: format!("{} [confirmed {} bars later]", signal.description, self.0),
            ..signal.clone()
        })
    }

    /// Retime both signal lists.
    ///
    /// Signals are in pivot order, so the ones that run past the table form a
    /// tail; dropping only that tail keeps every Type-2 anchor pointing at its
    /// Type-1.
    pub fn apply(self, classification: Classification, candles: &[Candle]) -> Classification {
        if self.0 == 0 {
            return classification;
        }
        let shift = |signals: &[Signal]| -> Vec<Signal> {
            signals
                .iter()
                .map_while(|s| self.retime(s, candles))
                .collect()
        };
        Classification {
            buy_signals: shift(&classification.buy_signals),
            sell_signals: shift(&classification.sell_signals),
        }
    }
}
