//! Domain types for ChanLab: candles and the structures derived from them.

pub mod candle;
pub mod canonical;
pub mod centre;
pub mod fractal;
pub mod segment;
pub mod signal;
pub mod stroke;

pub use candle::{BarLookup, Candle, Timeline};
pub use canonical::CanonicalBar;
pub use centre::Centre;
pub use fractal::{Fractal, FractalKind};
pub use segment::Segment;
pub use signal::{GoverningCentre, Side, Signal, SignalKind};
pub use stroke::{Direction, Stroke};
