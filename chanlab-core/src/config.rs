//! Analyzer configuration.
//!
//! Three knobs change the analyzer's output: the bar-type tag (which sets the
//! stroke minimum K), the fractal detector mode, and the confirmation delay.
//! Configurations load from TOML:
//!
//! ```toml
//! bar_type = "daily"
//! mode = "confirmed"
//! confirmation_delay = 1
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Largest supported confirmation delay, in bars.
pub const MAX_CONFIRMATION_DELAY: u8 = 2;

/// Sampling period tag. Opaque to the pipeline except for the stroke minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarType {
    #[default]
    Daily,
    Weekly,
    Minute,
}

impl BarType {
    /// Declared minimum bar count K for a stroke.
    pub fn min_stroke_bars(self) -> usize {
        match self {
            Self::Daily => 5,
            Self::Weekly | Self::Minute => 3,
        }
    }
}

/// Fractal detector variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Three-bar pivots on the canonical sequence; reads one bar past the pivot.
    #[default]
    Confirmed,
    /// Two-bar pivots on raw candles; never reads past the current bar.
    Online,
}

/// How the stroke builder applies the minimum bar count K.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeRule {
    /// Accept any non-negative bar count. K is carried but not enforced.
    #[default]
    Lenient,
    /// Reject pairs closer than K bars. Stroke alternation is no longer guaranteed.
    MinBars,
}

/// Bars that must close after a pivot before the pivot itself is usable.
///
/// This is the confirmation shift, not a bound on what the analyzer reads. A
/// signal is stamped on the pivot ending one segment but only exists once the
/// next segment completes, which may be any number of bars later in either
/// mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookahead {
    /// Bars after a fractal's pivot until the fractal is known.
    pub structural: usize,
    /// `structural` plus the confirmation delay.
    pub signal: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("confirmation delay {0} out of range (max {MAX_CONFIRMATION_DELAY})")]
    InvalidDelay(u8),

    #[error("unknown sector: {0}")]
    UnknownSector(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub bar_type: BarType,
    pub mode: Mode,
    /// Bars to shift confirmed-mode signals forward (0, 1 or 2).
    pub confirmation_delay: u8,
    pub stroke_rule: StrokeRule,
}

impl AnalyzerConfig {
    pub fn confirmed(bar_type: BarType) -> Self {
        Self {
            bar_type,
            mode: Mode::Confirmed,
            ..Self::default()
        }
    }

    pub fn online(bar_type: BarType) -> Self {
        Self {
            bar_type,
            mode: Mode::Online,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: u8) -> Self {
        self.confirmation_delay = delay;
        self
    }

    pub fn with_stroke_rule(mut self, rule: StrokeRule) -> Self {
        self.stroke_rule = rule;
        self
    }

    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string. Missing keys take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.confirmation_delay > MAX_CONFIRMATION_DELAY {
            return Err(ConfigError::InvalidDelay(self.confirmation_delay));
        }
        Ok(())
    }

    pub fn min_stroke_bars(&self) -> usize {
        self.bar_type.min_stroke_bars()
    }

    /// The delay actually applied: zero in online mode.
    pub fn effective_delay(&self) -> usize {
        match self.mode {
            Mode::Confirmed => usize::from(self.confirmation_delay),
            Mode::Online => 0,
        }
    }

    pub fn lookahead(&self) -> Lookahead {
        match self.mode {
            Mode::Online => Lookahead {
                structural: 0,
                signal: 0,
            },
            Mode::Confirmed => Lookahead {
                structural: 1,
                signal: 1 + self.effective_delay(),
            },
        }
    }
}
