//! Post-inclusion bar.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A bar after inclusion normalization.
///
/// Merges write into the newer bar and mark the older one invalid, so a valid
/// canonical bar keeps the timestamp of the last raw bar it absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanonicalBar {
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
    pub high: f64,
    pub low: f64,
    pub valid: bool,
}

impl CanonicalBar {
    /// True if either bar's range contains the other's.
    pub fn engulfs(&self, other: &CanonicalBar) -> bool {
        (self.high >= other.high && self.low <= other.low)
            || (self.high <= other.high && self.low >= other.low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(high: f64, low: f64) -> CanonicalBar {
        CanonicalBar {
            bar_index: 0,
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            high,
            low,
            valid: true,
        }
    }

    #[test]
    fn engulfs_is_symmetric() {
        let outer = bar(110.0, 90.0);
        let inner = bar(105.0, 95.0);
        assert!(outer.engulfs(&inner));
        assert!(inner.engulfs(&outer));
    }

    #[test]
    fn equal_ranges_engulf() {
        assert!(bar(100.0, 99.0).engulfs(&bar(100.0, 99.0)));
    }

    #[test]
    fn stepped_bars_do_not_engulf() {
        assert!(!bar(101.0, 99.0).engulfs(&bar(102.0, 100.0)));
        assert!(!bar(101.0, 99.0).engulfs(&bar(100.0, 98.0)));
    }
}
