//! Discrete severity tiers for ranking overflow verdicts.

use serde::{Deserialize, Serialize};

/// Overflow beyond this percentage is critical.
pub const CRITICAL_PERCENT: f32 = 20.0;

/// Coarse overflow bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    None,
    Warning,
    Critical,
}

impl SeverityTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

/// Tier for an overflow percentage: `<= 0` none, `> 20` critical.
pub fn classify_severity(overflow_percent: f32) -> SeverityTier {
    if overflow_percent.is_nan() || overflow_percent <= 0.0 {
        SeverityTier::None
    } else if overflow_percent <= CRITICAL_PERCENT {
        SeverityTier::Warning
    } else {
        SeverityTier::Critical
    }
}
