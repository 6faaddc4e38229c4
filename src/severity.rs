use std::fmt::Display;

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::fuel_level::FuelLevel;

/// Liters at or above which a station is considered well stocked.
pub const NORMAL_THRESHOLD: f64 = 15000.0;

/// Liters at or above which a station is running low but not critical.
pub const WARNING_THRESHOLD: f64 = 5000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Critical,
    Warning,
    Normal,
}

impl SeverityTier {
    /// Unavailable levels are Critical. Levels sitting on a threshold take the higher tier.
    pub fn classify(level: Option<&FuelLevel>) -> SeverityTier {
        let liters = match level.and_then(ToPrimitive::to_f64) {
            Some(liters) => liters,
            None => return SeverityTier::Critical,
        };

        if liters >= NORMAL_THRESHOLD {
            SeverityTier::Normal
        } else if liters >= WARNING_THRESHOLD {
            SeverityTier::Warning
        } else {
            SeverityTier::Critical
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            SeverityTier::Critical => "#FF0000",
            SeverityTier::Warning => "#FF8C00",
            SeverityTier::Normal => "#00FF00",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            SeverityTier::Critical => "red-marker",
            SeverityTier::Warning => "orange-marker",
            SeverityTier::Normal => "green-marker",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityTier::Critical => "critical",
            SeverityTier::Warning => "warning",
            SeverityTier::Normal => "normal",
        }
    }
}

impl Display for SeverityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}
