//! Pacing policies.
//!
//! A mode is nothing more than a [`ModePolicy`] value: the scheduler and
//! session never branch on [`Mode`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Time threshold of the mindful policy (5 minutes).
pub const MINDFUL_TIME_THRESHOLD_MS: u64 = 5 * 60 * 1000;
/// Suggested break length (90 seconds).
pub const DEFAULT_BREAK_DURATION_MS: u64 = 90 * 1000;

/// Active pacing scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Mindful,
    Unrestricted,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Mindful => "mindful",
            Mode::Unrestricted => "unrestricted",
        }
    }

    /// Built-in policy for this mode.
    pub fn default_policy(self) -> ModePolicy {
        match self {
            Mode::Mindful => ModePolicy::mindful(),
            Mode::Unrestricted => ModePolicy::unrestricted(),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Mode::Mindful => Mode::Unrestricted,
            Mode::Unrestricted => Mode::Mindful,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mindful" | "dream" => Ok(Mode::Mindful),
            "unrestricted" | "doom" => Ok(Mode::Unrestricted),
            other => Err(ValidationError::InvalidValue {
                field: "mode".into(),
                message: format!("expected 'mindful' or 'unrestricted', got '{other}'"),
            }),
        }
    }
}

/// Thresholds and break length for one pacing policy.
///
/// `None` thresholds are unbounded and never fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModePolicy {
    pub item_count_threshold: Option<u64>,
    pub time_threshold_ms: Option<u64>,
    pub break_duration_ms: u64,
}

impl ModePolicy {
    pub fn mindful() -> Self {
        Self {
            item_count_threshold: None,
            time_threshold_ms: Some(MINDFUL_TIME_THRESHOLD_MS),
            break_duration_ms: DEFAULT_BREAK_DURATION_MS,
        }
    }

    pub fn unrestricted() -> Self {
        Self {
            item_count_threshold: None,
            time_threshold_ms: None,
            break_duration_ms: DEFAULT_BREAK_DURATION_MS,
        }
    }

    /// True when neither threshold can ever fire.
    pub fn is_unbounded(&self) -> bool {
        self.item_count_threshold.is_none() && self.time_threshold_ms.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.item_count_threshold == Some(0) {
            return Err(ValidationError::ZeroThreshold {
                field: "item_count_threshold",
            });
        }
        if self.time_threshold_ms == Some(0) {
            return Err(ValidationError::ZeroThreshold {
                field: "time_threshold_ms",
            });
        }
        if self.break_duration_ms == 0 {
            return Err(ValidationError::ZeroThreshold {
                field: "break_duration_ms",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_policies() {
        let mindful = Mode::Mindful.default_policy();
        assert_eq!(mindful.time_threshold_ms, Some(300_000));
        assert_eq!(mindful.item_count_threshold, None);
        assert_eq!(mindful.break_duration_ms, 90_000);
        assert!(!mindful.is_unbounded());

        assert!(Mode::Unrestricted.default_policy().is_unbounded());
    }

    #[test]
    fn parse_mode_accepts_scenario_aliases() {
        assert_eq!("Mindful".parse::<Mode>().unwrap(), Mode::Mindful);
        assert_eq!("doom".parse::<Mode>().unwrap(), Mode::Unrestricted);
        assert!("sideways".parse::<Mode>().is_err());
    }

    #[test]
    fn validate_rejects_zero_values() {
        let mut policy = ModePolicy::mindful();
        assert!(policy.validate().is_ok());

        policy.item_count_threshold = Some(0);
        assert_eq!(
            policy.validate(),
            Err(ValidationError::ZeroThreshold {
                field: "item_count_threshold"
            })
        );

        let policy = ModePolicy {
            break_duration_ms: 0,
            ..ModePolicy::unrestricted()
        };
        assert!(policy.validate().is_err());
    }
}
