//! Time left before a pending listing publishes itself.
//!
//! Everything here is a pure function of `(now, deadline)`; callers evaluate it
//! on every request instead of caching it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MS_PER_MINUTE: i64 = 60 * 1000;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

const HIGH_URGENCY_HOURS: f64 = 6.0;
const MEDIUM_URGENCY_HOURS: f64 = 24.0;

/// Remaining time until auto-publish, or `Expired` once the deadline passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRemaining {
    Expired,
    Remaining { milliseconds: i64 },
}

impl TimeRemaining {
    pub fn between(now: DateTime<Utc>, deadline: DateTime<Utc>) -> Self {
        let milliseconds = (deadline - now).num_milliseconds();
        if milliseconds <= 0 {
            Self::Expired
        } else {
            Self::Remaining { milliseconds }
        }
    }

    pub fn is_expired(self) -> bool {
        matches!(self, Self::Expired)
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let milliseconds = match *self {
            Self::Expired => return f.write_str("Expired"),
            Self::Remaining { milliseconds } => milliseconds,
        };

        let hours = milliseconds / MS_PER_HOUR;
        let minutes = (milliseconds % MS_PER_HOUR) / MS_PER_MINUTE;

        if hours > 24 {
            write!(f, "{}j {}h", hours / 24, hours % 24)
        } else if hours > 0 {
            write!(f, "{hours}h {minutes}m")
        } else {
            write!(f, "{minutes}m")
        }
    }
}

/// Urgency tier used to order the validation queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    pub const fn ordered() -> [Self; 3] {
        [Self::High, Self::Medium, Self::Low]
    }

    pub fn classify(now: DateTime<Utc>, deadline: DateTime<Utc>) -> Self {
        let hours = (deadline - now).num_milliseconds() as f64 / MS_PER_HOUR as f64;
        if hours <= HIGH_URGENCY_HOURS {
            Self::High
        } else if hours <= MEDIUM_URGENCY_HOURS {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
