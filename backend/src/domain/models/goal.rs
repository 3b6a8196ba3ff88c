//! Domain model for a recurring earnings goal.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Reset cadence of a goal.
///
/// Values that are not one of the three known cadences are kept verbatim in
/// `Other` and never trigger a reset, so such goals accumulate forever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GoalPeriod {
    Daily,
    Weekly,
    Monthly,
    Other(String),
}

impl GoalPeriod {
    pub fn as_str(&self) -> &str {
        match self {
            GoalPeriod::Daily => "daily",
            GoalPeriod::Weekly => "weekly",
            GoalPeriod::Monthly => "monthly",
            GoalPeriod::Other(raw) => raw,
        }
    }

    pub fn is_resetting(&self) -> bool {
        !matches!(self, GoalPeriod::Other(_))
    }
}

impl From<&str> for GoalPeriod {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "daily" => GoalPeriod::Daily,
            "weekly" => GoalPeriod::Weekly,
            "monthly" => GoalPeriod::Monthly,
            _ => GoalPeriod::Other(value.to_string()),
        }
    }
}

impl From<String> for GoalPeriod {
    fn from(value: String) -> Self {
        GoalPeriod::from(value.as_str())
    }
}

impl From<GoalPeriod> for String {
    fn from(period: GoalPeriod) -> Self {
        period.as_str().to_string()
    }
}

impl fmt::Display for GoalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical form used to match earnings categories against goal categories.
pub fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub category: String,
    pub period: GoalPeriod,
    pub target: f64,
    /// Progress accumulated since `last_reset`
    pub current: f64,
    pub last_reset: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Bumped by the store on every write; used for conditional updates
    pub revision: u64,
}

impl Goal {
    pub fn generate_id() -> String {
        format!("goal::{}", Uuid::new_v4())
    }

    /// A fresh goal with no progress, reset "now".
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        period: GoalPeriod,
        target: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Self::generate_id(),
            name: name.into(),
            category: category.into(),
            period,
            target,
            current: 0.0,
            last_reset: now,
            created_at: now,
            revision: 0,
        }
    }

    pub fn matches_category(&self, normalized: &str) -> bool {
        normalize_category(&self.category) == normalized
    }

    /// Fraction of the target reached, clamped to `[0, 1]`.
    pub fn progress_ratio(&self) -> f64 {
        if self.target <= 0.0 {
            return 0.0;
        }
        (self.current / self.target).clamp(0.0, 1.0)
    }

    pub fn is_reached(&self) -> bool {
        self.target > 0.0 && self.current >= self.target
    }
}

/// Partial field update applied to a single goal record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub period: Option<GoalPeriod>,
    pub target: Option<f64>,
    pub current: Option<f64>,
    pub last_reset: Option<DateTime<Utc>>,
}

impl GoalPatch {
    /// Zero progress and start a new window at `at`.
    pub fn reset(at: DateTime<Utc>) -> Self {
        Self {
            current: Some(0.0),
            last_reset: Some(at),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == GoalPatch::default()
    }

    /// Apply the patch in place. Does not touch `revision`; stores own that.
    pub fn apply_to(&self, goal: &mut Goal) {
        if let Some(name) = &self.name {
            goal.name = name.clone();
        }
        if let Some(category) = &self.category {
            goal.category = category.clone();
        }
        if let Some(period) = &self.period {
            goal.period = period.clone();
        }
        if let Some(target) = self.target {
            goal.target = target;
        }
        if let Some(current) = self.current {
            goal.current = current;
        }
        if let Some(last_reset) = self.last_reset {
            goal.last_reset = last_reset;
        }
    }
}
