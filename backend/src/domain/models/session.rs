//! Domain model for a timed work session.
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
        }
    }

    pub fn from_string(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "active" => Ok(SessionStatus::Active),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(format!("Unknown session status: {}", other)),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSession {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub earnings: f64,
    pub distance_km: f64,
    pub rides: u32,
    pub notes: String,
    pub status: SessionStatus,
}

impl WorkSession {
    pub fn generate_id() -> String {
        format!("session::{}", Uuid::new_v4())
    }

    pub fn start(started_at: DateTime<Utc>, notes: impl Into<String>) -> Self {
        Self {
            id: Self::generate_id(),
            started_at,
            ended_at: None,
            earnings: 0.0,
            distance_km: 0.0,
            rides: 0,
            notes: notes.into(),
            status: SessionStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Elapsed time, measured up to `now` while the session is still running.
    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        let end = self.ended_at.unwrap_or(now);
        (end - self.started_at).max(Duration::zero())
    }

    /// Earnings per hour worked, `None` for sessions shorter than a minute.
    pub fn hourly_rate(&self, now: DateTime<Utc>) -> Option<f64> {
        let minutes = self.duration(now).num_minutes();
        if minutes < 1 {
            return None;
        }
        Some(self.earnings * 60.0 / minutes as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_duration_and_rate() {
        let start = Utc.with_ymd_and_hms(2024, 5, 15, 8, 0, 0).unwrap();
        let mut session = WorkSession::start(start, "morning shift");
        let now = start + Duration::minutes(90);
        assert_eq!(session.duration(now), Duration::minutes(90));
        assert!(session.is_active());

        session.ended_at = Some(start + Duration::hours(2));
        session.earnings = 150.0;
        session.status = SessionStatus::Completed;
        assert_eq!(session.duration(now + Duration::hours(5)), Duration::hours(2));
        assert_eq!(session.hourly_rate(now), Some(75.0));
    }

    #[test]
    fn test_clock_skew_never_yields_negative_duration() {
        let start = Utc.with_ymd_and_hms(2024, 5, 15, 8, 0, 0).unwrap();
        let session = WorkSession::start(start, "");
        assert_eq!(session.duration(start - Duration::minutes(5)), Duration::zero());
        assert_eq!(session.hourly_rate(start), None);
    }
}
