//! Time-window calculations for recurring goals.
//!
//! Every function here is pure: it takes an instant and returns the start of
//! the day, week or month that contains it, aligned to local midnight in the
//! instant's own time zone. Goals store their timestamps in UTC, so the
//! [`WindowCalculator`] converts into the configured zone before truncating
//! and converts the result back.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, LocalResult, NaiveDate, NaiveTime, TimeZone,
    Utc,
};
use serde::{Deserialize, Serialize};

use super::models::goal::GoalPeriod;

/// First day of the week used for weekly windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    /// ISO weeks
    #[default]
    Monday,
    Sunday,
}

/// Time zone in which window boundaries are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowZone {
    /// The host's local time zone, DST rules included
    Local,
    Fixed(FixedOffset),
}

impl WindowZone {
    /// Build a zone from an optional UTC offset in minutes. `None` means host local time.
    pub fn from_offset_minutes(offset_minutes: Option<i32>) -> Option<Self> {
        match offset_minutes {
            None => Some(WindowZone::Local),
            Some(minutes) => FixedOffset::east_opt(minutes.checked_mul(60)?).map(WindowZone::Fixed),
        }
    }
}

/// Midnight of `date` in `tz`.
///
/// A midnight swallowed by a DST gap resolves to the first local instant that
/// exists after it; an ambiguous midnight resolves to the earlier instant.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let mut naive = date.and_time(NaiveTime::MIN);
    loop {
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => return dt,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => naive += Duration::minutes(15),
        }
    }
}

/// `t` truncated to 00:00:00.000 of the same calendar day.
pub fn start_of_day<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    local_midnight(&t.timezone(), t.date_naive())
}

/// Monday 00:00:00.000 of the week containing `t`.
pub fn start_of_week<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    start_of_week_with(t, WeekStart::Monday)
}

/// Start of the week containing `t` for the given week start convention.
pub fn start_of_week_with<Tz: TimeZone>(t: &DateTime<Tz>, week_start: WeekStart) -> DateTime<Tz> {
    let date = t.date_naive();
    let days_back = match week_start {
        WeekStart::Monday => date.weekday().num_days_from_monday(),
        WeekStart::Sunday => date.weekday().num_days_from_sunday(),
    };
    let first_day = date - Duration::days(i64::from(days_back));
    local_midnight(&t.timezone(), first_day)
}

/// First calendar day of `t`'s month at 00:00:00.000.
pub fn start_of_month<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    let date = t.date_naive();
    // Day 1 exists in every month
    let first_day = date.with_day(1).unwrap_or(date);
    local_midnight(&t.timezone(), first_day)
}

/// Evaluates goal windows for UTC instants in a configured zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCalculator {
    zone: WindowZone,
    week_start: WeekStart,
}

impl Default for WindowCalculator {
    fn default() -> Self {
        Self::new(WindowZone::Local, WeekStart::Monday)
    }
}

impl WindowCalculator {
    pub fn new(zone: WindowZone, week_start: WeekStart) -> Self {
        Self { zone, week_start }
    }

    /// Start of the window of `period` containing `t`, or `None` for periods
    /// that never reset.
    pub fn window_start(&self, period: &GoalPeriod, t: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let kind = WindowKind::for_period(period)?;
        Some(self.start_of(kind, t))
    }

    /// Start of the day/week/month containing `t`, evaluated in the configured zone.
    pub fn start_of(&self, kind: WindowKind, t: DateTime<Utc>) -> DateTime<Utc> {
        match self.zone {
            WindowZone::Local => truncate(kind, self.week_start, &t.with_timezone(&Local)),
            WindowZone::Fixed(offset) => truncate(kind, self.week_start, &t.with_timezone(&offset)),
        }
    }

    /// Start of the window following the one containing `t`.
    pub fn next_start(&self, kind: WindowKind, t: DateTime<Utc>) -> DateTime<Utc> {
        let start = self.start_of(kind, t);
        // Land safely inside the next window whatever the DST shift or month length
        let past_end = match kind {
            WindowKind::Day => start + Duration::hours(26),
            WindowKind::Week => start + Duration::days(7) + Duration::hours(2),
            WindowKind::Month => start + Duration::days(32),
        };
        self.start_of(kind, past_end)
    }

    /// Whether a goal last reset at `last_reset` has crossed into a later window at `now`.
    ///
    /// Periods that never reset always answer `false`, and so does a
    /// `last_reset` that lies in a later window than `now`.
    pub fn is_reset_due(
        &self,
        period: &GoalPeriod,
        last_reset: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        match (self.window_start(period, last_reset), self.window_start(period, now)) {
            (Some(goal_window), Some(current_window)) => goal_window < current_window,
            _ => false,
        }
    }
}

/// The three window granularities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Day,
    Week,
    Month,
}

impl WindowKind {
    pub fn for_period(period: &GoalPeriod) -> Option<Self> {
        match period {
            GoalPeriod::Daily => Some(WindowKind::Day),
            GoalPeriod::Weekly => Some(WindowKind::Week),
            GoalPeriod::Monthly => Some(WindowKind::Month),
            GoalPeriod::Other(_) => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "day" | "daily" | "today" => Some(WindowKind::Day),
            "week" | "weekly" => Some(WindowKind::Week),
            "month" | "monthly" => Some(WindowKind::Month),
            _ => None,
        }
    }
}

fn truncate<Tz: TimeZone>(kind: WindowKind, week_start: WeekStart, t: &DateTime<Tz>) -> DateTime<Utc> {
    let start = match kind {
        WindowKind::Day => start_of_day(t),
        WindowKind::Week => start_of_week_with(t, week_start),
        WindowKind::Month => start_of_month(t),
    };
    start.with_timezone(&Utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        brt().with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_start_of_day_truncates_to_midnight() {
        let t = at(2024, 5, 15, 17, 42) + Duration::milliseconds(123);
        let start = start_of_day(&t);
        assert_eq!(start, at(2024, 5, 15, 0, 0));
        assert_eq!(start.nanosecond(), 0);
    }

    #[test]
    fn test_start_of_week_sunday_maps_back_six_days() {
        // 2024-05-19 is a Sunday
        let sunday = at(2024, 5, 19, 22, 10);
        assert_eq!(start_of_week(&sunday), at(2024, 5, 13, 0, 0));
    }

    #[test]
    fn test_start_of_week_monday_is_itself() {
        let monday = at(2024, 5, 13, 0, 0);
        assert_eq!(start_of_week(&monday), monday);
        let monday_evening = at(2024, 5, 13, 20, 30);
        assert_eq!(start_of_week(&monday_evening), monday);
    }

    #[test]
    fn test_start_of_week_midweek() {
        // Thursday
        let thursday = at(2024, 5, 16, 9, 0);
        assert_eq!(start_of_week(&thursday), at(2024, 5, 13, 0, 0));
    }

    #[test]
    fn test_start_of_week_crosses_month_boundary() {
        // Wednesday 2024-05-01 belongs to the week starting Monday 2024-04-29
        let t = at(2024, 5, 1, 12, 0);
        assert_eq!(start_of_week(&t), at(2024, 4, 29, 0, 0));
    }

    #[test]
    fn test_start_of_week_with_sunday_start() {
        let saturday = at(2024, 5, 18, 8, 0);
        assert_eq!(start_of_week_with(&saturday, WeekStart::Sunday), at(2024, 5, 12, 0, 0));
        let sunday = at(2024, 5, 19, 8, 0);
        assert_eq!(start_of_week_with(&sunday, WeekStart::Sunday), at(2024, 5, 19, 0, 0));
    }

    #[test]
    fn test_start_of_month() {
        assert_eq!(start_of_month(&at(2024, 2, 29, 23, 59)), at(2024, 2, 1, 0, 0));
        assert_eq!(start_of_month(&at(2024, 3, 1, 0, 0)), at(2024, 3, 1, 0, 0));
    }

    #[test]
    fn test_calculator_uses_configured_zone() {
        let calc = WindowCalculator::new(WindowZone::Fixed(brt()), WeekStart::Monday);
        // 01:30 UTC on the 16th is still the 15th in UTC-3
        let t = Utc.with_ymd_and_hms(2024, 5, 16, 1, 30, 0).unwrap();
        let start = calc.start_of(WindowKind::Day, t);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 5, 15, 3, 0, 0).unwrap());
    }

    #[test]
    fn test_reset_due_only_across_boundary() {
        let calc = WindowCalculator::new(WindowZone::Fixed(brt()), WeekStart::Monday);
        let last = at(2024, 5, 15, 10, 0).with_timezone(&Utc);
        let same_day = at(2024, 5, 15, 23, 59).with_timezone(&Utc);
        let next_day = at(2024, 5, 16, 0, 0).with_timezone(&Utc);

        assert!(!calc.is_reset_due(&GoalPeriod::Daily, last, same_day));
        assert!(calc.is_reset_due(&GoalPeriod::Daily, last, next_day));
        assert!(!calc.is_reset_due(&GoalPeriod::Weekly, last, next_day));
        assert!(!calc.is_reset_due(&GoalPeriod::Monthly, last, next_day));
    }

    #[test]
    fn test_unknown_period_never_resets() {
        let calc = WindowCalculator::new(WindowZone::Fixed(brt()), WeekStart::Monday);
        let last = at(2020, 1, 1, 0, 0).with_timezone(&Utc);
        let now = at(2024, 5, 16, 0, 0).with_timezone(&Utc);
        assert!(!calc.is_reset_due(&GoalPeriod::Other("yearly".into()), last, now));
        assert_eq!(calc.window_start(&GoalPeriod::Other(String::new()), now), None);
    }

    #[test]
    fn test_last_reset_in_future_is_not_due() {
        let calc = WindowCalculator::new(WindowZone::Fixed(brt()), WeekStart::Monday);
        let last = at(2024, 5, 20, 10, 0).with_timezone(&Utc);
        let now = at(2024, 5, 16, 10, 0).with_timezone(&Utc);
        assert!(!calc.is_reset_due(&GoalPeriod::Daily, last, now));
    }

    #[test]
    fn test_next_start_covers_each_kind() {
        let calc = WindowCalculator::new(WindowZone::Fixed(brt()), WeekStart::Monday);
        let t = at(2024, 1, 31, 23, 59).with_timezone(&Utc);
        assert_eq!(calc.next_start(WindowKind::Day, t), at(2024, 2, 1, 0, 0));
        assert_eq!(calc.next_start(WindowKind::Week, t), at(2024, 2, 5, 0, 0));
        assert_eq!(calc.next_start(WindowKind::Month, t), at(2024, 2, 1, 0, 0));
        let feb = at(2024, 2, 1, 0, 0).with_timezone(&Utc);
        assert_eq!(calc.next_start(WindowKind::Month, feb), at(2024, 3, 1, 0, 0));
    }

    #[test]
    fn test_zone_from_offset_minutes() {
        assert_eq!(WindowZone::from_offset_minutes(None), Some(WindowZone::Local));
        assert_eq!(
            WindowZone::from_offset_minutes(Some(-180)),
            Some(WindowZone::Fixed(brt()))
        );
        assert_eq!(WindowZone::from_offset_minutes(Some(100_000)), None);
    }

    #[test]
    fn test_window_kind_parse() {
        assert_eq!(WindowKind::parse(" Week "), Some(WindowKind::Week));
        assert_eq!(WindowKind::parse("monthly"), Some(WindowKind::Month));
        assert_eq!(WindowKind::parse("year"), None);
    }
}
