//! End-to-end accrual against CSV storage in a temporary directory.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

use gig_tracker_backend::domain::commands::goal::CreateGoalCommand;
use gig_tracker_backend::domain::commands::sessions::{AccrualOutcome, CompleteSessionCommand, StartSessionCommand};
use gig_tracker_backend::domain::{
    AccrualPolicy, Clock, FixedClock, NotificationSink, TracingNotificationSink, UserContext, WeekStart,
    WindowCalculator, WindowZone,
};
use gig_tracker_backend::storage::CsvConnection;
use gig_tracker_backend::AppState;

fn state_for(dir: &TempDir, clock: &FixedClock) -> AppState<CsvConnection> {
    let connection = CsvConnection::new(dir.path()).unwrap();
    let zone = WindowZone::from_offset_minutes(Some(-180)).unwrap();
    let clock: Arc<dyn Clock> = Arc::new(clock.clone());
    let notifier: Arc<dyn NotificationSink> = Arc::new(TracingNotificationSink);
    AppState::new(
        Arc::new(connection),
        clock,
        WindowCalculator::new(zone, WeekStart::Monday),
        notifier,
        AccrualPolicy { max_conflict_retries: 50 },
    )
}

fn daily_goal(target: f64) -> CreateGoalCommand {
    CreateGoalCommand {
        name: "Daily income".to_string(),
        category: "receita".to_string(),
        period: "daily".to_string(),
        target,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_accruals_on_csv_lose_nothing() {
    let dir = TempDir::new().unwrap();
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 15, 15, 0, 0).unwrap());
    let state = state_for(&dir, &clock);
    let driver = UserContext::authenticated("driver-1");

    let goal = state.goal_service.create_goal(&driver, daily_goal(1000.0)).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let accrual = state.accrual.clone();
        let driver = driver.clone();
        handles.push(tokio::spawn(async move { accrual.apply_earnings(&driver, 5.0, "Receita").await }));
    }
    for handle in handles {
        let report = handle.await.unwrap().unwrap();
        assert!(report.is_complete());
    }

    let stored = state.goal_service.get_goal(&driver, &goal.id).await.unwrap();
    assert_eq!(stored.current, 80.0);
}

#[tokio::test]
async fn session_earnings_survive_reopening_the_data_directory() {
    let dir = TempDir::new().unwrap();
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 15, 15, 0, 0).unwrap());
    let driver = UserContext::authenticated("driver-1");

    let goal_id = {
        let state = state_for(&dir, &clock);
        let goal = state.goal_service.create_goal(&driver, daily_goal(150.0)).await.unwrap();

        let session = state.session_service.start_session(&driver, StartSessionCommand::default()).await.unwrap();
        clock.advance(Duration::hours(3));
        let result = state
            .session_service
            .complete_session(
                &driver,
                CompleteSessionCommand {
                    session_id: session.id,
                    earnings: 160.0,
                    distance_km: 72.5,
                    rides: 9,
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert!(matches!(result.accrual, AccrualOutcome::Applied(ref report) if report.credited.len() == 1));
        goal.id
    };

    // Next local day (UTC-3): the first accrual resets the window before crediting
    clock.set(Utc.with_ymd_and_hms(2024, 5, 16, 10, 0, 0).unwrap());
    let state = state_for(&dir, &clock);

    let reopened = state.goal_service.get_goal(&driver, &goal_id).await.unwrap();
    assert_eq!(reopened.current, 160.0);
    assert!(reopened.is_reached());

    let report = state.accrual.apply_earnings(&driver, 20.0, "receita").await.unwrap();
    assert_eq!(report.credited.len(), 1);
    assert!(report.credited[0].was_reset);
    assert_eq!(report.credited[0].current, 20.0);

    let stored = state.goal_service.get_goal(&driver, &goal_id).await.unwrap();
    assert_eq!(stored.current, 20.0);
    assert_eq!(stored.last_reset, Utc.with_ymd_and_hms(2024, 5, 16, 10, 0, 0).unwrap());
}

#[tokio::test]
async fn users_do_not_see_each_others_goals() {
    let dir = TempDir::new().unwrap();
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 15, 15, 0, 0).unwrap());
    let state = state_for(&dir, &clock);
    let first = UserContext::authenticated("driver-1");
    let second = UserContext::authenticated("driver-2");

    state.goal_service.create_goal(&first, daily_goal(100.0)).await.unwrap();
    let report = state.accrual.apply_earnings(&second, 50.0, "receita").await.unwrap();

    assert!(report.credited.is_empty());
    assert_eq!(state.goal_service.list_goals(&first).await.unwrap()[0].current, 0.0);
    assert!(state.goal_service.list_goals(&second).await.unwrap().is_empty());
}

#[tokio::test]
async fn look_alike_user_ids_keep_separate_data() {
    let dir = TempDir::new().unwrap();
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 15, 15, 0, 0).unwrap());
    let state = state_for(&dir, &clock);
    let dotted = UserContext::authenticated("ana.silva");
    let underscored = UserContext::authenticated("ana_silva");
    let at_sign = UserContext::authenticated("ana@silva");

    let goal = state.goal_service.create_goal(&dotted, daily_goal(100.0)).await.unwrap();

    assert!(state.goal_service.list_goals(&underscored).await.unwrap().is_empty());
    assert!(state.goal_service.list_goals(&at_sign).await.unwrap().is_empty());

    let report = state.accrual.apply_earnings(&underscored, 40.0, "receita").await.unwrap();
    assert!(report.credited.is_empty());
    let report = state.accrual.apply_earnings(&at_sign, 15.0, "receita").await.unwrap();
    assert!(report.credited.is_empty());

    let stored = state.goal_service.get_goal(&dotted, &goal.id).await.unwrap();
    assert_eq!(stored.current, 0.0);

    // Reads and empty accruals never create a directory for the other two
    let user_dirs = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .count();
    assert_eq!(user_dirs, 1);
}
