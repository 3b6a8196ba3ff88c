//! Goal accrual and periodic reset.
//!
//! Every write of earnings funnels through [`GoalAccrualEngine::apply_earnings`]:
//! the engine lists the owner's goals, keeps those whose normalized category
//! matches, starts a new window for goals whose day/week/month has rolled
//! over, and adds the amount.
//!
//! ## Concurrency
//!
//! Several call sites (session completion, transaction entry) may credit the
//! same goal at once, and the store is the only serialization point. Each goal
//! write is therefore conditional on the revision that was read; on a
//! revision conflict the engine re-reads that goal, re-evaluates the reset and
//! retries, so concurrent credits are never lost. Goals are written
//! independently: there is no atomicity across goals.
//!
//! ## Failure model
//!
//! Validation, authentication and the initial goal listing are fatal to the
//! call and happen before any write. A failed write on one goal is recorded in
//! the report and the remaining goals are still processed.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::clock::Clock;
use crate::domain::errors::AccrualError;
use crate::domain::models::goal::{normalize_category, Goal, GoalPatch};
use crate::domain::notification::{Notification, NotificationSink, TracingNotificationSink};
use crate::domain::time_window::WindowCalculator;
use crate::domain::user_context::UserContext;
use crate::storage::{GoalStorage, StorageError, WriteCondition};

/// Category credited when a work session completes with earnings
pub const SESSION_EARNINGS_CATEGORY: &str = "receita";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccrualPolicy {
    /// Re-read-and-retry attempts per goal after a revision conflict
    pub max_conflict_retries: u32,
}

impl Default for AccrualPolicy {
    fn default() -> Self {
        Self { max_conflict_retries: 5 }
    }
}

/// One goal credited by an accrual
#[derive(Debug, Clone, PartialEq)]
pub struct GoalCredit {
    pub goal_id: String,
    /// Progress the amount was added to: 0 when the window rolled over
    pub previous: f64,
    pub current: f64,
    pub was_reset: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalWriteFailure {
    pub goal_id: String,
    pub reason: String,
}

impl GoalWriteFailure {
    fn new(goal_id: &str, reason: impl Into<String>) -> Self {
        Self { goal_id: goal_id.to_string(), reason: reason.into() }
    }
}

/// What an accrual did. Callers are free to ignore it.
#[derive(Debug, Clone, PartialEq)]
pub struct AccrualReport {
    /// Normalized category that was matched
    pub category: String,
    pub amount: f64,
    pub credited: Vec<GoalCredit>,
    pub failures: Vec<GoalWriteFailure>,
}

impl AccrualReport {
    pub fn credited_goal_ids(&self) -> Vec<&str> {
        self.credited.iter().map(|c| c.goal_id.as_str()).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalReset {
    pub goal_id: String,
    /// Progress discarded by the reset
    pub previous: f64,
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SweepReport {
    pub reset: Vec<GoalReset>,
    pub failures: Vec<GoalWriteFailure>,
}

/// Check an accrual request and return the normalized category.
pub fn validate_accrual(amount: f64, category: &str) -> Result<String, AccrualError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AccrualError::Validation(format!(
            "amount must be a finite positive number, got {}",
            amount
        )));
    }
    let normalized = normalize_category(category);
    if normalized.is_empty() {
        return Err(AccrualError::Validation("category must not be empty".to_string()));
    }
    Ok(normalized)
}

#[derive(Clone)]
pub struct GoalAccrualEngine<G: GoalStorage> {
    goals: G,
    windows: WindowCalculator,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn NotificationSink>,
    policy: AccrualPolicy,
}

impl<G: GoalStorage> GoalAccrualEngine<G> {
    pub fn new(goals: G, clock: Arc<dyn Clock>) -> Self {
        Self {
            goals,
            windows: WindowCalculator::default(),
            clock,
            notifier: Arc::new(TracingNotificationSink),
            policy: AccrualPolicy::default(),
        }
    }

    pub fn with_windows(mut self, windows: WindowCalculator) -> Self {
        self.windows = windows;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_policy(mut self, policy: AccrualPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn is_reset_due(&self, goal: &Goal, now: DateTime<Utc>) -> bool {
        self.windows.is_reset_due(&goal.period, goal.last_reset, now)
    }

    /// Credit `amount` to every goal of the user whose category matches `category`.
    pub async fn apply_earnings(
        &self,
        ctx: &UserContext,
        amount: f64,
        category: &str,
    ) -> Result<AccrualReport, AccrualError> {
        let normalized = validate_accrual(amount, category).map_err(|e| {
            warn!("Rejected accrual of {} to '{}': {}", amount, category, e);
            e
        })?;
        let owner_id = ctx.owner_id().ok_or(AccrualError::Unauthenticated)?;
        let now = self.clock.now();

        let goals = self.goals.list_goals(owner_id).await.map_err(AccrualError::StoreRead)?;

        let mut report = AccrualReport {
            category: normalized.clone(),
            amount,
            credited: Vec::new(),
            failures: Vec::new(),
        };

        for goal in goals.into_iter().filter(|g| g.matches_category(&normalized)) {
            match self.credit_goal(owner_id, goal, amount, &normalized, now).await {
                Ok(Some((credit, updated))) => {
                    if credit.previous < updated.target && updated.is_reached() {
                        self.notify_goal_reached(owner_id, &updated).await;
                    }
                    report.credited.push(credit);
                }
                Ok(None) => {}
                Err(failure) => {
                    warn!("Accrual to goal {} failed: {}", failure.goal_id, failure.reason);
                    report.failures.push(failure);
                }
            }
        }

        info!(
            "Accrued {:.2} to '{}': {} goal(s) credited, {} failure(s)",
            amount,
            normalized,
            report.credited.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Reset every goal of the user whose window has rolled over, with or without new earnings.
    pub async fn sweep_resets(&self, ctx: &UserContext) -> Result<SweepReport, AccrualError> {
        let owner_id = ctx.owner_id().ok_or(AccrualError::Unauthenticated)?;
        let now = self.clock.now();

        let goals = self.goals.list_goals(owner_id).await.map_err(AccrualError::StoreRead)?;

        let mut report = SweepReport::default();
        for goal in goals {
            if !self.is_reset_due(&goal, now) {
                continue;
            }
            match self.reset_if_due(owner_id, goal, now).await {
                Ok(Some(reset)) => report.reset.push(reset),
                Ok(None) => {}
                Err(failure) => {
                    warn!("Reset of goal {} failed: {}", failure.goal_id, failure.reason);
                    report.failures.push(failure);
                }
            }
        }

        if !report.reset.is_empty() || !report.failures.is_empty() {
            info!(
                "Reset sweep for {}: {} goal(s) reset, {} failure(s)",
                owner_id,
                report.reset.len(),
                report.failures.len()
            );
        }
        Ok(report)
    }

    /// Conditionally write one credit, re-reading the goal after each conflict.
    ///
    /// Returns `None` when the goal vanished or stopped matching while retrying.
    async fn credit_goal(
        &self,
        owner_id: &str,
        mut goal: Goal,
        amount: f64,
        category: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<(GoalCredit, Goal)>, GoalWriteFailure> {
        let mut retries = 0;
        loop {
            let was_reset = self.is_reset_due(&goal, now);
            let previous = if was_reset { 0.0 } else { goal.current };
            // Reset and credit land in one write
            let patch = GoalPatch {
                current: Some(previous + amount),
                last_reset: was_reset.then_some(now),
                ..Default::default()
            };
            debug!(
                "Goal {} rev {}: {:.2} -> {:.2} (reset: {})",
                goal.id,
                goal.revision,
                previous,
                previous + amount,
                was_reset
            );

            match self
                .goals
                .update_goal(owner_id, &goal.id, &patch, WriteCondition::Revision(goal.revision))
                .await
            {
                Ok(updated) => {
                    let credit = GoalCredit {
                        goal_id: updated.id.clone(),
                        previous,
                        current: updated.current,
                        was_reset,
                    };
                    return Ok(Some((credit, updated)));
                }
                Err(e) if e.is_conflict() && retries < self.policy.max_conflict_retries => {
                    retries += 1;
                    debug!("Revision conflict on goal {}, retry {}", goal.id, retries);
                    goal = match self.refetch(owner_id, &goal.id).await? {
                        Some(fresh) if fresh.matches_category(category) => fresh,
                        _ => {
                            warn!("Goal {} no longer eligible after concurrent update, skipping", goal.id);
                            return Ok(None);
                        }
                    };
                }
                Err(e) => return Err(GoalWriteFailure::new(&goal.id, e.to_string())),
            }
        }
    }

    async fn reset_if_due(
        &self,
        owner_id: &str,
        mut goal: Goal,
        now: DateTime<Utc>,
    ) -> Result<Option<GoalReset>, GoalWriteFailure> {
        let mut retries = 0;
        loop {
            if !self.is_reset_due(&goal, now) {
                return Ok(None);
            }
            match self
                .goals
                .update_goal(owner_id, &goal.id, &GoalPatch::reset(now), WriteCondition::Revision(goal.revision))
                .await
            {
                Ok(_) => {
                    return Ok(Some(GoalReset {
                        goal_id: goal.id,
                        previous: goal.current,
                        reset_at: now,
                    }))
                }
                Err(e) if e.is_conflict() && retries < self.policy.max_conflict_retries => {
                    retries += 1;
                    goal = match self.refetch(owner_id, &goal.id).await? {
                        Some(fresh) => fresh,
                        None => return Ok(None),
                    };
                }
                Err(e) => return Err(GoalWriteFailure::new(&goal.id, e.to_string())),
            }
        }
    }

    async fn refetch(&self, owner_id: &str, goal_id: &str) -> Result<Option<Goal>, GoalWriteFailure> {
        self.goals
            .get_goal(owner_id, goal_id)
            .await
            .map_err(|e: StorageError| GoalWriteFailure::new(goal_id, format!("re-read failed: {}", e)))
    }

    async fn notify_goal_reached(&self, owner_id: &str, goal: &Goal) {
        if let Err(e) = self.notifier.notify(owner_id, Notification::goal_reached(goal)).await {
            warn!("Failed to send goal notification for {}: {}", goal.id, e);
        }
    }
}
