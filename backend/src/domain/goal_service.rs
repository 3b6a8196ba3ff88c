//! Goal service domain logic for the gig tracker.
//!
//! This module contains goal management: CRUD, explicit resets and the
//! validation rules for goal metadata. Progress itself (`current`) is only
//! ever written by the accrual engine or an explicit reset.
//!
//! ## Business Rules
//!
//! - Names are 1-256 characters after trimming
//! - Categories must not be empty; matching against earnings is case-insensitive
//! - Targets are finite and non-negative
//! - Periods other than daily/weekly/monthly are stored as-is and never reset

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::clock::Clock;
use crate::domain::commands::goal::{CreateGoalCommand, UpdateGoalCommand};
use crate::domain::errors::DomainError;
use crate::domain::models::goal::{Goal, GoalPatch, GoalPeriod};
use crate::domain::user_context::UserContext;
use crate::storage::{Connection, GoalStorage, StorageError, WriteCondition};

const MAX_NAME_LENGTH: usize = 256;
const MAX_RESET_ATTEMPTS: u32 = 5;

/// Service for managing goals
#[derive(Clone)]
pub struct GoalService<C: Connection> {
    goal_repository: C::GoalRepository,
    clock: Arc<dyn Clock>,
}

impl<C: Connection> GoalService<C> {
    pub fn new(connection: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        let goal_repository = connection.create_goal_repository();
        Self { goal_repository, clock }
    }

    /// Create a new goal with no progress, starting its window now
    pub async fn create_goal(&self, ctx: &UserContext, command: CreateGoalCommand) -> Result<Goal> {
        let owner_id = ctx.require_owner()?;
        info!("Creating goal: {:?}", command);

        let name = validate_name(&command.name)?;
        let category = validate_category(&command.category)?;
        validate_target(command.target)?;
        let period = GoalPeriod::from(command.period.as_str());
        if !period.is_resetting() {
            warn!("Goal '{}' uses period '{}' which never resets", name, period);
        }

        let goal = Goal::new(name, category, period, command.target, self.clock.now());
        self.goal_repository.store_goal(owner_id, &goal).await?;

        info!("Successfully created goal: {}", goal.id);
        Ok(goal)
    }

    pub async fn list_goals(&self, ctx: &UserContext) -> Result<Vec<Goal>> {
        let owner_id = ctx.require_owner()?;
        Ok(self.goal_repository.list_goals(owner_id).await?)
    }

    pub async fn get_goal(&self, ctx: &UserContext, goal_id: &str) -> Result<Goal> {
        let owner_id = ctx.require_owner()?;
        self.goal_repository
            .get_goal(owner_id, goal_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Goal {}", goal_id)).into())
    }

    /// Change a goal's name, category, period or target
    pub async fn update_goal(&self, ctx: &UserContext, command: UpdateGoalCommand) -> Result<Goal> {
        let owner_id = ctx.require_owner()?;
        info!("Updating goal: {:?}", command);

        let patch = GoalPatch {
            name: command.name.as_deref().map(validate_name).transpose()?,
            category: command.category.as_deref().map(validate_category).transpose()?,
            period: command.period.as_deref().map(GoalPeriod::from),
            target: command.target.map(|t| validate_target(t).map(|_| t)).transpose()?,
            ..Default::default()
        };
        if patch.is_empty() {
            return Err(DomainError::Validation("No goal fields to update".to_string()).into());
        }

        // Metadata never depends on progress, so last write wins
        let updated = self
            .goal_repository
            .update_goal(owner_id, &command.goal_id, &patch, WriteCondition::Unconditional)
            .await
            .map_err(|e| not_found_or(e, &command.goal_id))?;

        info!("Successfully updated goal: {}", updated.id);
        Ok(updated)
    }

    pub async fn delete_goal(&self, ctx: &UserContext, goal_id: &str) -> Result<()> {
        let owner_id = ctx.require_owner()?;
        if !self.goal_repository.delete_goal(owner_id, goal_id).await? {
            return Err(DomainError::NotFound(format!("Goal {}", goal_id)).into());
        }
        info!("Deleted goal: {}", goal_id);
        Ok(())
    }

    /// Zero a goal's progress and start a new window now.
    ///
    /// `last_reset` never moves backwards, even if the clock did.
    pub async fn reset_goal(&self, ctx: &UserContext, goal_id: &str) -> Result<Goal> {
        let owner_id = ctx.require_owner()?;

        for _ in 0..MAX_RESET_ATTEMPTS {
            let goal = self.get_goal(ctx, goal_id).await?;
            let at = self.clock.now().max(goal.last_reset);
            match self
                .goal_repository
                .update_goal(owner_id, goal_id, &GoalPatch::reset(at), WriteCondition::Revision(goal.revision))
                .await
            {
                Ok(updated) => {
                    info!("Reset goal {} (discarded {:.2})", goal_id, goal.current);
                    return Ok(updated);
                }
                Err(e) if e.is_conflict() => continue,
                Err(e) => return Err(not_found_or(e, goal_id)),
            }
        }

        Err(DomainError::Conflict(format!("Goal {} kept changing during reset", goal_id)).into())
    }
}

fn validate_name(name: &str) -> Result<String, DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation("Goal name cannot be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(DomainError::Validation(format!(
            "Goal name cannot exceed {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_category(category: &str) -> Result<String, DomainError> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation("Goal category cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

fn validate_target(target: f64) -> Result<(), DomainError> {
    if !target.is_finite() || target < 0.0 {
        return Err(DomainError::Validation(
            "Goal target must be a finite, non-negative number".to_string(),
        ));
    }
    Ok(())
}

fn not_found_or(error: StorageError, goal_id: &str) -> anyhow::Error {
    match error {
        StorageError::NotFound(_) => DomainError::NotFound(format!("Goal {}", goal_id)).into(),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::storage::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};

    fn setup() -> (GoalService<MemoryStore>, FixedClock, UserContext) {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap());
        let service = GoalService::new(Arc::new(MemoryStore::new()), Arc::new(clock.clone()));
        (service, clock, UserContext::authenticated("driver-1"))
    }

    fn create_command(name: &str, target: f64) -> CreateGoalCommand {
        CreateGoalCommand {
            name: name.to_string(),
            category: "receita".to_string(),
            period: "daily".to_string(),
            target,
        }
    }

    fn domain_error(e: &anyhow::Error) -> &DomainError {
        e.downcast_ref::<DomainError>().expect("expected a DomainError")
    }

    #[tokio::test]
    async fn test_create_goal_basic() {
        let (service, clock, ctx) = setup();
        let goal = service.create_goal(&ctx, create_command("  Daily income ", 200.0)).await.unwrap();

        assert!(goal.id.starts_with("goal::"));
        assert_eq!(goal.name, "Daily income");
        assert_eq!(goal.period, GoalPeriod::Daily);
        assert_eq!(goal.current, 0.0);
        assert_eq!(goal.last_reset, clock.now());
        assert_eq!(goal.revision, 0);

        let listed = service.list_goals(&ctx).await.unwrap();
        assert_eq!(listed, vec![goal]);
    }

    #[tokio::test]
    async fn test_create_goal_validation() {
        let (service, _clock, ctx) = setup();

        for command in [
            create_command("", 10.0),
            create_command(&"x".repeat(257), 10.0),
            create_command("ok", -1.0),
            create_command("ok", f64::NAN),
            CreateGoalCommand { category: "  ".to_string(), ..create_command("ok", 10.0) },
        ] {
            let err = service.create_goal(&ctx, command).await.unwrap_err();
            assert!(matches!(domain_error(&err), DomainError::Validation(_)));
        }

        // Zero target and an unrecognized period are allowed
        let goal = service
            .create_goal(&ctx, CreateGoalCommand { period: "Yearly".to_string(), ..create_command("ok", 0.0) })
            .await
            .unwrap();
        assert_eq!(goal.period, GoalPeriod::Other("yearly".to_string()));
    }

    #[tokio::test]
    async fn test_goals_are_scoped_to_user() {
        let (service, _clock, ctx) = setup();
        let goal = service.create_goal(&ctx, create_command("Mine", 10.0)).await.unwrap();
        let other = UserContext::authenticated("driver-2");

        assert!(service.list_goals(&other).await.unwrap().is_empty());
        let err = service.get_goal(&other, &goal.id).await.unwrap_err();
        assert!(matches!(domain_error(&err), DomainError::NotFound(_)));

        let err = service.list_goals(&UserContext::anonymous()).await.unwrap_err();
        assert!(matches!(domain_error(&err), DomainError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_update_goal_changes_metadata_only() {
        let (service, _clock, ctx) = setup();
        let goal = service.create_goal(&ctx, create_command("Old", 10.0)).await.unwrap();

        let updated = service
            .update_goal(
                &ctx,
                UpdateGoalCommand {
                    goal_id: goal.id.clone(),
                    name: Some("New".to_string()),
                    period: Some("weekly".to_string()),
                    target: Some(50.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "New");
        assert_eq!(updated.period, GoalPeriod::Weekly);
        assert_eq!(updated.target, 50.0);
        assert_eq!(updated.current, goal.current);
        assert_eq!(updated.revision, goal.revision + 1);

        let err = service
            .update_goal(&ctx, UpdateGoalCommand { goal_id: goal.id.clone(), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(domain_error(&err), DomainError::Validation(_)));

        let err = service
            .update_goal(
                &ctx,
                UpdateGoalCommand { goal_id: "goal::missing".to_string(), target: Some(1.0), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert!(matches!(domain_error(&err), DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_goal() {
        let (service, _clock, ctx) = setup();
        let goal = service.create_goal(&ctx, create_command("Temp", 10.0)).await.unwrap();

        service.delete_goal(&ctx, &goal.id).await.unwrap();
        let err = service.delete_goal(&ctx, &goal.id).await.unwrap_err();
        assert!(matches!(domain_error(&err), DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_reset_goal_never_moves_last_reset_backwards() {
        let (service, clock, ctx) = setup();
        let goal = service.create_goal(&ctx, create_command("Reset me", 10.0)).await.unwrap();

        clock.advance(Duration::hours(2));
        let reset = service.reset_goal(&ctx, &goal.id).await.unwrap();
        assert_eq!(reset.current, 0.0);
        assert_eq!(reset.last_reset, clock.now());

        // Clock skew: device time jumps back
        clock.advance(Duration::hours(-5));
        let again = service.reset_goal(&ctx, &goal.id).await.unwrap();
        assert_eq!(again.last_reset, reset.last_reset);
    }
}
