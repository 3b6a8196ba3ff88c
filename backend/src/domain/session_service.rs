//! Work session tracking.
//!
//! A driver starts a session, drives, and completes it with the earnings and
//! distance of the shift. Completion is the session trigger for goal accrual:
//! earnings are credited to goals in the session earnings category once the
//! session has been saved.
//!
//! ## Business Rules
//!
//! - At most one active session per user
//! - Earnings and distance are finite and non-negative
//! - A completed session is never rolled back because accrual failed

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::clock::Clock;
use crate::domain::commands::sessions::{
    AccrualOutcome, CompleteSessionCommand, CompleteSessionResult, StartSessionCommand,
};
use crate::domain::errors::DomainError;
use crate::domain::goal_accrual::{GoalAccrualEngine, SESSION_EARNINGS_CATEGORY};
use crate::domain::models::session::{SessionStatus, WorkSession};
use crate::domain::user_context::UserContext;
use crate::storage::{Connection, SessionStorage, StorageError};

#[derive(Clone)]
pub struct SessionService<C: Connection> {
    session_repository: C::SessionRepository,
    accrual: GoalAccrualEngine<C::GoalRepository>,
    clock: Arc<dyn Clock>,
}

impl<C: Connection> SessionService<C> {
    pub fn new(
        connection: Arc<C>,
        accrual: GoalAccrualEngine<C::GoalRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let session_repository = connection.create_session_repository();
        Self { session_repository, accrual, clock }
    }

    pub async fn start_session(&self, ctx: &UserContext, command: StartSessionCommand) -> Result<WorkSession> {
        let owner_id = ctx.require_owner()?;

        if let Some(active) = self.find_active(owner_id).await? {
            return Err(DomainError::Conflict(format!("Session {} is already active", active.id)).into());
        }

        let session = WorkSession::start(self.clock.now(), command.notes.trim());
        self.session_repository.store_session(owner_id, &session).await?;

        info!("Started session {}", session.id);
        Ok(session)
    }

    /// Close an active session, then credit its earnings to goals.
    pub async fn complete_session(
        &self,
        ctx: &UserContext,
        command: CompleteSessionCommand,
    ) -> Result<CompleteSessionResult> {
        let owner_id = ctx.require_owner()?;

        for (field, value) in [("earnings", command.earnings), ("distance", command.distance_km)] {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::Validation(format!(
                    "Session {} must be a finite, non-negative number",
                    field
                ))
                .into());
            }
        }

        let mut session = self
            .session_repository
            .get_session(owner_id, &command.session_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Session {}", command.session_id)))?;
        if !session.is_active() {
            return Err(DomainError::Conflict(format!("Session {} is already completed", session.id)).into());
        }

        session.ended_at = Some(self.clock.now().max(session.started_at));
        session.earnings = command.earnings;
        session.distance_km = command.distance_km;
        session.rides = command.rides;
        if let Some(notes) = command.notes {
            session.notes = notes.trim().to_string();
        }
        session.status = SessionStatus::Completed;

        self.session_repository
            .update_session(owner_id, &session)
            .await
            .map_err(|e| match e {
                StorageError::NotFound(id) => DomainError::NotFound(format!("Session {}", id)).into(),
                other => anyhow::Error::from(other),
            })?;
        info!(
            "Completed session {}: {:.2} earned over {:.1} km",
            session.id, session.earnings, session.distance_km
        );

        let accrual = if session.earnings > 0.0 {
            match self.accrual.apply_earnings(ctx, session.earnings, SESSION_EARNINGS_CATEGORY).await {
                Ok(report) => AccrualOutcome::Applied(report),
                Err(e) => {
                    warn!("Session {} saved but goals were not credited: {}", session.id, e);
                    AccrualOutcome::Failed(e.to_string())
                }
            }
        } else {
            AccrualOutcome::Skipped
        };

        Ok(CompleteSessionResult { session, accrual })
    }

    /// List sessions, most recently started first
    pub async fn list_sessions(&self, ctx: &UserContext) -> Result<Vec<WorkSession>> {
        let owner_id = ctx.require_owner()?;
        Ok(self.session_repository.list_sessions(owner_id).await?)
    }

    pub async fn get_active_session(&self, ctx: &UserContext) -> Result<Option<WorkSession>> {
        let owner_id = ctx.require_owner()?;
        self.find_active(owner_id).await
    }

    pub async fn delete_session(&self, ctx: &UserContext, session_id: &str) -> Result<()> {
        let owner_id = ctx.require_owner()?;
        if !self.session_repository.delete_session(owner_id, session_id).await? {
            return Err(DomainError::NotFound(format!("Session {}", session_id)).into());
        }
        info!("Deleted session: {}", session_id);
        Ok(())
    }

    async fn find_active(&self, owner_id: &str) -> Result<Option<WorkSession>> {
        let sessions = self.session_repository.list_sessions(owner_id).await?;
        Ok(sessions.into_iter().find(|s| s.is_active()))
    }
}
