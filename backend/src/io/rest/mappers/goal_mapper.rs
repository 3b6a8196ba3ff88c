use shared::{CreateGoalRequest, Goal as SharedGoal, GoalListResponse, UpdateGoalRequest};

use super::{format_timestamp, parse_timestamp};
use crate::domain::commands::goal::{CreateGoalCommand, UpdateGoalCommand};
use crate::domain::errors::DomainError;
use crate::domain::models::goal::{Goal as DomainGoal, GoalPeriod};

pub struct GoalMapper;

impl GoalMapper {
    /// Convert domain goal to shared Goal DTO
    pub fn to_dto(domain: DomainGoal) -> SharedGoal {
        SharedGoal {
            progress: domain.progress_ratio(),
            reached: domain.is_reached(),
            id: domain.id,
            name: domain.name,
            category: domain.category,
            period: domain.period.as_str().to_string(),
            target: domain.target,
            current: domain.current,
            last_reset: format_timestamp(domain.last_reset),
            created_at: format_timestamp(domain.created_at),
            revision: domain.revision,
        }
    }

    /// Convert shared Goal DTO back to a domain goal (used by import)
    pub fn to_domain(dto: SharedGoal) -> Result<DomainGoal, DomainError> {
        Ok(DomainGoal {
            last_reset: parse_timestamp("last_reset", &dto.last_reset)?,
            created_at: parse_timestamp("created_at", &dto.created_at)?,
            id: dto.id,
            name: dto.name,
            category: dto.category,
            period: GoalPeriod::from(dto.period),
            target: dto.target,
            current: dto.current,
            revision: dto.revision,
        })
    }

    pub fn to_dto_list(goals: Vec<DomainGoal>) -> GoalListResponse {
        GoalListResponse { goals: goals.into_iter().map(Self::to_dto).collect() }
    }

    pub fn to_create_command(request: CreateGoalRequest) -> CreateGoalCommand {
        CreateGoalCommand {
            name: request.name,
            category: request.category,
            period: request.period,
            target: request.target,
        }
    }

    pub fn to_update_command(goal_id: String, request: UpdateGoalRequest) -> UpdateGoalCommand {
        UpdateGoalCommand {
            goal_id,
            name: request.name,
            category: request.category,
            period: request.period,
            target: request.target,
        }
    }
}
