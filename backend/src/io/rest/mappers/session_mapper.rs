use chrono::{DateTime, Utc};
use shared::{
    CompleteSessionRequest, CompleteSessionResponse, SessionStatus as SharedSessionStatus,
    WorkSession as SharedWorkSession,
};

use super::accrual_mapper::AccrualMapper;
use super::{format_timestamp, parse_optional_timestamp, parse_timestamp};
use crate::domain::commands::sessions::{CompleteSessionCommand, CompleteSessionResult};
use crate::domain::errors::DomainError;
use crate::domain::models::session::{SessionStatus as DomainSessionStatus, WorkSession as DomainWorkSession};

pub struct SessionMapper;

impl SessionMapper {
    /// Convert a domain session to its DTO; running figures are measured up to `now`
    pub fn to_dto(domain: DomainWorkSession, now: DateTime<Utc>) -> SharedWorkSession {
        SharedWorkSession {
            duration_minutes: domain.duration(now).num_minutes(),
            hourly_rate: domain.hourly_rate(now),
            id: domain.id,
            started_at: format_timestamp(domain.started_at),
            ended_at: domain.ended_at.map(format_timestamp),
            earnings: domain.earnings,
            distance_km: domain.distance_km,
            rides: domain.rides,
            notes: domain.notes,
            status: match domain.status {
                DomainSessionStatus::Active => SharedSessionStatus::Active,
                DomainSessionStatus::Completed => SharedSessionStatus::Completed,
            },
        }
    }

    pub fn to_domain(dto: SharedWorkSession) -> Result<DomainWorkSession, DomainError> {
        Ok(DomainWorkSession {
            started_at: parse_timestamp("started_at", &dto.started_at)?,
            ended_at: parse_optional_timestamp("ended_at", dto.ended_at.as_deref())?,
            id: dto.id,
            earnings: dto.earnings,
            distance_km: dto.distance_km,
            rides: dto.rides,
            notes: dto.notes,
            status: match dto.status {
                SharedSessionStatus::Active => DomainSessionStatus::Active,
                SharedSessionStatus::Completed => DomainSessionStatus::Completed,
            },
        })
    }

    pub fn to_complete_command(session_id: String, request: CompleteSessionRequest) -> CompleteSessionCommand {
        CompleteSessionCommand {
            session_id,
            earnings: request.earnings,
            distance_km: request.distance_km,
            rides: request.rides,
            notes: request.notes,
        }
    }

    pub fn to_complete_response(result: CompleteSessionResult, now: DateTime<Utc>) -> CompleteSessionResponse {
        CompleteSessionResponse {
            session: Self::to_dto(result.session, now),
            accrual: AccrualMapper::outcome_to_dto(result.accrual),
        }
    }
}
