use chrono::{DateTime, Utc};
use shared::{ExportBundle as SharedExportBundle, ImportResponse};

use super::goal_mapper::GoalMapper;
use super::session_mapper::SessionMapper;
use super::transaction_mapper::TransactionMapper;
use super::{format_timestamp, parse_timestamp};
use crate::domain::commands::data_transfer::{ExportBundle, ImportResult};
use crate::domain::errors::DomainError;

pub struct DataTransferMapper;

impl DataTransferMapper {
    pub fn bundle_to_dto(bundle: ExportBundle, now: DateTime<Utc>) -> SharedExportBundle {
        SharedExportBundle {
            version: bundle.version,
            exported_at: format_timestamp(bundle.exported_at),
            transactions: bundle.transactions.into_iter().map(TransactionMapper::to_dto).collect(),
            sessions: bundle.sessions.into_iter().map(|s| SessionMapper::to_dto(s, now)).collect(),
            goals: bundle.goals.into_iter().map(GoalMapper::to_dto).collect(),
        }
    }

    /// Convert an uploaded bundle; any malformed record rejects the whole bundle
    pub fn bundle_to_domain(dto: SharedExportBundle) -> Result<ExportBundle, DomainError> {
        Ok(ExportBundle {
            version: dto.version,
            exported_at: parse_timestamp("exported_at", &dto.exported_at)?,
            transactions: dto
                .transactions
                .into_iter()
                .map(TransactionMapper::to_domain)
                .collect::<Result<_, _>>()?,
            sessions: dto.sessions.into_iter().map(SessionMapper::to_domain).collect::<Result<_, _>>()?,
            goals: dto.goals.into_iter().map(GoalMapper::to_domain).collect::<Result<_, _>>()?,
        })
    }

    pub fn import_result_to_dto(result: ImportResult) -> ImportResponse {
        ImportResponse {
            transactions: result.transactions,
            sessions: result.sessions,
            goals: result.goals,
        }
    }
}
