use shared::{
    CreateTransactionRequest, Transaction as SharedTransaction, TransactionKind as SharedTransactionKind,
    TransactionListRequest, TransactionSummary as SharedTransactionSummary, TransactionSummaryRequest,
};

use super::{format_timestamp, parse_optional_timestamp, parse_timestamp};
use crate::domain::commands::transactions::{
    CreateTransactionCommand, TransactionListQuery, TransactionSummary, TransactionSummaryQuery,
};
use crate::domain::errors::DomainError;
use crate::domain::models::transaction::{Transaction as DomainTransaction, TransactionKind as DomainTransactionKind};
use crate::domain::time_window::WindowKind;

pub struct TransactionMapper;

impl TransactionMapper {
    pub fn to_dto(domain: DomainTransaction) -> SharedTransaction {
        SharedTransaction {
            id: domain.id,
            kind: Self::to_dto_kind(domain.kind),
            amount: domain.amount,
            category: domain.category,
            description: domain.description,
            date: format_timestamp(domain.date),
            created_at: format_timestamp(domain.created_at),
        }
    }

    pub fn to_domain(dto: SharedTransaction) -> Result<DomainTransaction, DomainError> {
        Ok(DomainTransaction {
            date: parse_timestamp("date", &dto.date)?,
            created_at: parse_timestamp("created_at", &dto.created_at)?,
            id: dto.id,
            kind: Self::to_domain_kind(dto.kind),
            amount: dto.amount,
            category: dto.category,
            description: dto.description,
        })
    }

    pub fn to_domain_kind(dto_kind: SharedTransactionKind) -> DomainTransactionKind {
        match dto_kind {
            SharedTransactionKind::Income => DomainTransactionKind::Income,
            SharedTransactionKind::Expense => DomainTransactionKind::Expense,
        }
    }

    pub fn to_dto_kind(domain_kind: DomainTransactionKind) -> SharedTransactionKind {
        match domain_kind {
            DomainTransactionKind::Income => SharedTransactionKind::Income,
            DomainTransactionKind::Expense => SharedTransactionKind::Expense,
        }
    }

    pub fn to_create_command(request: &CreateTransactionRequest) -> Result<CreateTransactionCommand, DomainError> {
        Ok(CreateTransactionCommand {
            kind: Self::to_domain_kind(request.kind),
            amount: request.amount,
            category: request.category.clone(),
            description: request.description.clone(),
            date: parse_optional_timestamp("date", request.date.as_deref())?,
        })
    }

    pub fn to_list_query(request: TransactionListRequest) -> Result<TransactionListQuery, DomainError> {
        let kind = request
            .kind
            .as_deref()
            .map(DomainTransactionKind::from_string)
            .transpose()
            .map_err(DomainError::Validation)?;
        Ok(TransactionListQuery {
            start: parse_optional_timestamp("start_date", request.start_date.as_deref())?,
            end: parse_optional_timestamp("end_date", request.end_date.as_deref())?,
            kind,
            limit: request.limit,
        })
    }

    pub fn to_summary_query(request: TransactionSummaryRequest) -> Result<TransactionSummaryQuery, DomainError> {
        let window = WindowKind::parse(&request.window).ok_or_else(|| {
            DomainError::Validation(format!("Unknown window '{}' (expected day, week or month)", request.window))
        })?;
        Ok(TransactionSummaryQuery {
            window,
            at: parse_optional_timestamp("at", request.at.as_deref())?,
        })
    }

    pub fn to_summary_dto(summary: TransactionSummary) -> SharedTransactionSummary {
        let window = match summary.window {
            WindowKind::Day => "day",
            WindowKind::Week => "week",
            WindowKind::Month => "month",
        };
        SharedTransactionSummary {
            window: window.to_string(),
            start: format_timestamp(summary.start),
            end: format_timestamp(summary.end),
            income: summary.totals.income,
            expense: summary.totals.expense,
            net: summary.totals.net(),
            count: summary.totals.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_rejects_unknown_kind() {
        let request = TransactionListRequest { kind: Some("transfer".into()), ..Default::default() };
        assert!(matches!(TransactionMapper::to_list_query(request), Err(DomainError::Validation(_))));

        let request = TransactionListRequest {
            kind: Some("Expense".into()),
            start_date: Some("2024-05-01T00:00:00Z".into()),
            limit: Some(10),
            ..Default::default()
        };
        let query = TransactionMapper::to_list_query(request).unwrap();
        assert_eq!(query.kind, Some(DomainTransactionKind::Expense));
        assert!(query.start.is_some());
        assert_eq!(query.end, None);
    }

    #[test]
    fn test_summary_query_window_names() {
        let query = TransactionMapper::to_summary_query(TransactionSummaryRequest { window: "Week".into(), at: None }).unwrap();
        assert_eq!(query.window, WindowKind::Week);
        assert!(TransactionMapper::to_summary_query(TransactionSummaryRequest { window: "year".into(), at: None }).is_err());
    }
}
