//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer is responsible for mapping the
//! public DTOs defined in the `shared` crate to these internal types.

pub mod goal {
    /// Input for creating a new goal.
    #[derive(Debug, Clone)]
    pub struct CreateGoalCommand {
        pub name: String,
        pub category: String,
        pub period: String,
        pub target: f64,
    }

    /// Metadata changes for an existing goal. Progress is not editable here.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateGoalCommand {
        pub goal_id: String,
        pub name: Option<String>,
        pub category: Option<String>,
        pub period: Option<String>,
        pub target: Option<f64>,
    }
}

pub mod transactions {
    use chrono::{DateTime, Utc};

    use crate::domain::models::transaction::{TransactionKind, TransactionTotals};
    use crate::domain::time_window::WindowKind;

    /// Input for creating a new transaction.
    #[derive(Debug, Clone)]
    pub struct CreateTransactionCommand {
        pub kind: TransactionKind,
        pub amount: f64,
        pub category: String,
        pub description: String,
        /// Defaults to now
        pub date: Option<DateTime<Utc>>,
    }

    /// Query parameters for listing transactions.
    #[derive(Debug, Clone, Default)]
    pub struct TransactionListQuery {
        pub start: Option<DateTime<Utc>>,
        pub end: Option<DateTime<Utc>>,
        pub kind: Option<TransactionKind>,
        pub limit: Option<usize>,
    }

    #[derive(Debug, Clone)]
    pub struct TransactionSummaryQuery {
        pub window: WindowKind,
        /// Instant whose window is summarized; defaults to now
        pub at: Option<DateTime<Utc>>,
    }

    /// Totals over one day/week/month window.
    #[derive(Debug, Clone, PartialEq)]
    pub struct TransactionSummary {
        pub window: WindowKind,
        pub start: DateTime<Utc>,
        pub end: DateTime<Utc>,
        pub totals: TransactionTotals,
    }
}

pub mod sessions {
    use crate::domain::goal_accrual::AccrualReport;
    use crate::domain::models::session::WorkSession;

    #[derive(Debug, Clone, Default)]
    pub struct StartSessionCommand {
        pub notes: String,
    }

    #[derive(Debug, Clone)]
    pub struct CompleteSessionCommand {
        pub session_id: String,
        pub earnings: f64,
        pub distance_km: f64,
        pub rides: u32,
        /// Replaces the notes given at start when present
        pub notes: Option<String>,
    }

    /// What happened to goals after a session was saved
    #[derive(Debug, Clone, PartialEq)]
    pub enum AccrualOutcome {
        Applied(AccrualReport),
        /// Nothing was earned
        Skipped,
        /// The session is saved; goals were not credited
        Failed(String),
    }

    #[derive(Debug, Clone)]
    pub struct CompleteSessionResult {
        pub session: WorkSession,
        pub accrual: AccrualOutcome,
    }
}

pub mod data_transfer {
    use chrono::{DateTime, Utc};

    use crate::domain::models::goal::Goal;
    use crate::domain::models::session::WorkSession;
    use crate::domain::models::transaction::Transaction;

    /// Current export format version
    pub const EXPORT_VERSION: u32 = 1;

    /// Complete snapshot of one user's data
    #[derive(Debug, Clone, PartialEq)]
    pub struct ExportBundle {
        pub version: u32,
        pub exported_at: DateTime<Utc>,
        pub transactions: Vec<Transaction>,
        pub sessions: Vec<WorkSession>,
        pub goals: Vec<Goal>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ImportResult {
        pub transactions: usize,
        pub sessions: usize,
        pub goals: usize,
    }
}
