//! Wire types exchanged between the gig tracker backend and its clients.
//!
//! Timestamps travel as RFC 3339 strings; amounts are plain `f64` in the
//! user's currency.

use serde::{Deserialize, Serialize};

/// Goal ID in format: "goal::<uuid>"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    /// Earnings category the goal tracks (matched case-insensitively)
    pub category: String,
    /// "daily", "weekly", "monthly", or any other value for a goal that never resets
    pub period: String,
    pub target: f64,
    pub current: f64,
    /// `current / target` clamped to [0, 1]
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub reached: bool,
    /// Start of the goal's current window (RFC 3339)
    pub last_reset: String,
    pub created_at: String,
    #[serde(default)]
    pub revision: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGoalRequest {
    /// Goal name (1-256 characters)
    pub name: String,
    pub category: String,
    pub period: String,
    pub target: f64,
}

/// Fields left out are unchanged. Progress cannot be edited.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateGoalRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub target: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalListResponse {
    pub goals: Vec<Goal>,
}

/// Credit earnings to every goal of a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyEarningsRequest {
    pub amount: f64,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalCredit {
    pub goal_id: String,
    /// Progress the amount was added to (0 when the window rolled over)
    pub previous: f64,
    pub current: f64,
    pub was_reset: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalWriteFailure {
    pub goal_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualReport {
    pub category: String,
    pub amount: f64,
    pub credited: Vec<GoalCredit>,
    pub failures: Vec<GoalWriteFailure>,
}

/// What happened to goals after earnings were recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AccrualOutcome {
    Applied { report: AccrualReport },
    Skipped,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalReset {
    pub goal_id: String,
    pub previous: f64,
    pub reset_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResponse {
    pub reset: Vec<GoalReset>,
    pub failures: Vec<GoalWriteFailure>,
}

/// Direction of money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// Transaction ID in format: "transaction::<income|expense>::<uuid>"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    /// Always positive; direction lives in `kind`
    pub amount: f64,
    pub category: String,
    /// Free text (max 256 characters)
    pub description: String,
    /// When the money moved (RFC 3339)
    pub date: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Optional date override (RFC 3339) - uses current time if not provided
    #[serde(default)]
    pub date: Option<String>,
    /// Credit income to goals of the same category
    #[serde(default)]
    pub apply_to_goals: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionResponse {
    pub transaction: Transaction,
    pub accrual: AccrualOutcome,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransactionListRequest {
    /// Inclusive start date for filtering (RFC 3339)
    pub start_date: Option<String>,
    /// Exclusive end date for filtering (RFC 3339)
    pub end_date: Option<String>,
    /// "income" or "expense"
    pub kind: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummaryRequest {
    /// "day", "week" or "month"
    pub window: String,
    /// Instant whose window is summarized (RFC 3339); defaults to now
    pub at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub window: String,
    pub start: String,
    pub end: String,
    pub income: f64,
    pub expense: f64,
    pub net: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

/// Session ID in format: "session::<uuid>"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSession {
    pub id: String,
    pub started_at: String,
    pub ended_at: Option<String>,
    pub earnings: f64,
    pub distance_km: f64,
    pub rides: u32,
    pub notes: String,
    pub status: SessionStatus,
    /// Elapsed minutes (up to now for an active session)
    #[serde(default)]
    pub duration_minutes: i64,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StartSessionRequest {
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteSessionRequest {
    pub earnings: f64,
    pub distance_km: f64,
    #[serde(default)]
    pub rides: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteSessionResponse {
    pub session: WorkSession,
    pub accrual: AccrualOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<WorkSession>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSessionResponse {
    pub session: Option<WorkSession>,
}

/// Full snapshot of one user's data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub version: u32,
    pub exported_at: String,
    pub transactions: Vec<Transaction>,
    pub sessions: Vec<WorkSession>,
    pub goals: Vec<Goal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResponse {
    pub transactions: usize,
    pub sessions: usize,
    pub goals: usize,
}

/// Body of every non-2xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
