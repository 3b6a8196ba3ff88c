//! # Domain Module
//!
//! Contains all business logic for the gig tracker.
//!
//! This module encapsulates how a driver's earnings, expenses and work
//! sessions are modeled, and how earnings flow into recurring goals. It
//! operates independently of any specific transport or storage mechanism.
//!
//! ## Module Organization
//!
//! - **time_window**: Day/week/month boundaries and reset due-ness
//! - **goal_accrual**: Crediting earnings to goals and periodic resets
//! - **goal_service**: Goal CRUD and explicit resets
//! - **transaction_service**: Income/expense entries and window summaries
//! - **session_service**: Work sessions; completion triggers accrual
//! - **data_transfer_service**: Whole-account export and import
//!
//! ## Core Concepts
//!
//! - **Goal**: A target amount for one category over a day, week or month
//! - **Window**: The calendar period a goal's progress belongs to
//! - **Accrual**: Adding earnings to every goal of the matching category
//! - **UserContext**: The identity every operation is scoped to
//!
//! ## Business Rules
//!
//! - Earnings amounts are finite and strictly positive
//! - Category matching is exact after trimming and lowercasing
//! - A goal whose window rolled over restarts from zero before being credited
//! - Goals with periods other than daily/weekly/monthly never reset

pub mod clock;
pub mod commands;
pub mod data_transfer_service;
pub mod errors;
pub mod goal_accrual;
pub mod goal_service;
pub mod models;
pub mod notification;
pub mod session_service;
pub mod time_window;
pub mod transaction_service;
pub mod user_context;

pub use clock::{Clock, FixedClock, SystemClock};
pub use data_transfer_service::DataTransferService;
pub use errors::{AccrualError, DomainError};
pub use goal_accrual::{AccrualPolicy, AccrualReport, GoalAccrualEngine, SweepReport};
pub use goal_service::GoalService;
pub use notification::{Notification, NotificationSink, TracingNotificationSink};
pub use session_service::SessionService;
pub use time_window::{WeekStart, WindowCalculator, WindowKind, WindowZone};
pub use transaction_service::TransactionService;
pub use user_context::UserContext;
