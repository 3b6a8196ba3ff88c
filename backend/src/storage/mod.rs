//! # Storage Module
//!
//! Handles all data persistence for the tracker. The domain layer only sees
//! the traits in [`traits`]; the backends behind them can be swapped without
//! touching domain logic or the REST layer.
//!
//! ## Backends
//!
//! - **memory**: process-local maps, for tests and throwaway deployments
//! - **csv**: one directory per user with `goals.csv`, `transactions.csv`
//!   and `sessions.csv`, rewritten atomically through temp files
//!
//! ## Guarantees
//!
//! A single call is atomic for the record it touches. Goal updates can carry
//! a [`WriteCondition`] so callers can detect concurrent writers instead of
//! overwriting them. Nothing spans more than one record.

pub mod csv;
pub mod error;
pub mod memory;
pub mod traits;

pub use self::csv::CsvConnection;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use traits::{
    Connection, GoalStorage, SessionStorage, TransactionFilter, TransactionStorage, WriteCondition,
};
