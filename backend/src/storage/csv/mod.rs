//! CSV file storage, one directory per user.

pub mod connection;
pub mod goal_repository;
pub mod session_repository;
pub mod transaction_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::CsvConnection;
pub use goal_repository::GoalRepository;
pub use session_repository::SessionRepository;
pub use transaction_repository::TransactionRepository;
