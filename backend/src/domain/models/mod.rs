pub mod goal;
pub mod session;
pub mod transaction;
