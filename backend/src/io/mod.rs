//! # IO Module
//!
//! Adapter layer between clients and the domain logic. It translates HTTP
//! requests into domain operations and domain results into JSON responses,
//! keeping transport concerns out of the domain.
//!
//! - **Web Framework**: Axum for async HTTP handling
//! - **Serialization**: Serde DTOs from the `shared` crate
//! - **State Management**: Services injected through Axum state
//! - **Errors**: Domain errors mapped to HTTP status codes in one place

pub mod rest;

pub use rest::*;
