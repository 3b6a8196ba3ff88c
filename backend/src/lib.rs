//! # Gig Tracker Backend
//!
//! Contains all non-UI logic for tracking a gig driver's earnings, expenses,
//! work sessions and recurring goals.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! ```text
//! Clients (web / mobile)
//!     ↓
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (Business logic, services, accrual engine)
//!     ↓
//! Storage Layer (in-memory or CSV persistence)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Initialize and configure the application state
//! - Set up the REST API router with proper CORS configuration
//! - Coordinate between domain logic and data persistence

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::{AppConfig, StorageKind};
use crate::domain::{
    AccrualPolicy, Clock, DataTransferService, GoalAccrualEngine, GoalService, NotificationSink,
    SessionService, SystemClock, TracingNotificationSink, TransactionService, WindowCalculator,
};
use crate::io::rest::{accrual_apis, data_transfer_apis, goal_apis, session_apis, transaction_apis};
use crate::storage::{Connection, CsvConnection, MemoryStore};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState<C: Connection> {
    pub goal_service: GoalService<C>,
    pub transaction_service: TransactionService<C>,
    pub session_service: SessionService<C>,
    pub data_transfer_service: DataTransferService<C>,
    pub accrual: GoalAccrualEngine<C::GoalRepository>,
    pub clock: Arc<dyn Clock>,
}

impl<C: Connection> AppState<C> {
    pub fn new(
        connection: Arc<C>,
        clock: Arc<dyn Clock>,
        windows: WindowCalculator,
        notifier: Arc<dyn NotificationSink>,
        policy: AccrualPolicy,
    ) -> Self {
        let accrual = GoalAccrualEngine::new(connection.create_goal_repository(), clock.clone())
            .with_windows(windows)
            .with_notifier(notifier)
            .with_policy(policy);

        Self {
            goal_service: GoalService::new(connection.clone(), clock.clone()),
            transaction_service: TransactionService::new(connection.clone(), windows, clock.clone()),
            session_service: SessionService::new(connection.clone(), accrual.clone(), clock.clone()),
            data_transfer_service: DataTransferService::new(connection, clock.clone()),
            accrual,
            clock,
        }
    }
}

/// Initialize the backend with all required services and return the ready router
pub fn initialize_backend(config: &AppConfig) -> Result<Router> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let notifier: Arc<dyn NotificationSink> = Arc::new(TracingNotificationSink);
    let windows = config.accrual.window_calculator()?;
    let policy = config.accrual.policy();

    match config.storage {
        StorageKind::Csv => {
            info!("Setting up CSV storage in {}", config.data_dir.display());
            let connection = CsvConnection::new(&config.data_dir)
                .with_context(|| format!("Failed to open data directory {}", config.data_dir.display()))?;
            let state = AppState::new(Arc::new(connection), clock, windows, notifier, policy);
            create_router(state, &config.allowed_origin)
        }
        StorageKind::Memory => {
            info!("Setting up in-memory storage; data is lost on exit");
            let state = AppState::new(Arc::new(MemoryStore::new()), clock, windows, notifier, policy);
            create_router(state, &config.allowed_origin)
        }
    }
}

/// Create the Axum router with all routes configured
pub fn create_router<C: Connection>(app_state: AppState<C>, allowed_origin: &str) -> Result<Router> {
    let origin: HeaderValue = allowed_origin
        .parse()
        .with_context(|| format!("Invalid CORS origin '{}'", allowed_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .nest("/goals", goal_apis::router())
        .nest("/accruals", accrual_apis::router())
        .nest("/transactions", transaction_apis::router())
        .nest("/sessions", session_apis::router())
        .merge(data_transfer_apis::router());

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state))
}
