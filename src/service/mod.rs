//! Service layer for the tictac-room game service
//!
//! This module contains the main application state, service coordination,
//! and background task management for the running service.

pub mod app;
pub mod health;

pub use app::{AppState, ServiceError};
pub use health::{HealthCheck, HealthStatus, ServiceProbe};
