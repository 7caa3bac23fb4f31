//! Tubely API Library
//!
//! This crate provides the HTTP handlers, authentication and application setup for the
//! upload service.

mod handlers;
mod utils;

pub mod auth;
pub mod error;
pub mod setup;
pub mod state;
pub mod telemetry;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
