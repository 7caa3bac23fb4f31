//! Tubely Core Library
//!
//! This crate provides the domain models, error types, and configuration shared by
//! every Tubely component.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, LogFormat, MediaConfig, StorageConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{AspectRatio, CreateVideoRequest, StorageLocator, Thumbnail, Video, VideoResponse};
