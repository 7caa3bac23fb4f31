//! Tubely registry access
//!
//! The registry's storage engine is external; this crate defines the read/write contract the
//! upload pipeline depends on, plus an in-memory implementation for development and tests.

pub mod db;

pub use db::{
    InMemoryVideoRepository, RepositoryError, RepositoryResult, VideoChange, VideoRepository,
};
