//! Tubely Storage Library
//!
//! Object storage for processed videos and the keyed thumbnail store.
//!
//! # Storage key format
//!
//! Video keys are `{prefix}/{random}.{subtype}` where `prefix` is the aspect-ratio
//! classification (`landscape`, `portrait`, `other`) and `random` is 32 bytes from the OS
//! random source encoded as unpadded URL-safe base64. Keys must not contain `..` or a
//! leading `/`. Key generation lives in the `keys` module.

pub mod factory;
pub mod keys;
pub mod memory;
pub mod s3;
pub mod thumbnail;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::name_key;
pub use memory::MemoryStorage;
pub use s3::S3Storage;
pub use thumbnail::{MemoryThumbnailStore, ThumbnailStore};
pub use traits::{validate_key, Storage, StorageError, StorageResult};
