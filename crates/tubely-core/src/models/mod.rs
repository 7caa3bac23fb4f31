//! Data models for the application
//!
//! Each sub-module represents one concept of the upload pipeline.

mod media;
mod storage;
mod thumbnail;
mod video;

pub use media::*;
pub use storage::*;
pub use thumbnail::*;
pub use video::*;
