//! HTTP request handlers organized by functionality

pub mod error;
pub mod health;
pub mod media;

// Re-export handler functions
pub use error::ApiError;
pub use health::api_health;
pub use media::{StreamQuery, stream_track};
