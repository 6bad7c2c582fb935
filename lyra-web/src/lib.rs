//! Lyra Web - JSON API and media streaming server

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
//!
//! Serves the personal audio library over HTTP: byte-range streaming of
//! catalog tracks plus a health endpoint for the frontend and monitoring.

pub mod handlers;
pub mod server;

// Re-export main types
pub use server::{AppState, build_router, run_server};
