//! Integration tests for Lyra
//!
//! Drive the full router in-process against a temporary media tree and check
//! status codes, headers and the exact bytes delivered.

#[path = "integration/catalog_resolution.rs"]
mod catalog_resolution;
#[path = "integration/range_streaming.rs"]
mod range_streaming;
#[path = "integration/stream_routes.rs"]
mod stream_routes;
