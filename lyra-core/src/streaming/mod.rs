//! Byte-range streaming of resolved media files.
//!
//! The pipeline is stateless per request: a [`MediaSource`] exposes a length
//! and a forward-only reader, and the [`RangeResponder`] decides status,
//! headers and byte window before streaming the window to the client.

pub mod local;
pub mod range;
pub mod responder;
pub mod traits;

pub use local::LocalFileSource;
pub use range::{ByteRange, RangeError, parse_range_header, unsatisfied_content_range};
pub use responder::{ByteWindow, RangeResponder, ResponseEnvelope, range_not_satisfiable};
pub use traits::{MediaReader, MediaSource};
