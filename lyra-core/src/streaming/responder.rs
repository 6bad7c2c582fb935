//! Range streaming responder
//!
//! Turns a media source and an optional `Range` header into a response:
//! `200` with the whole file, `206` with exactly the requested window, or
//! `416` when the range cannot be served. The body is read forward from the
//! window start in fixed-size chunks and never buffered as a whole.

use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::{Stream, stream};
use serde_json::json;
use tokio::io::AsyncReadExt;
use tracing::{debug, error, warn};

use super::local::LocalFileSource;
use super::range::{RangeError, parse_range_header, unsatisfied_content_range};
use super::traits::{MediaReader, MediaSource};
use crate::catalog::FileLocation;

/// Contiguous slice of the file that a response transmits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteWindow {
    pub offset: u64,
    pub length: u64,
}

/// Status, headers and byte window of a successful response, computed without I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub content_type: String,
    pub content_length: u64,
    /// Present only on `206` responses
    pub content_range: Option<String>,
    pub window: ByteWindow,
}

/// Serves one media source with HTTP range semantics.
pub struct RangeResponder {
    source: Arc<dyn MediaSource>,
    content_type: String,
    chunk_size: usize,
}

impl RangeResponder {
    pub fn new(
        source: Arc<dyn MediaSource>,
        content_type: impl Into<String>,
        chunk_size: usize,
    ) -> Self {
        Self {
            source,
            content_type: content_type.into(),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Responder for a resolved file on local disk.
    pub fn for_location(location: &FileLocation, chunk_size: usize) -> Self {
        Self::new(
            Arc::new(LocalFileSource::from(location)),
            location.content_type,
            chunk_size,
        )
    }

    /// Computes the response envelope for an optional `Range` header value.
    ///
    /// # Errors
    ///
    /// - `RangeError` - The header is malformed, lists several ranges, or lies outside the file
    pub fn plan(&self, range_header: Option<&str>) -> Result<ResponseEnvelope, RangeError> {
        let file_len = self.source.len();

        match range_header {
            None => Ok(ResponseEnvelope {
                status: StatusCode::OK,
                content_type: self.content_type.clone(),
                content_length: file_len,
                content_range: None,
                window: ByteWindow {
                    offset: 0,
                    length: file_len,
                },
            }),
            Some(value) => {
                let range = parse_range_header(value, file_len)?;
                Ok(ResponseEnvelope {
                    status: StatusCode::PARTIAL_CONTENT,
                    content_type: self.content_type.clone(),
                    content_length: range.len(),
                    content_range: Some(range.content_range(file_len)),
                    window: ByteWindow {
                        offset: range.start,
                        length: range.len(),
                    },
                })
            }
        }
    }

    /// Builds the full HTTP response, opening the source only for servable requests.
    pub async fn respond(&self, range_header: Option<&str>) -> Response {
        let envelope = match self.plan(range_header) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Rejecting range request: {e}");
                return range_not_satisfiable(self.source.len());
            }
        };

        let reader = match self.source.open_at(envelope.window.offset).await {
            Ok(reader) => reader,
            Err(e) => {
                error!("Failed to open media for streaming: {e}");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to read music file" })),
                )
                    .into_response();
            }
        };

        debug!(
            "Streaming {} bytes from offset {} ({})",
            envelope.window.length, envelope.window.offset, envelope.status
        );

        let body = Body::from_stream(window_stream(
            reader,
            envelope.window.length,
            self.chunk_size,
        ));

        let mut response = Response::builder()
            .status(envelope.status)
            .header(header::CONTENT_TYPE, &envelope.content_type)
            .header(header::CONTENT_LENGTH, envelope.content_length.to_string())
            .header(header::ACCEPT_RANGES, "bytes");

        if let Some(content_range) = &envelope.content_range {
            response = response.header(header::CONTENT_RANGE, content_range);
        }

        response
            .body(body)
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}

/// `416` response advertising the real file length.
pub fn range_not_satisfiable(file_len: u64) -> Response {
    let content_range = HeaderValue::from_str(&unsatisfied_content_range(file_len))
        .unwrap_or_else(|_| HeaderValue::from_static("bytes */0"));

    (
        StatusCode::RANGE_NOT_SATISFIABLE,
        [(header::CONTENT_RANGE, content_range)],
        Json(json!({ "error": "Range not satisfiable" })),
    )
        .into_response()
}

/// Reads exactly `length` bytes from `reader` as a chunked body stream.
///
/// The reader moves into the stream state, so it is dropped as soon as the
/// stream finishes, fails, or the client goes away. A read error or an early
/// EOF yields one error item and ends the stream, which aborts the response.
fn window_stream(
    reader: MediaReader,
    length: u64,
    chunk_size: usize,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send {
    stream::unfold((reader, length), move |(mut reader, remaining)| async move {
        if remaining == 0 {
            return None;
        }

        let want = remaining.min(chunk_size as u64) as usize;
        let mut buffer = vec![0u8; want];

        match reader.read(&mut buffer).await {
            Ok(0) => {
                error!("Media ended with {remaining} bytes still expected");
                Some((
                    Err(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "media shorter than advertised length",
                    )),
                    (reader, 0),
                ))
            }
            Ok(read) => {
                buffer.truncate(read);
                Some((Ok(Bytes::from(buffer)), (reader, remaining - read as u64)))
            }
            Err(e) => {
                error!("Read failed mid-stream with {remaining} bytes left: {e}");
                Some((Err(e), (reader, 0)))
            }
        }
    })
}
