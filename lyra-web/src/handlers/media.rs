//! Track streaming handler
//!
//! `GET /media/tracks/{id}/stream?quality={flac|ogg}` resolves the track
//! through the catalog and hands the file to the range responder.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, header};
use axum::response::Response;
use lyra_core::{Quality, RangeResponder};
use serde::Deserialize;
use tracing::{info, warn};

use super::error::ApiError;
use crate::server::AppState;

/// Query parameters for streaming requests
#[derive(Debug, Default, Deserialize)]
pub struct StreamQuery {
    /// Requested tier (`flac` or `ogg`); the configured default when absent
    pub quality: Option<String>,
}

impl StreamQuery {
    fn quality(&self, default: Quality) -> Result<Quality, ApiError> {
        match self.quality.as_deref().map(str::trim) {
            None | Some("") => Ok(default),
            Some(value) => value
                .parse()
                .map_err(|_| ApiError::InvalidQuality(value.to_string())),
        }
    }
}

/// Streams a catalog track, honouring a single `Range` header.
///
/// # Errors
///
/// - `ApiError::InvalidTrackId` - Path id is not an integer
/// - `ApiError::InvalidQuality` - Unknown `quality` value
/// - `ApiError::Resolve` - Track, tier or file not found, or catalog unavailable
pub async fn stream_track(
    State(state): State<AppState>,
    Path(track_id): Path<String>,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let track_id: u64 = track_id
        .trim()
        .parse()
        .map_err(|_| ApiError::InvalidTrackId(track_id.clone()))?;
    let quality = query.quality(state.config.media.default_quality)?;

    let location = match state.resolver.resolve(track_id, quality).await {
        Ok(location) => location,
        Err(e) => {
            if e.is_not_found() {
                warn!("Stream request for track {track_id} ({quality}) failed: {e}");
            }
            return Err(e.into());
        }
    };

    // Non-UTF-8 values fall through as malformed and are answered with 416
    let range = headers
        .get(header::RANGE)
        .map(|value| value.to_str().unwrap_or_default());

    info!(
        "Streaming track {} ({} -> {}): {} bytes, range={:?}",
        track_id,
        quality,
        location.path.display(),
        location.len,
        range
    );

    let responder = RangeResponder::for_location(&location, state.config.streaming.chunk_size);
    Ok(responder.respond(range).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_defaults_when_absent() {
        let query = StreamQuery { quality: None };
        assert_eq!(query.quality(Quality::Flac).unwrap(), Quality::Flac);

        let query = StreamQuery {
            quality: Some(" ".to_string()),
        };
        assert_eq!(query.quality(Quality::Ogg).unwrap(), Quality::Ogg);
    }

    #[test]
    fn test_quality_parsing() {
        let query = StreamQuery {
            quality: Some("ogg".to_string()),
        };
        assert_eq!(query.quality(Quality::Flac).unwrap(), Quality::Ogg);

        let query = StreamQuery {
            quality: Some("mp3".to_string()),
        };
        assert!(matches!(
            query.quality(Quality::Flac),
            Err(ApiError::InvalidQuality(value)) if value == "mp3"
        ));
    }
}
