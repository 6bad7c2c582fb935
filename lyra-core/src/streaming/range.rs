//! HTTP Range header parsing
//!
//! Only a single contiguous `bytes=<start>-[<end>]` range is accepted. Every
//! other shape, and every range outside the file, is rejected so the caller
//! can answer `416 Range Not Satisfiable` instead of serving a wrong window.

/// Inclusive byte range within a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered, both ends inclusive.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value of the `Content-Range` header for this range.
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total)
    }
}

/// Reasons a `Range` header cannot be honoured.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// Header is not of the form `bytes=<start>-[<end>]`
    #[error("Malformed range header: {header:?}")]
    Malformed {
        /// Raw header value
        header: String,
    },

    /// Header lists more than one range
    #[error("Multiple ranges are not supported: {header:?}")]
    MultipleRanges {
        /// Raw header value
        header: String,
    },

    /// Range is well-formed but lies outside the file or is inverted
    #[error("Range {start}-{end} not satisfiable for {file_len} bytes")]
    Unsatisfiable {
        /// Requested first byte
        start: u64,
        /// Requested (or defaulted) last byte
        end: u64,
        /// Length of the file
        file_len: u64,
    },
}

/// Value of the `Content-Range` header sent with a 416 response.
pub fn unsatisfied_content_range(file_len: u64) -> String {
    format!("bytes */{file_len}")
}

/// Parses a `Range` header against a file of `file_len` bytes.
///
/// An absent end defaults to the last byte of the file. The result always
/// satisfies `start <= end < file_len`.
///
/// # Errors
///
/// - `RangeError::Malformed` - Unit is not `bytes` (any case), or a bad position
/// - `RangeError::MultipleRanges` - More than one range requested
/// - `RangeError::Unsatisfiable` - `start > end` or `end >= file_len`
///
/// # Examples
/// ```
/// use lyra_core::streaming::{ByteRange, parse_range_header};
///
/// let range = parse_range_header("bytes=100-199", 1000).unwrap();
/// assert_eq!(range, ByteRange { start: 100, end: 199 });
/// assert_eq!(range.len(), 100);
/// ```
pub fn parse_range_header(value: &str, file_len: u64) -> Result<ByteRange, RangeError> {
    let malformed = || RangeError::Malformed {
        header: value.to_string(),
    };

    let (unit, spec) = value.trim().split_once('=').ok_or_else(malformed)?;
    if !unit.trim().eq_ignore_ascii_case("bytes") {
        return Err(malformed());
    }

    if spec.contains(',') {
        return Err(RangeError::MultipleRanges {
            header: value.to_string(),
        });
    }

    let (start_str, end_str) = spec.split_once('-').ok_or_else(malformed)?;

    let start = parse_position(start_str).ok_or_else(malformed)?;
    let end = match end_str.trim() {
        "" => file_len.saturating_sub(1),
        end_str => parse_position(end_str).ok_or_else(malformed)?,
    };

    if start > end || end >= file_len {
        return Err(RangeError::Unsatisfiable {
            start,
            end,
            file_len,
        });
    }

    Ok(ByteRange { start, end })
}

/// Parses a byte position made only of ASCII digits.
fn parse_position(value: &str) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
