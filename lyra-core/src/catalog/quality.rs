//! Quality tiers and the fallback policy between them

use std::fmt;
use std::str::FromStr;

/// Encoding tier of a track file.
///
/// The lowercase name doubles as the tiered subfolder under the media root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Quality {
    /// Lossless FLAC
    #[default]
    Flac,
    /// Compressed Ogg Vorbis
    Ogg,
}

impl Quality {
    /// All tiers in precedence order.
    pub const ALL: [Quality; 2] = [Quality::Flac, Quality::Ogg];

    /// Tier name as used in query strings, catalog keys and folder names.
    pub fn as_str(self) -> &'static str {
        match self {
            Quality::Flac => "flac",
            Quality::Ogg => "ogg",
        }
    }

    /// Ordered list of tiers to try when `self` is requested.
    pub fn fallback(self) -> QualityFallback {
        QualityFallback::new(self)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known tier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown quality tier: {0}")]
pub struct UnknownQuality(pub String);

impl FromStr for Quality {
    type Err = UnknownQuality;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flac" => Ok(Quality::Flac),
            "ogg" => Ok(Quality::Ogg),
            _ => Err(UnknownQuality(s.to_string())),
        }
    }
}

/// Precedence of tiers for one request: the requested tier, then FLAC, then Ogg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityFallback {
    order: Vec<Quality>,
}

impl QualityFallback {
    fn new(requested: Quality) -> Self {
        let mut order = vec![requested];
        for quality in Quality::ALL {
            if !order.contains(&quality) {
                order.push(quality);
            }
        }
        Self { order }
    }

    /// Tiers in the order they are tried.
    pub fn order(&self) -> &[Quality] {
        &self.order
    }
}

impl IntoIterator for QualityFallback {
    type Item = Quality;
    type IntoIter = std::vec::IntoIter<Quality>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.into_iter()
    }
}
