//! Target feed enumeration.

use serde::{Deserialize, Serialize};

/// A destination surface for a published asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feed {
    #[serde(rename = "timeline")]
    Timeline,
    #[serde(rename = "story")]
    Story,
    #[serde(rename = "album")]
    Album,
    #[serde(rename = "tv")]
    Tv,
}

impl Feed {
    /// Wire name used in feature-flag keys and configure paths.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Feed::Timeline => "timeline",
            Feed::Story => "story",
            Feed::Album => "album",
            Feed::Tv => "tv",
        }
    }

    /// Path of the configure (finalize) endpoint for this feed.
    pub fn configure_path(&self) -> &'static str {
        match self {
            Feed::Timeline => "/media/configure/",
            Feed::Story => "/media/configure_to_story/",
            Feed::Album => "/media/configure_sidecar/",
            Feed::Tv => "/media/configure_to_tv/",
        }
    }

    /// Default minimum video duration (seconds) for segmented upload,
    /// used when no flag parameter overrides it.
    pub fn default_segment_min_duration(&self) -> f64 {
        match self {
            Feed::Timeline => 150.0,
            Feed::Tv => 60.0,
            Feed::Story | Feed::Album => 0.0,
        }
    }
}
