//! Strategy selection.
//!
//! A pure decision function over the asset, the target feed and the
//! server-advertised feature flags. Unknown feed/kind combinations are
//! rejected by the caller before selection.

use grampost_media::{MediaAsset, MediaKind};
use grampost_protocol::{Feed, FlagSnapshot};

/// Flag base names consulted by the selector (per-feed keys are derived
/// with [`FlagSnapshot::feed_key`]).
pub mod flag {
    pub const RESUMABLE_PHOTO: &str = "resumable_photo_upload";
    pub const RESUMABLE_VIDEO: &str = "resumable_video_upload";
    pub const SEGMENTED_VIDEO: &str = "segmented_video_upload";
    /// Numeric parameter: minimum duration (seconds) for segmenting.
    pub const SEGMENT_MIN_DURATION: &str = "segment_min_duration";
}

/// One of the four transfer mechanisms. Chosen once per asset and
/// never changed mid-transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStrategy {
    SinglePiece,
    Resumable,
    Chunked,
    Segmented,
}

/// Picks the transfer strategy for `asset` targeting `feed`.
///
/// Photos take resumable upload when its per-feed flag is enabled,
/// otherwise single-piece. Videos prefer segmented upload (never for
/// albums, only with the tool available, above the per-feed minimum
/// duration and behind its flag), then resumable, with chunked as the
/// final fallback.
pub fn select_strategy(
    asset: &MediaAsset,
    feed: Feed,
    flags: &FlagSnapshot,
    segmenter_available: bool,
) -> UploadStrategy {
    match asset.kind() {
        MediaKind::Photo => {
            if flags.is_enabled_for(flag::RESUMABLE_PHOTO, feed) {
                UploadStrategy::Resumable
            } else {
                UploadStrategy::SinglePiece
            }
        }
        MediaKind::Video => {
            let min_duration = flags
                .number_for(flag::SEGMENT_MIN_DURATION, feed)
                .unwrap_or_else(|| feed.default_segment_min_duration());

            if feed != Feed::Album
                && segmenter_available
                && asset.duration_secs() > min_duration
                && flags.is_enabled_for(flag::SEGMENTED_VIDEO, feed)
            {
                UploadStrategy::Segmented
            } else if flags.is_enabled_for(flag::RESUMABLE_VIDEO, feed) {
                UploadStrategy::Resumable
            } else {
                UploadStrategy::Chunked
            }
        }
    }
}
