//! Media asset descriptors and the external segmentation tool.
//!
//! Local validation and normalization (cropping, aspect-ratio checks,
//! thumbnail extraction) happen outside this workspace; this crate only
//! models a pre-validated file plus its known facts, and drives the
//! external tool that splits a video into upload segments.

pub mod asset;
pub mod segmenter;

pub use asset::{MediaAsset, MediaFacts, MediaKind, MediaProbe};
pub use segmenter::{FfmpegSegmenter, Segment, SegmentKind, SegmentSet, Segmenter};

/// Errors produced by the media crate.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid media: {0}")]
    Probe(String),

    #[error("segmentation tool unavailable: {0}")]
    ToolUnavailable(String),

    #[error("segmentation failed: {0}")]
    Segmentation(String),
}
