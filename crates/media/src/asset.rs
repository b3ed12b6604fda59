//! Immutable descriptors for validated local media files.

use std::path::{Path, PathBuf};

use crate::MediaError;

/// Kind of a media asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
}

/// Facts about a media file, as reported by an external validator.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFacts {
    pub kind: MediaKind,
    pub width: u32,
    pub height: u32,
    /// Duration in seconds; 0 for photos.
    pub duration_secs: f64,
    /// Whether the file carries an audio track.
    pub has_audio: bool,
}

/// Collaborator that inspects a file and returns its media facts.
///
/// Implemented by the host application (typically over ffprobe or a
/// platform media framework). Must raise on invalid media so that
/// assets entering the upload pipeline are always well-formed.
pub trait MediaProbe: Send + Sync {
    fn probe(&self, path: &Path) -> Result<MediaFacts, MediaError>;
}

/// An immutable descriptor of a local, already-validated media file.
///
/// Owned by the upload call that created it; the file itself belongs to
/// the caller and is never deleted by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAsset {
    path: PathBuf,
    size: u64,
    facts: MediaFacts,
}

impl MediaAsset {
    /// Builds an asset by probing `path` with the given validator.
    pub fn from_probe(path: impl Into<PathBuf>, probe: &dyn MediaProbe) -> Result<Self, MediaError> {
        let path = path.into();
        let facts = probe.probe(&path)?;
        let size = std::fs::metadata(&path)?.len();
        Ok(Self { path, size, facts })
    }

    /// Builds an asset from already-known facts (tests, pre-probed files).
    pub fn from_facts(path: impl Into<PathBuf>, size: u64, facts: MediaFacts) -> Self {
        Self {
            path: path.into(),
            size,
            facts,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn kind(&self) -> MediaKind {
        self.facts.kind
    }

    pub fn width(&self) -> u32 {
        self.facts.width
    }

    pub fn height(&self) -> u32 {
        self.facts.height
    }

    pub fn duration_secs(&self) -> f64 {
        self.facts.duration_secs
    }

    pub fn has_audio(&self) -> bool {
        self.facts.has_audio
    }

    pub fn is_video(&self) -> bool {
        self.facts.kind == MediaKind::Video
    }

    /// File basename, used to identify the asset in wrapped errors.
    pub fn basename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}
