//! External video segmentation tool.
//!
//! Segmented upload splits a source video into independent video-only
//! segments plus at most one audio-only segment. The split is done by
//! an external tool invoked as a subprocess; this module owns the
//! resulting temporary files and guarantees their deletion on every
//! exit path (the whole set lives in a [`tempfile::TempDir`]).

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::MediaError;

/// Kind of a produced segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Video,
    Audio,
}

impl SegmentKind {
    /// Wire marker sent with each segment's upload.
    pub fn wire_name(&self) -> &'static str {
        match self {
            SegmentKind::Video => "video",
            SegmentKind::Audio => "audio",
        }
    }
}

/// One temporary segment file.
#[derive(Debug)]
pub struct Segment {
    pub path: PathBuf,
    pub kind: SegmentKind,
    pub size: u64,
}

impl Segment {
    /// Deletes the segment file. Missing files are fine (already
    /// cleaned up); other failures are logged, the owning directory
    /// removal catches them later.
    pub fn delete(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "segment delete failed"),
        }
    }
}

/// Ordered set of segments for one source video: video segments first,
/// the audio segment (if any) last.
///
/// Owns the scratch directory; dropping the set removes every remaining
/// file unconditionally.
#[derive(Debug)]
pub struct SegmentSet {
    _dir: TempDir,
    segments: Vec<Segment>,
}

impl SegmentSet {
    /// Builds a set from an owned scratch directory and ordered segments.
    pub fn new(dir: TempDir, segments: Vec<Segment>) -> Self {
        Self {
            _dir: dir,
            segments,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// External tool that splits a video into upload segments.
pub trait Segmenter: Send + Sync {
    /// Returns `true` if the tool can be invoked on this host.
    fn is_available(&self) -> bool;

    /// Splits `source` into segments of roughly `segment_secs` seconds.
    ///
    /// When `extract_audio` is set, produces one additional audio-only
    /// segment ordered after every video segment. Partial output is
    /// deleted when the split fails.
    fn split<'a>(
        &'a self,
        source: &'a Path,
        segment_secs: u32,
        extract_audio: bool,
    ) -> Pin<Box<dyn Future<Output = Result<SegmentSet, MediaError>> + Send + 'a>>;
}

/// Segmenter backed by the `ffmpeg` binary.
pub struct FfmpegSegmenter {
    binary: PathBuf,
}

impl Default for FfmpegSegmenter {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegSegmenter {
    /// Creates a segmenter invoking the given binary.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<(), MediaError> {
        let output = tokio::process::Command::new(&self.binary)
            .args(args)
            .stdin(std::process::Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MediaError::ToolUnavailable(self.binary.to_string_lossy().into_owned())
                } else {
                    MediaError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr.lines().next_back().unwrap_or("").into();
            return Err(MediaError::Segmentation(format!(
                "{} exited with {}: {tail}",
                self.binary.to_string_lossy(),
                output.status
            )));
        }
        Ok(())
    }
}

impl Segmenter for FfmpegSegmenter {
    fn is_available(&self) -> bool {
        std::process::Command::new(&self.binary)
            .arg("-version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn split<'a>(
        &'a self,
        source: &'a Path,
        segment_secs: u32,
        extract_audio: bool,
    ) -> Pin<Box<dyn Future<Output = Result<SegmentSet, MediaError>> + Send + 'a>> {
        Box::pin(async move {
            let dir = TempDir::new()?;
            let src = source.to_string_lossy().into_owned();
            let video_pattern = dir.path().join("segment.%03d.mp4");
            let secs = segment_secs.to_string();

            // Video-only segments, stream copy (no re-encoding).
            self.run(&[
                "-y",
                "-i",
                &src,
                "-an",
                "-c",
                "copy",
                "-f",
                "segment",
                "-segment_time",
                &secs,
                "-reset_timestamps",
                "1",
                &video_pattern.to_string_lossy(),
            ])
            .await?;

            let audio_path = dir.path().join("audio.m4a");
            if extract_audio {
                self.run(&["-y", "-i", &src, "-vn", "-c", "copy", &audio_path.to_string_lossy()])
                    .await?;
            }

            let segments = collect_segments(dir.path(), extract_audio.then_some(&audio_path))?;
            if segments.is_empty() {
                return Err(MediaError::Segmentation(
                    "tool produced no segments".into(),
                ));
            }

            debug!(
                source = %source.display(),
                segments = segments.len(),
                "segmentation complete"
            );
            Ok(SegmentSet::new(dir, segments))
        })
    }
}

/// Gathers numbered video segments (sorted by name) followed by the
/// audio segment, if present.
fn collect_segments(dir: &Path, audio: Option<&PathBuf>) -> Result<Vec<Segment>, MediaError> {
    let mut video_paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().starts_with("segment."))
                .unwrap_or(false)
        })
        .collect();
    video_paths.sort();

    let mut segments = Vec::with_capacity(video_paths.len() + 1);
    for path in video_paths {
        let size = std::fs::metadata(&path)?.len();
        segments.push(Segment {
            path,
            kind: SegmentKind::Video,
            size,
        });
    }

    if let Some(audio_path) = audio
        && audio_path.exists()
    {
        let size = std::fs::metadata(audio_path)?.len();
        segments.push(Segment {
            path: audio_path.clone(),
            kind: SegmentKind::Audio,
            size,
        });
    }

    Ok(segments)
}
