//! Header parameter builders for the raw-upload endpoints.
//!
//! Every upload request carries the same entity declaration: a stable
//! entity name, the total entity length, the entity type, the byte
//! offset being sent, and session/waterfall correlation ids. These are
//! built here as typed helpers instead of ad hoc string maps so that
//! all transfer strategies declare bytes identically.

use serde::{Deserialize, Serialize};

/// MIME classification of the uploaded entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "image/jpeg")]
    Image,
    #[serde(rename = "video/mp4")]
    Video,
}

impl EntityType {
    pub fn mime(&self) -> &'static str {
        match self {
            EntityType::Image => "image/jpeg",
            EntityType::Video => "video/mp4",
        }
    }
}

/// Upload header parameter set for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct RuploadParams {
    /// Correlates all requests of one asset transfer and its configure.
    pub upload_id: String,
    /// Correlates the whole publish flow for server-side tracing.
    pub waterfall_id: String,
    /// Stable name of the entity on the upload host.
    pub entity_name: String,
    /// Total entity size in bytes.
    pub entity_length: u64,
    pub entity_type: EntityType,
}

impl RuploadParams {
    /// Parameters for a photo entity.
    pub fn photo(upload_id: impl Into<String>, entity_length: u64) -> Self {
        let upload_id = upload_id.into();
        Self {
            entity_name: format!("{upload_id}_photo"),
            waterfall_id: new_waterfall_id(),
            upload_id,
            entity_length,
            entity_type: EntityType::Image,
        }
    }

    /// Parameters for a video entity.
    pub fn video(upload_id: impl Into<String>, entity_length: u64) -> Self {
        let upload_id = upload_id.into();
        Self {
            entity_name: format!("{upload_id}_video"),
            waterfall_id: new_waterfall_id(),
            upload_id,
            entity_length,
            entity_type: EntityType::Video,
        }
    }

    /// Endpoint path for resumable/single-piece transfer of this entity.
    pub fn upload_path(&self) -> String {
        match self.entity_type {
            EntityType::Image => format!("/rupload_photo/{}", self.entity_name),
            EntityType::Video => format!("/rupload_video/{}", self.entity_name),
        }
    }

    /// Headers for an offset query (no byte range yet).
    pub fn session_headers(&self) -> Vec<(String, String)> {
        vec![
            ("X-Entity-Name".into(), self.entity_name.clone()),
            ("X-Upload-Session".into(), self.upload_id.clone()),
            ("X-Waterfall-Id".into(), self.waterfall_id.clone()),
        ]
    }

    /// Headers declaring a byte send starting at `offset`.
    pub fn upload_headers(&self, offset: u64) -> Vec<(String, String)> {
        let mut headers = self.session_headers();
        headers.push(("X-Entity-Length".into(), self.entity_length.to_string()));
        headers.push(("X-Entity-Type".into(), self.entity_type.mime().into()));
        headers.push(("Offset".into(), offset.to_string()));
        headers
    }
}

/// Formats a `Content-Range` header value for a chunk.
///
/// `end` is inclusive, matching the wire convention
/// (`bytes 0-4076155/8152310`).
pub fn content_range(start: u64, end: u64, total: u64) -> String {
    format!("bytes {start}-{end}/{total}")
}

/// Headers identifying one segment within a segmented-upload stream.
///
/// `start_offset` is the ordering offset (cumulative bytes of preceding
/// segments); it is not used for byte-range math.
pub fn segment_headers(
    segment_type: &str,
    start_offset: u64,
    stream_id: &str,
) -> Vec<(String, String)> {
    vec![
        ("Segment-Type".into(), segment_type.into()),
        ("Segment-Start-Offset".into(), start_offset.to_string()),
        ("Stream-Id".into(), stream_id.into()),
    ]
}

/// Path of the segmented-upload stream start endpoint.
pub fn stream_start_path(upload_id: &str) -> String {
    format!("/rupload_video/{upload_id}/stream_start/")
}

/// Path of the per-segment transfer endpoint within a stream.
pub fn stream_transfer_path(upload_id: &str, stream_id: &str) -> String {
    format!("/rupload_video/{upload_id}/stream/{stream_id}/")
}

/// Path of the segmented-upload stream end endpoint.
pub fn stream_end_path(upload_id: &str, stream_id: &str) -> String {
    format!("/rupload_video/{upload_id}/stream/{stream_id}/end/")
}

/// Generates a fresh upload id.
pub fn new_upload_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Generates a fresh waterfall id.
pub fn new_waterfall_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
