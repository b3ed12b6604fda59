//! Configure (finalize) response payloads.

use serde::{Deserialize, Serialize};

/// Body marker the server uses when the uploaded bytes are unusable and
/// must be transferred again from scratch.
pub const NEEDS_REUPLOAD_MARKER: &str = "media_needs_reupload";

/// A finalized, published media descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    /// Server-assigned media identifier.
    pub id: String,
    /// Short public code of the post, when assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Response of a configure call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigureResponse {
    /// `"ok"` on success; anything else is a soft failure.
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Server-suggested cooldown before the next attempt (202 bodies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaDescriptor>,
}

impl ConfigureResponse {
    /// Returns `true` when the body's own status flag signals success.
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// Returns `true` when the server says the uploaded bytes are
    /// unusable and the transfer must restart from scratch.
    pub fn needs_reupload(&self) -> bool {
        self.message.as_deref() == Some(NEEDS_REUPLOAD_MARKER)
    }
}
