//! Typed classification of API error responses.
//!
//! The remote side signals terminal conditions through a JSON body
//! (`message` / `error_type`) and, for rate limiting, the HTTP status.
//! Both the transfer and publish retry loops consult this
//! classification: a `Some(ApiErrorKind)` must propagate immediately
//! without consuming a retry.

use serde::{Deserialize, Serialize};

/// Error body shape returned by the remote API on failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_title: String,
}

/// Non-retryable API failure kinds.
///
/// Each variant maps to a server-side condition the client cannot fix
/// by retrying the same request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ApiErrorKind {
    #[error("login required")]
    LoginRequired,
    #[error("checkpoint required")]
    CheckpointRequired,
    #[error("consent required")]
    ConsentRequired,
    #[error("feedback required")]
    FeedbackRequired,
    #[error("rate limited")]
    RateLimited,
}

impl ApiErrorKind {
    /// Classifies an HTTP response as a non-retryable API error.
    ///
    /// Returns `None` when the response is not a recognized terminal
    /// condition (transient failures, protocol-recoverable statuses and
    /// plain rejections are handled by the callers).
    pub fn classify(status: u16, body: &[u8]) -> Option<Self> {
        if status == 429 {
            return Some(Self::RateLimited);
        }

        let parsed: ApiErrorBody = serde_json::from_slice(body).unwrap_or_default();
        let marker = if parsed.message.is_empty() {
            parsed.error_type.as_str()
        } else {
            parsed.message.as_str()
        };

        match marker {
            "login_required" => Some(Self::LoginRequired),
            "checkpoint_required" | "challenge_required" => Some(Self::CheckpointRequired),
            "consent_required" => Some(Self::ConsentRequired),
            "feedback_required" => Some(Self::FeedbackRequired),
            "rate_limit_error" => Some(Self::RateLimited),
            _ => None,
        }
    }
}
