//! Errors produced by the publish crate.

use grampost_protocol::ApiErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("media error: {0}")]
    Media(#[from] grampost_media::MediaError),

    /// Non-retryable API condition surfaced by transfer or configure.
    #[error("API error: {0}")]
    Api(ApiErrorKind),

    /// The server declared the uploaded bytes unusable; the caller must
    /// transfer the asset again from scratch.
    #[error("uploaded media must be transferred again")]
    NeedsReupload,

    /// The configure loop exhausted its attempts.
    #[error("all {attempts} configure attempts failed: {last}")]
    ConfigureFailed { attempts: u32, last: String },

    /// Configure reported success without a media descriptor in the body.
    #[error("configure succeeded without a media descriptor")]
    MissingDescriptor,

    /// A transfer failed; carries the asset's basename for the caller.
    #[error("upload of {name} failed: {message}")]
    UploadFailed { name: String, message: String },
}

impl PublishError {
    /// Wraps a transfer failure with the asset's basename. Non-retryable
    /// API conditions keep their typed form.
    pub fn from_transfer(name: &str, err: grampost_transfer::TransferError) -> Self {
        match err {
            grampost_transfer::TransferError::Api(kind) => PublishError::Api(kind),
            other => PublishError::UploadFailed {
                name: name.to_string(),
                message: other.to_string(),
            },
        }
    }
}
