//! Transfer strategies for moving media bytes to the remote upload host.
//!
//! Four mutually exclusive strategies cover the whole surface:
//! single-piece (small photos), resumable (offset-negotiated streaming),
//! chunked (legacy multi-chunk video with missing-range recovery) and
//! segmented (independent audio/video segments over a server stream).
//! The strategy is chosen once per asset by [`select_strategy`] and
//! never changes mid-transfer.

pub mod chunked;
pub mod progress;
pub mod reader;
pub mod resumable;
pub mod segmented;
pub mod selector;
pub mod session;
pub mod single;
pub mod transport;
pub mod window;

pub use chunked::ChunkedTransfer;
pub use progress::{ProgressCallback, SpeedCalculator, TransferProgress};
pub use reader::ChunkSource;
pub use resumable::{ResumableRequest, ResumableTransfer};
pub use segmented::SegmentedTransfer;
pub use selector::{UploadStrategy, select_strategy};
pub use session::UploadSession;
pub use single::SinglePieceTransfer;
pub use transport::UploadTransport;
pub use window::{ChunkWindow, HeldRange, first_gap, parse_held_ranges};

use grampost_protocol::ApiErrorKind;

/// Smallest chunk the chunked strategy will send: 200 KiB.
pub const MIN_CHUNK_SIZE: u64 = 200 * 1024;

/// Largest chunk the chunked strategy will send: 5 MiB.
pub const MAX_CHUNK_SIZE: u64 = 5 * 1024 * 1024;

/// Attempt ceiling for a resumable transfer.
pub const RESUMABLE_MAX_ATTEMPTS: u32 = 15;

/// Attempts against one upload server before rotating to the next.
pub const CHUNK_ATTEMPTS_PER_SERVER: u32 = 5;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Network-level failure before any HTTP status was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-retryable API condition; propagates without consuming a retry.
    #[error("API error: {0}")]
    Api(ApiErrorKind),

    /// Terminal HTTP rejection (400/403/511).
    #[error("upload rejected with status {0}")]
    Rejected(u16),

    /// The server considers the uploaded media corrupt (422).
    #[error("server reports media as corrupt")]
    CorruptMedia,

    #[error("no upload servers remaining")]
    NoServersLeft,

    #[error("all {attempts} upload attempts failed: {last}")]
    AllRetriesFailed { attempts: u32, last: String },

    #[error("malformed range header: {0}")]
    MalformedRange(String),

    #[error("media error: {0}")]
    Media(#[from] grampost_media::MediaError),
}

/// Result of one attempt inside a retry loop.
///
/// Attempts never unwind through the loop: each returns a tagged
/// outcome and the driver decides whether to retry, stop with the
/// value, or stop with the error.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    /// The attempt finished; stop and yield the value.
    Done(T),
    /// Transient failure; consume a retry and go again.
    Retry(String),
    /// Terminal failure; stop immediately.
    Fatal(TransferError),
}

/// Acknowledgement returned when a transfer completes.
///
/// The upload id is the opaque handle the configure step correlates
/// with; the body is the upload host's final response, kept verbatim.
#[derive(Debug, Clone)]
pub struct UploadAck {
    pub upload_id: String,
    pub body: Vec<u8>,
}
