//! Per-asset upload session state.

use grampost_protocol::Feed;
use grampost_protocol::rupload;

use crate::selector::UploadStrategy;

/// State for one asset's transfer.
///
/// The upload id stays stable for the whole transfer (and the later
/// configure call), reused across retries so the server can correlate
/// partial progress. The cursor tracks bytes confirmed by the server;
/// it only moves forward.
#[derive(Debug, Clone)]
pub struct UploadSession {
    upload_id: String,
    strategy: UploadStrategy,
    feed: Feed,
    total_bytes: u64,
    confirmed_bytes: u64,
}

impl UploadSession {
    /// Creates a session with a fresh upload id.
    pub fn new(strategy: UploadStrategy, feed: Feed, total_bytes: u64) -> Self {
        Self::with_upload_id(rupload::new_upload_id(), strategy, feed, total_bytes)
    }

    /// Creates a session reusing an existing upload id (re-publish of
    /// already-transferred bytes, tests).
    pub fn with_upload_id(
        upload_id: impl Into<String>,
        strategy: UploadStrategy,
        feed: Feed,
        total_bytes: u64,
    ) -> Self {
        Self {
            upload_id: upload_id.into(),
            strategy,
            feed,
            total_bytes,
            confirmed_bytes: 0,
        }
    }

    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    pub fn strategy(&self) -> UploadStrategy {
        self.strategy
    }

    pub fn feed(&self) -> Feed {
        self.feed
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn confirmed_bytes(&self) -> u64 {
        self.confirmed_bytes
    }

    /// Advances the confirmed cursor to `offset` (monotonic).
    pub fn confirm_to(&mut self, offset: u64) {
        self.confirmed_bytes = self.confirmed_bytes.max(offset.min(self.total_bytes));
    }

    pub fn remaining_bytes(&self) -> u64 {
        self.total_bytes - self.confirmed_bytes
    }

    pub fn is_complete(&self) -> bool {
        self.confirmed_bytes == self.total_bytes
    }
}
