//! Top-level publish orchestration.
//!
//! One call per asset: select a transfer strategy from the asset and
//! the server-advertised flags, move the bytes, then run the configure
//! loop against the target feed's endpoint. The upload id stays stable
//! from the first byte to the final configure so the server correlates
//! the whole flow.

use std::future::Future;
use std::pin::Pin;

use tracing::info;

use grampost_media::{MediaAsset, Segmenter};
use grampost_protocol::{FlagSnapshot, HttpRequest, HttpResponse, MediaDescriptor, RuploadParams};
use grampost_transfer::{
    ChunkSource, ChunkedTransfer, ResumableRequest, ResumableTransfer, SegmentedTransfer,
    SinglePieceTransfer, TransferError, UploadAck, UploadSession, UploadStrategy, UploadTransport,
    select_strategy,
};

use crate::configure::{ConfigureOp, run_configure};
use crate::error::PublishError;
use crate::metadata::FeedMetadata;

/// Host-side publish parameters.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Base URLs of the chunked-upload hosts, tried in order.
    pub upload_servers: Vec<String>,
    /// Target duration of one video segment.
    pub segment_secs: u32,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            upload_servers: Vec::new(),
            segment_secs: 5,
        }
    }
}

/// Publishes media assets to their target feeds.
pub struct Publisher<'a> {
    transport: &'a dyn UploadTransport,
    segmenter: &'a dyn Segmenter,
    flags: FlagSnapshot,
    config: PublisherConfig,
}

/// Replays one fixed configure request on every loop attempt.
struct TransportConfigureOp<'a> {
    transport: &'a dyn UploadTransport,
    request: HttpRequest,
}

impl ConfigureOp for TransportConfigureOp<'_> {
    fn call(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransferError>> + Send + '_>> {
        self.transport.execute(self.request.clone())
    }
}

impl<'a> Publisher<'a> {
    pub fn new(
        transport: &'a dyn UploadTransport,
        segmenter: &'a dyn Segmenter,
        flags: FlagSnapshot,
        config: PublisherConfig,
    ) -> Self {
        Self {
            transport,
            segmenter,
            flags,
            config,
        }
    }

    /// Transfers `asset` and finalizes it with `metadata`.
    ///
    /// Returns the server's media descriptor for the published post.
    pub async fn publish(
        &self,
        asset: &MediaAsset,
        metadata: &FeedMetadata,
    ) -> Result<MediaDescriptor, PublishError> {
        let feed = metadata.feed();
        let strategy = select_strategy(asset, feed, &self.flags, self.segmenter.is_available());
        let mut session = UploadSession::new(strategy, feed, asset.size());

        info!(
            upload_id = %session.upload_id(),
            asset = %asset.basename(),
            feed = feed.wire_name(),
            strategy = ?strategy,
            "publishing asset"
        );

        let ack = self
            .transfer(asset, &mut session)
            .await
            .map_err(|e| PublishError::from_transfer(&asset.basename(), e))?;

        let op = TransportConfigureOp {
            transport: self.transport,
            request: metadata.configure_request(&ack.upload_id)?,
        };
        let resp = run_configure(&op).await?;

        let media = resp.media.ok_or(PublishError::MissingDescriptor)?;
        info!(
            upload_id = %session.upload_id(),
            media_id = %media.id,
            "asset published"
        );
        Ok(media)
    }

    async fn transfer(
        &self,
        asset: &MediaAsset,
        session: &mut UploadSession,
    ) -> Result<UploadAck, TransferError> {
        match session.strategy() {
            UploadStrategy::SinglePiece => {
                let params = RuploadParams::photo(session.upload_id(), asset.size());
                let mut source = ChunkSource::open(asset.path())?;
                SinglePieceTransfer::new(self.transport)
                    .transfer(&mut source, &params)
                    .await
            }
            UploadStrategy::Resumable => {
                let params = if asset.is_video() {
                    RuploadParams::video(session.upload_id(), asset.size())
                } else {
                    RuploadParams::photo(session.upload_id(), asset.size())
                };
                let mut source = ChunkSource::open(asset.path())?;
                ResumableTransfer::new(self.transport)
                    .transfer(&mut source, &ResumableRequest::new(params))
                    .await
            }
            UploadStrategy::Chunked => {
                let params = RuploadParams::video(session.upload_id(), asset.size());
                let mut source = ChunkSource::open(asset.path())?;
                ChunkedTransfer::new(self.transport)
                    .transfer(
                        &mut source,
                        session,
                        self.config.upload_servers.clone(),
                        &params.upload_path(),
                        &params.waterfall_id,
                    )
                    .await
            }
            UploadStrategy::Segmented => {
                SegmentedTransfer::new(self.transport, self.segmenter)
                    .transfer(asset, session, self.config.segment_secs)
                    .await
            }
        }
    }
}
