//! Segmented video transfer.
//!
//! Splits a source video into independent video-only and audio-only
//! segments via the external segmentation tool, opens a segmented
//! upload stream on the server, transfers each segment through the
//! resumable primitive, and closes the stream. Every temporary segment
//! file is deleted after its upload attempt, success or not; the owning
//! scratch directory removes anything left on any exit path.

use serde::Deserialize;
use tracing::{debug, info};

use grampost_media::{MediaAsset, Segmenter};
use grampost_protocol::{ApiErrorKind, HttpRequest, RuploadParams, rupload};

use crate::reader::ChunkSource;
use crate::resumable::{ResumableRequest, ResumableTransfer};
use crate::session::UploadSession;
use crate::transport::UploadTransport;
use crate::{TransferError, UploadAck};

#[derive(Debug, Deserialize)]
struct StreamStartResponse {
    stream_id: String,
}

pub struct SegmentedTransfer<'a> {
    transport: &'a dyn UploadTransport,
    segmenter: &'a dyn Segmenter,
}

impl<'a> SegmentedTransfer<'a> {
    pub fn new(transport: &'a dyn UploadTransport, segmenter: &'a dyn Segmenter) -> Self {
        Self {
            transport,
            segmenter,
        }
    }

    /// Runs the full segmented flow for one video asset.
    pub async fn transfer(
        &self,
        asset: &MediaAsset,
        session: &UploadSession,
        segment_secs: u32,
    ) -> Result<UploadAck, TransferError> {
        let set = self
            .segmenter
            .split(asset.path(), segment_secs, asset.has_audio())
            .await?;
        info!(
            upload_id = %session.upload_id(),
            segments = set.len(),
            "segmentation produced upload set"
        );

        let stream_id = self.start_stream(session).await?;

        let resumable = ResumableTransfer::new(self.transport);
        let transfer_path = rupload::stream_transfer_path(session.upload_id(), &stream_id);
        let mut ordering_offset: u64 = 0;

        for (index, segment) in set.segments().iter().enumerate() {
            let mut params = RuploadParams::video(session.upload_id(), segment.size);
            params.entity_name = format!("{}_segment_{index}", session.upload_id());

            let request = ResumableRequest::new(params)
                .at_path(transfer_path.clone())
                .with_extra_headers(rupload::segment_headers(
                    segment.kind.wire_name(),
                    ordering_offset,
                    &stream_id,
                ))
                .skip_initial_offset_query(true);

            let result = match ChunkSource::open(&segment.path) {
                Ok(mut source) => resumable.transfer(&mut source, &request).await,
                Err(e) => Err(e),
            };

            // Cleanup is unconditional: the segment file goes whether
            // or not its upload succeeded.
            segment.delete();
            result?;

            debug!(
                upload_id = %session.upload_id(),
                segment = index,
                kind = segment.kind.wire_name(),
                ordering_offset,
                "segment uploaded"
            );
            ordering_offset += segment.size;
        }

        self.end_stream(session, &stream_id).await
    }

    async fn start_stream(&self, session: &UploadSession) -> Result<String, TransferError> {
        let req = HttpRequest::post(rupload::stream_start_path(session.upload_id()), Vec::new())
            .header("X-Upload-Session", session.upload_id());
        let resp = self.transport.execute(req).await?;

        if let Some(kind) = ApiErrorKind::classify(resp.status, &resp.body) {
            return Err(TransferError::Api(kind));
        }
        if resp.status != 200 {
            return Err(TransferError::Rejected(resp.status));
        }
        let body: StreamStartResponse = resp.json()?;
        Ok(body.stream_id)
    }

    async fn end_stream(
        &self,
        session: &UploadSession,
        stream_id: &str,
    ) -> Result<UploadAck, TransferError> {
        let req = HttpRequest::post(
            rupload::stream_end_path(session.upload_id(), stream_id),
            Vec::new(),
        )
        .header("X-Upload-Session", session.upload_id());
        let resp = self.transport.execute(req).await?;

        if let Some(kind) = ApiErrorKind::classify(resp.status, &resp.body) {
            return Err(TransferError::Api(kind));
        }
        if resp.status != 200 {
            return Err(TransferError::Rejected(resp.status));
        }
        Ok(UploadAck {
            upload_id: session.upload_id().to_string(),
            body: resp.body,
        })
    }
}
