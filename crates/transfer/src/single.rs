//! One-shot photo upload.
//!
//! Used only for small photos when no advanced strategy is enabled:
//! the whole entity goes out in a single request, no offset
//! negotiation and no local retry loop.

use tracing::debug;

use grampost_protocol::{ApiErrorKind, HttpRequest, RuploadParams};

use crate::reader::ChunkSource;
use crate::transport::UploadTransport;
use crate::{TransferError, UploadAck};

pub struct SinglePieceTransfer<'a> {
    transport: &'a dyn UploadTransport,
}

impl<'a> SinglePieceTransfer<'a> {
    pub fn new(transport: &'a dyn UploadTransport) -> Self {
        Self { transport }
    }

    /// Sends the whole of `source` in one request.
    pub async fn transfer(
        &self,
        source: &mut ChunkSource,
        params: &RuploadParams,
    ) -> Result<UploadAck, TransferError> {
        let data = source.read_from(0)?;
        debug!(upload_id = %params.upload_id, bytes = data.len(), "single-piece upload");

        let req = HttpRequest::post(params.upload_path(), data).headers(params.upload_headers(0));
        let resp = self.transport.execute(req).await?;

        if let Some(kind) = ApiErrorKind::classify(resp.status, &resp.body) {
            return Err(TransferError::Api(kind));
        }
        if resp.status != 200 {
            return Err(TransferError::Rejected(resp.status));
        }
        Ok(UploadAck {
            upload_id: params.upload_id.clone(),
            body: resp.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::{MockStep, MockTransport};
    use grampost_protocol::HttpResponse;

    #[tokio::test]
    async fn sends_whole_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.jpg");
        std::fs::write(&path, b"JPEGDATA").unwrap();

        let transport = MockTransport::new(vec![MockStep::Respond(HttpResponse::new(
            200,
            br#"{"status": "ok"}"#.to_vec(),
        ))]);

        let mut source = ChunkSource::open(&path).unwrap();
        let params = RuploadParams::photo("u1", 8);
        let ack = SinglePieceTransfer::new(&transport)
            .transfer(&mut source, &params)
            .await
            .unwrap();

        assert_eq!(ack.upload_id, "u1");
        assert_eq!(transport.sent_bodies(), vec![b"JPEGDATA".to_vec()]);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn rejection_propagates_without_retry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.jpg");
        std::fs::write(&path, b"X").unwrap();

        let transport =
            MockTransport::new(vec![MockStep::Respond(HttpResponse::new(500, Vec::new()))]);
        let mut source = ChunkSource::open(&path).unwrap();
        let params = RuploadParams::photo("u2", 1);
        let err = SinglePieceTransfer::new(&transport)
            .transfer(&mut source, &params)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Rejected(500)));
        assert_eq!(transport.request_count(), 1);
    }
}
