//! Offset-aware resumable transfer.
//!
//! The generic transfer primitive: query the server for the byte offset
//! it already holds, then stream the remainder in a single request.
//! Retried up to a fixed ceiling; every retry re-queries the offset so
//! a prior partial acceptance is respected — already-acknowledged bytes
//! are never sent twice.

use serde::Deserialize;
use tracing::{debug, warn};

use grampost_protocol::{ApiErrorKind, HttpRequest, RuploadParams};

use crate::reader::ChunkSource;
use crate::transport::UploadTransport;
use crate::{AttemptOutcome, RESUMABLE_MAX_ATTEMPTS, TransferError, UploadAck};

#[derive(Debug, Deserialize)]
struct OffsetResponse {
    offset: u64,
}

/// Parameters for one resumable transfer call.
#[derive(Debug, Clone)]
pub struct ResumableRequest {
    pub params: RuploadParams,
    /// Endpoint path; defaults to the entity's upload path, overridden
    /// for stream-scoped segment transfers.
    pub path: String,
    /// Extra headers appended to every byte send (segment markers).
    pub extra_headers: Vec<(String, String)>,
    /// Assume offset 0 on the first attempt instead of querying; set
    /// when the protocol guarantees a fresh entity starts empty.
    pub skip_initial_offset_query: bool,
}

impl ResumableRequest {
    pub fn new(params: RuploadParams) -> Self {
        let path = params.upload_path();
        Self {
            params,
            path,
            extra_headers: Vec::new(),
            skip_initial_offset_query: false,
        }
    }

    pub fn at_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_extra_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.extra_headers = headers;
        self
    }

    pub fn skip_initial_offset_query(mut self, skip: bool) -> Self {
        self.skip_initial_offset_query = skip;
        self
    }
}

/// Drives resumable transfers over an abstract transport.
pub struct ResumableTransfer<'a> {
    transport: &'a dyn UploadTransport,
}

impl<'a> ResumableTransfer<'a> {
    pub fn new(transport: &'a dyn UploadTransport) -> Self {
        Self { transport }
    }

    /// Transfers the whole of `source`, resuming from whatever offset
    /// the server reports.
    pub async fn transfer(
        &self,
        source: &mut ChunkSource,
        request: &ResumableRequest,
    ) -> Result<UploadAck, TransferError> {
        let mut last = String::from("no attempts made");

        for attempt in 0..RESUMABLE_MAX_ATTEMPTS {
            match self.attempt(source, request, attempt).await {
                AttemptOutcome::Done(ack) => return Ok(ack),
                AttemptOutcome::Fatal(e) => return Err(e),
                AttemptOutcome::Retry(reason) => {
                    warn!(
                        upload_id = %request.params.upload_id,
                        attempt,
                        reason = %reason,
                        "resumable attempt failed"
                    );
                    last = reason;
                }
            }
        }

        Err(TransferError::AllRetriesFailed {
            attempts: RESUMABLE_MAX_ATTEMPTS,
            last,
        })
    }

    async fn attempt(
        &self,
        source: &mut ChunkSource,
        request: &ResumableRequest,
        attempt: u32,
    ) -> AttemptOutcome<UploadAck> {
        let offset = if attempt == 0 && request.skip_initial_offset_query {
            0
        } else {
            match self.query_offset(request).await {
                AttemptOutcome::Done(offset) => offset,
                AttemptOutcome::Retry(reason) => return AttemptOutcome::Retry(reason),
                AttemptOutcome::Fatal(e) => return AttemptOutcome::Fatal(e),
            }
        };

        let data = match source.read_from(offset) {
            Ok(data) => data,
            Err(e) => return AttemptOutcome::Retry(format!("read failed: {e}")),
        };

        debug!(
            upload_id = %request.params.upload_id,
            offset,
            bytes = data.len(),
            "sending byte range"
        );

        let req = HttpRequest::post(&request.path, data)
            .headers(request.params.upload_headers(offset))
            .headers(request.extra_headers.iter().cloned());

        match self.transport.execute(req).await {
            Err(e) => AttemptOutcome::Retry(e.to_string()),
            Ok(resp) => {
                if let Some(kind) = ApiErrorKind::classify(resp.status, &resp.body) {
                    return AttemptOutcome::Fatal(TransferError::Api(kind));
                }
                if resp.status == 200 {
                    AttemptOutcome::Done(UploadAck {
                        upload_id: request.params.upload_id.clone(),
                        body: resp.body,
                    })
                } else {
                    AttemptOutcome::Retry(format!("upload returned status {}", resp.status))
                }
            }
        }
    }

    async fn query_offset(&self, request: &ResumableRequest) -> AttemptOutcome<u64> {
        let req = HttpRequest::get(&request.path).headers(request.params.session_headers());

        match self.transport.execute(req).await {
            Err(e) => AttemptOutcome::Retry(e.to_string()),
            Ok(resp) => {
                if let Some(kind) = ApiErrorKind::classify(resp.status, &resp.body) {
                    return AttemptOutcome::Fatal(TransferError::Api(kind));
                }
                if !resp.is_success() {
                    return AttemptOutcome::Retry(format!(
                        "offset query returned status {}",
                        resp.status
                    ));
                }
                match resp.json::<OffsetResponse>() {
                    Ok(body) => AttemptOutcome::Done(body.offset),
                    Err(e) => AttemptOutcome::Retry(format!("offset body unparsable: {e}")),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::{MockStep, MockTransport};
    use grampost_protocol::HttpResponse;
    use std::path::PathBuf;

    fn asset_file(data: &[u8]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, data).unwrap();
        (dir, path)
    }

    fn offset_response(offset: u64) -> MockStep {
        MockStep::Respond(HttpResponse::new(
            200,
            format!("{{\"offset\": {offset}}}").into_bytes(),
        ))
    }

    fn ok_upload() -> MockStep {
        MockStep::Respond(HttpResponse::new(200, br#"{"status": "ok"}"#.to_vec()))
    }

    #[tokio::test]
    async fn first_attempt_can_skip_offset_query() {
        let (_dir, path) = asset_file(b"0123456789");
        let transport = MockTransport::new(vec![ok_upload()]);
        let request =
            ResumableRequest::new(RuploadParams::video("u1", 10)).skip_initial_offset_query(true);

        let mut source = ChunkSource::open(&path).unwrap();
        let ack = ResumableTransfer::new(&transport)
            .transfer(&mut source, &request)
            .await
            .unwrap();

        assert_eq!(ack.upload_id, "u1");
        // A single POST, no offset query.
        assert_eq!(transport.request_count(), 1);
        assert_eq!(transport.sent_bodies(), vec![b"0123456789".to_vec()]);
    }

    #[tokio::test]
    async fn retry_resumes_from_server_offset() {
        let (_dir, path) = asset_file(b"0123456789");
        // Attempt 1: offset 0, upload dies mid-flight.
        // Attempt 2: server reports 4 bytes held; only the rest is sent.
        let transport = MockTransport::new(vec![
            offset_response(0),
            MockStep::Fail("connection reset".into()),
            offset_response(4),
            ok_upload(),
        ]);
        let request = ResumableRequest::new(RuploadParams::video("u2", 10));

        let mut source = ChunkSource::open(&path).unwrap();
        ResumableTransfer::new(&transport)
            .transfer(&mut source, &request)
            .await
            .unwrap();

        let bodies = transport.sent_bodies();
        assert_eq!(bodies, vec![b"0123456789".to_vec(), b"456789".to_vec()]);
    }

    #[tokio::test]
    async fn non_retryable_error_propagates_immediately() {
        let (_dir, path) = asset_file(b"0123456789");
        let transport = MockTransport::new(vec![MockStep::Respond(HttpResponse::new(
            403,
            br#"{"message": "login_required"}"#.to_vec(),
        ))]);
        let request = ResumableRequest::new(RuploadParams::video("u3", 10));

        let mut source = ChunkSource::open(&path).unwrap();
        let err = ResumableTransfer::new(&transport)
            .transfer(&mut source, &request)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TransferError::Api(ApiErrorKind::LoginRequired)
        ));
        // Only the offset query ran; no retry consumed.
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_report_last_reason() {
        let (_dir, path) = asset_file(b"01");
        // Every scripted step fails, then the script runs dry.
        let transport = MockTransport::new(vec![MockStep::Fail("flaky network".into())]);
        let request = ResumableRequest::new(RuploadParams::video("u4", 2));

        let mut source = ChunkSource::open(&path).unwrap();
        let err = ResumableTransfer::new(&transport)
            .transfer(&mut source, &request)
            .await
            .unwrap_err();

        match err {
            TransferError::AllRetriesFailed { attempts, last } => {
                assert_eq!(attempts, RESUMABLE_MAX_ATTEMPTS);
                assert!(last.contains("no scripted response"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn offset_at_eof_sends_empty_body_and_completes() {
        let (_dir, path) = asset_file(b"0123456789");
        // Server already holds everything; the empty send finalizes.
        let transport = MockTransport::new(vec![offset_response(10), ok_upload()]);
        let request = ResumableRequest::new(RuploadParams::video("u5", 10));

        let mut source = ChunkSource::open(&path).unwrap();
        let ack = ResumableTransfer::new(&transport)
            .transfer(&mut source, &request)
            .await
            .unwrap();
        assert_eq!(ack.upload_id, "u5");
        assert!(transport.sent_bodies().is_empty());
    }
}
