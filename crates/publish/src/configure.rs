//! Configure (finalize) retry loop.
//!
//! One configure call attaches metadata to an uploaded asset and
//! publishes the post. The remote side processes uploads asynchronously
//! and self-reports cooldowns, so one logical finalization is a bounded
//! loop over a caller-supplied operation: the loop owns the retry
//! policy, the operation owns the request shape.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::{debug, info, warn};

use grampost_protocol::{ApiErrorKind, ConfigureResponse, HttpResponse};
use grampost_transfer::TransferError;

use crate::error::PublishError;

/// Attempt ceiling for one logical configure.
pub const CONFIGURE_MAX_ATTEMPTS: u32 = 5;

/// Sleep between attempts when the server suggests no cooldown.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// One "attach metadata and publish" HTTP call.
///
/// The same operation is invoked on every attempt, so implementations
/// must produce an identical request each time (stable upload id,
/// stable metadata) for the retry to stay idempotent.
pub trait ConfigureOp: Send + Sync {
    fn call(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransferError>> + Send + '_>>;
}

/// Bookkeeping across attempts; never leaves the loop.
#[derive(Debug, Default)]
struct ConfigureAttempt {
    last_status: Option<u16>,
    last_cooldown: Option<u64>,
    last_error: Option<String>,
}

impl ConfigureAttempt {
    fn last_error(self) -> String {
        if let Some(err) = self.last_error {
            return err;
        }
        match (self.last_status, self.last_cooldown) {
            (Some(status), Some(cooldown)) => {
                format!("last status {status} with cooldown {cooldown}s")
            }
            (Some(status), None) => format!("last status {status}"),
            _ => "no attempts completed".into(),
        }
    }
}

/// Runs `op` until terminal success or failure, bounded at
/// [`CONFIGURE_MAX_ATTEMPTS`] attempts.
pub async fn run_configure(op: &dyn ConfigureOp) -> Result<ConfigureResponse, PublishError> {
    let mut state = ConfigureAttempt::default();

    for attempt in 0..CONFIGURE_MAX_ATTEMPTS {
        debug!(attempt, "configure attempt");

        let resp = match op.call().await {
            Ok(resp) => resp,
            Err(TransferError::Api(kind)) => return Err(PublishError::Api(kind)),
            Err(e) => {
                // Network-class failure: record and go again.
                warn!(attempt, error = %e, "configure call failed");
                state.last_error = Some(e.to_string());
                tokio::time::sleep(RETRY_DELAY).await;
                continue;
            }
        };

        if let Some(kind) = ApiErrorKind::classify(resp.status, &resp.body) {
            return Err(PublishError::Api(kind));
        }
        state.last_status = Some(resp.status);

        match resp.status {
            200 => {
                let body: ConfigureResponse = match resp.json() {
                    Ok(body) => body,
                    Err(e) => {
                        warn!(attempt, error = %e, "unparsable configure body");
                        state.last_error = Some(format!("unparsable body: {e}"));
                        tokio::time::sleep(RETRY_DELAY).await;
                        continue;
                    }
                };
                if body.needs_reupload() {
                    return Err(PublishError::NeedsReupload);
                }
                if body.is_ok() {
                    info!(attempt, "configure succeeded");
                    return Ok(body);
                }
                // 200 without ok is a soft failure, never a success.
                let reason = body.message.unwrap_or_else(|| "soft failure".into());
                warn!(attempt, reason = %reason, "configure soft failure");
                state.last_error = Some(reason);
                tokio::time::sleep(RETRY_DELAY).await;
            }
            202 => {
                // Still processing; honor the server's cooldown hint.
                let cooldown = resp
                    .json::<ConfigureResponse>()
                    .ok()
                    .and_then(|body| body.cooldown_seconds)
                    .unwrap_or(1)
                    .max(1);
                debug!(attempt, cooldown, "configure deferred by server");
                state.last_cooldown = Some(cooldown);
                tokio::time::sleep(Duration::from_secs(cooldown)).await;
            }
            status => {
                warn!(attempt, status, "unexpected configure status");
                state.last_error = Some(format!("configure returned status {status}"));
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }

    Err(PublishError::ConfigureFailed {
        attempts: CONFIGURE_MAX_ATTEMPTS,
        last: state.last_error(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockStep, MockTransport};
    use grampost_protocol::HttpRequest;

    /// Configure op that replays the same request against a scripted
    /// transport, like the real publisher does.
    struct ScriptedOp {
        transport: MockTransport,
        request: HttpRequest,
    }

    impl ScriptedOp {
        fn new(steps: Vec<MockStep>) -> Self {
            Self {
                transport: MockTransport::new(steps),
                request: HttpRequest::post("/media/configure/", b"{\"upload_id\":\"u1\"}".to_vec()),
            }
        }
    }

    impl ConfigureOp for ScriptedOp {
        fn call(
            &self,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransferError>> + Send + '_>>
        {
            use grampost_transfer::UploadTransport;
            self.transport.execute(self.request.clone())
        }
    }

    fn ok_with_media() -> MockStep {
        MockStep::Respond(HttpResponse::new(
            200,
            br#"{"status": "ok", "media": {"id": "317_42"}}"#.to_vec(),
        ))
    }

    fn deferred(cooldown: u64) -> MockStep {
        MockStep::Respond(HttpResponse::new(
            202,
            format!(r#"{{"status": "fail", "cooldown_seconds": {cooldown}}}"#).into_bytes(),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn cooldown_sequence_sleeps_exactly_as_suggested() {
        let op = ScriptedOp::new(vec![deferred(3), deferred(1), ok_with_media()]);

        let started = tokio::time::Instant::now();
        let resp = run_configure(&op).await.unwrap();

        assert_eq!(resp.media.unwrap().id, "317_42");
        assert_eq!(op.transport.request_count(), 3);
        // Two sleeps: 3s then 1s, nothing else.
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn soft_failures_retry_then_succeed() {
        let soft = || {
            MockStep::Respond(HttpResponse::new(
                200,
                br#"{"status": "fail", "message": "Transcode not finished yet."}"#.to_vec(),
            ))
        };
        let op = ScriptedOp::new(vec![soft(), soft(), ok_with_media()]);

        let resp = run_configure(&op).await.unwrap();
        assert!(resp.is_ok());
        assert_eq!(op.transport.request_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retried_attempts_send_identical_requests() {
        let op = ScriptedOp::new(vec![deferred(1), ok_with_media()]);
        run_configure(&op).await.unwrap();

        let reqs = op.transport.requests.lock().unwrap();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].body, reqs[1].body);
        assert_eq!(reqs[0].path, reqs[1].path);
    }

    #[tokio::test(start_paused = true)]
    async fn needs_reupload_is_fatal() {
        let op = ScriptedOp::new(vec![MockStep::Respond(HttpResponse::new(
            200,
            br#"{"status": "fail", "message": "media_needs_reupload"}"#.to_vec(),
        ))]);

        let err = run_configure(&op).await.unwrap_err();
        assert!(matches!(err, PublishError::NeedsReupload));
        assert_eq!(op.transport.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_api_error_propagates_immediately() {
        let op = ScriptedOp::new(vec![MockStep::Respond(HttpResponse::new(
            400,
            br#"{"message": "feedback_required"}"#.to_vec(),
        ))]);

        let err = run_configure(&op).await.unwrap_err();
        assert!(matches!(
            err,
            PublishError::Api(ApiErrorKind::FeedbackRequired)
        ));
        assert_eq!(op.transport.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_carries_last_error() {
        let op = ScriptedOp::new(
            (0..CONFIGURE_MAX_ATTEMPTS)
                .map(|i| MockStep::Fail(format!("connection reset {i}")))
                .collect(),
        );

        let err = run_configure(&op).await.unwrap_err();
        match err {
            PublishError::ConfigureFailed { attempts, last } => {
                assert_eq!(attempts, CONFIGURE_MAX_ATTEMPTS);
                assert!(last.contains("connection reset 4"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(op.transport.request_count(), 5);
    }
}
