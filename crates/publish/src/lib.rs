//! Publish orchestration: transfer an asset, then configure (finalize)
//! the post against its target feed.
//!
//! The configure step tolerates asynchronous server-side processing:
//! the remote host may answer 202 with a cooldown hint or 200 with a
//! soft failure while a video is still transcoding, so finalization is
//! a bounded retry loop rather than a single call.

pub mod configure;
pub mod error;
pub mod metadata;
pub mod publisher;

pub use configure::{CONFIGURE_MAX_ATTEMPTS, ConfigureOp, run_configure};
pub use error::PublishError;
pub use metadata::{
    AlbumMetadata, FeedMetadata, Location, Sticker, StoryMetadata, TimelineMetadata, TvMetadata,
    Usertag,
};
pub use publisher::{Publisher, PublisherConfig};

#[cfg(test)]
pub(crate) mod testing {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use grampost_protocol::{HttpRequest, HttpResponse};
    use grampost_transfer::{TransferError, UploadTransport};

    /// Scripted transport: pops one canned step per executed request
    /// and records every request for assertions.
    pub struct MockTransport {
        steps: Mutex<Vec<MockStep>>,
        pub requests: Mutex<Vec<HttpRequest>>,
    }

    pub enum MockStep {
        Respond(HttpResponse),
        /// Network-level failure before a status.
        Fail(String),
    }

    impl MockTransport {
        pub fn new(steps: Vec<MockStep>) -> Self {
            Self {
                steps: Mutex::new(steps),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl UploadTransport for MockTransport {
        fn execute(
            &self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransferError>> + Send + '_>>
        {
            self.requests.lock().unwrap().push(request);
            Box::pin(async move {
                let mut steps = self.steps.lock().unwrap();
                if steps.is_empty() {
                    return Err(TransferError::Transport("no scripted response".into()));
                }
                match steps.remove(0) {
                    MockStep::Respond(resp) => Ok(resp),
                    MockStep::Fail(reason) => Err(TransferError::Transport(reason)),
                }
            })
        }
    }
}
