//! Abstract transport to the remote upload surface.
//!
//! The host application implements [`UploadTransport`] on top of its
//! signing HTTP client. Using a trait keeps transfer logic decoupled
//! from the wire client and testable with scripted mocks.

use std::future::Future;
use std::pin::Pin;

use grampost_protocol::{HttpRequest, HttpResponse};

use crate::TransferError;

/// Executes one signed HTTP exchange against the upload surface.
///
/// An `Err` means a network-level failure before any status was
/// received; HTTP error statuses come back as `Ok(HttpResponse)` and
/// are interpreted by the caller.
pub trait UploadTransport: Send + Sync {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransferError>> + Send + '_>>;
}
