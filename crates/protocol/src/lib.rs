//! Wire types shared by the grampost upload and publish crates.
//!
//! The remote surface is an unofficial mobile API, so everything here is
//! abstracted from the vendor protocol: a transport-agnostic HTTP
//! request/response pair, typed classification of API error bodies,
//! feature-flag snapshots, and the upload/configure payload shapes.

pub mod configure;
pub mod error;
pub mod feed;
pub mod flags;
pub mod http;
pub mod rupload;

// Re-export primary types for convenience.
pub use configure::{ConfigureResponse, MediaDescriptor};
pub use error::{ApiErrorBody, ApiErrorKind};
pub use feed::Feed;
pub use flags::{FlagSnapshot, FlagValue};
pub use http::{HttpRequest, HttpResponse, Method};
pub use rupload::{EntityType, RuploadParams};
