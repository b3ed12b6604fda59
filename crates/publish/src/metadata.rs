//! Per-feed post metadata and configure request bodies.
//!
//! Each feed has its own configure body shape, so metadata is a tagged
//! variant per feed instead of a loose bag of optional fields. The
//! variant picks the configure endpoint and the request carries the
//! asset's upload id for correlation.

use serde::{Deserialize, Serialize};

use grampost_protocol::{Feed, HttpRequest};

/// A tagged location attached to a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Server-side place id, when the location came from place search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

/// A tagged user, positioned on the media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usertag {
    pub user_id: String,
    /// Normalized [x, y] in [0, 1].
    pub position: [f64; 2],
}

/// An interactive story sticker, positioned and rotated on the media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub usertags: Vec<Usertag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stickers: Vec<Sticker>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Upload ids of the already-transferred album children, in display
    /// order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TvMetadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Metadata for one post, tagged by its target feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeedMetadata {
    Timeline(TimelineMetadata),
    Story(StoryMetadata),
    Album(AlbumMetadata),
    Tv(TvMetadata),
}

/// Wire body of a configure call: the upload id plus the flattened
/// feed-specific fields.
#[derive(Serialize)]
struct ConfigureBody<'a, M: Serialize> {
    upload_id: &'a str,
    #[serde(flatten)]
    metadata: &'a M,
}

impl FeedMetadata {
    pub fn feed(&self) -> Feed {
        match self {
            FeedMetadata::Timeline(_) => Feed::Timeline,
            FeedMetadata::Story(_) => Feed::Story,
            FeedMetadata::Album(_) => Feed::Album,
            FeedMetadata::Tv(_) => Feed::Tv,
        }
    }

    /// Builds the configure request for an uploaded asset.
    pub fn configure_request(&self, upload_id: &str) -> Result<HttpRequest, serde_json::Error> {
        let body = match self {
            FeedMetadata::Timeline(m) => serde_json::to_vec(&ConfigureBody {
                upload_id,
                metadata: m,
            })?,
            FeedMetadata::Story(m) => serde_json::to_vec(&ConfigureBody {
                upload_id,
                metadata: m,
            })?,
            FeedMetadata::Album(m) => serde_json::to_vec(&ConfigureBody {
                upload_id,
                metadata: m,
            })?,
            FeedMetadata::Tv(m) => serde_json::to_vec(&ConfigureBody {
                upload_id,
                metadata: m,
            })?,
        };
        Ok(HttpRequest::post(self.feed().configure_path(), body)
            .header("Content-Type", "application/json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeline_body_carries_upload_id_and_caption() {
        let metadata = FeedMetadata::Timeline(TimelineMetadata {
            caption: Some("sunset".into()),
            ..Default::default()
        });
        let req = metadata.configure_request("u1").unwrap();
        assert_eq!(req.path, "/media/configure/");

        let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
        assert_eq!(body["upload_id"], "u1");
        assert_eq!(body["caption"], "sunset");
        // Empty optionals stay off the wire.
        assert!(body.get("location").is_none());
        assert!(body.get("usertags").is_none());
    }

    #[test]
    fn each_variant_targets_its_feed_endpoint() {
        let cases = [
            (
                FeedMetadata::Timeline(TimelineMetadata::default()),
                "/media/configure/",
            ),
            (
                FeedMetadata::Story(StoryMetadata::default()),
                "/media/configure_to_story/",
            ),
            (
                FeedMetadata::Album(AlbumMetadata::default()),
                "/media/configure_sidecar/",
            ),
            (
                FeedMetadata::Tv(TvMetadata {
                    title: "ep1".into(),
                    caption: None,
                }),
                "/media/configure_to_tv/",
            ),
        ];
        for (metadata, path) in cases {
            assert_eq!(metadata.configure_request("u1").unwrap().path, path);
        }
    }

    #[test]
    fn album_children_serialize_in_order() {
        let metadata = FeedMetadata::Album(AlbumMetadata {
            children: vec!["c1".into(), "c2".into(), "c3".into()],
            ..Default::default()
        });
        let req = metadata.configure_request("album-1").unwrap();
        let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
        assert_eq!(body["children"][0], "c1");
        assert_eq!(body["children"][2], "c3");
    }

    #[test]
    fn sticker_serializes_with_type_tag() {
        let sticker = Sticker {
            kind: "poll".into(),
            x: 0.5,
            y: 0.5,
            width: 0.3,
            height: 0.1,
            rotation: 0.0,
        };
        let json = serde_json::to_value(&sticker).unwrap();
        assert_eq!(json["type"], "poll");
    }
}
