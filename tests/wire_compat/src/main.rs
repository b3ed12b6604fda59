fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

// Wire-shape regression tests: each fixture is a JSON body as the
// remote API sends (or expects) it. A type change that alters the wire
// shape fails here before it fails against the live surface.
#[cfg(test)]
mod tests {
    use grampost_protocol::{
        ApiErrorBody, ConfigureResponse, Feed, FlagSnapshot, MediaDescriptor,
    };
    use grampost_publish::{
        AlbumMetadata, FeedMetadata, Location, StoryMetadata, Sticker, TimelineMetadata, Usertag,
    };

    /// Normalizes JSON values so that integer-valued floats compare
    /// equal (`65` vs `65.0`).
    fn normalize_value(v: &serde_json::Value) -> serde_json::Value {
        match v {
            serde_json::Value::Number(n) => {
                if let Some(f) = n.as_f64() {
                    serde_json::json!(f)
                } else {
                    v.clone()
                }
            }
            serde_json::Value::Object(map) => {
                let normalized: serde_json::Map<String, serde_json::Value> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), normalize_value(v)))
                    .collect();
                serde_json::Value::Object(normalized)
            }
            serde_json::Value::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(normalize_value).collect())
            }
            _ => v.clone(),
        }
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and
    /// compares the JSON values (order-independent, float-normalized).
    fn roundtrip_test<T>(fixture: &str)
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture: serde_json::Value =
            serde_json::from_str(fixture).unwrap_or_else(|e| panic!("bad fixture: {e}"));
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize: {e}"));

        assert_eq!(
            normalize_value(&fixture),
            normalize_value(&reserialized),
            "roundtrip mismatch:\n  wire: {fixture}\n  ours: {reserialized}"
        );
    }

    // --- Protocol type fixtures ---

    #[test]
    fn fixture_configure_response_ok() {
        roundtrip_test::<ConfigureResponse>(
            r#"{"status": "ok", "media": {"id": "2905304948_317", "code": "CgX9q2"}}"#,
        );
    }

    #[test]
    fn fixture_configure_response_deferred() {
        roundtrip_test::<ConfigureResponse>(
            r#"{"status": "fail", "message": "Transcode not finished yet.", "cooldown_seconds": 3}"#,
        );
    }

    #[test]
    fn fixture_media_descriptor_without_code() {
        roundtrip_test::<MediaDescriptor>(r#"{"id": "2905304948_317"}"#);
    }

    #[test]
    fn fixture_api_error_body() {
        roundtrip_test::<ApiErrorBody>(
            r#"{"status": "fail", "message": "login_required", "error_title": "Log back in"}"#,
        );
    }

    #[test]
    fn fixture_flag_snapshot_mixed() {
        roundtrip_test::<FlagSnapshot>(
            r#"{"resumable_photo_upload_timeline": true, "segmented_video_upload_tv": false, "segment_min_duration_tv": 30}"#,
        );
    }

    #[test]
    fn fixture_feed_names() {
        for (feed, wire) in [
            (Feed::Timeline, "\"timeline\""),
            (Feed::Story, "\"story\""),
            (Feed::Album, "\"album\""),
            (Feed::Tv, "\"tv\""),
        ] {
            assert_eq!(serde_json::to_string(&feed).unwrap(), wire);
            assert_eq!(serde_json::from_str::<Feed>(wire).unwrap(), feed);
        }
    }

    // --- Metadata fixtures ---

    #[test]
    fn fixture_timeline_metadata() {
        roundtrip_test::<TimelineMetadata>(
            r#"{
                "caption": "golden hour",
                "location": {"name": "Pier 39", "lat": 37.808, "lng": -122.41, "external_id": "235235"},
                "usertags": [{"user_id": "1234", "position": [0.5, 0.25]}]
            }"#,
        );
    }

    #[test]
    fn fixture_story_metadata_with_stickers() {
        roundtrip_test::<StoryMetadata>(
            r#"{
                "stickers": [
                    {"type": "poll", "x": 0.5, "y": 0.8, "width": 0.6, "height": 0.2, "rotation": 0},
                    {"type": "mention", "x": 0.2, "y": 0.1, "width": 0.3, "height": 0.1, "rotation": 15.5}
                ]
            }"#,
        );
    }

    #[test]
    fn fixture_album_metadata() {
        roundtrip_test::<AlbumMetadata>(
            r#"{"caption": "trip", "children": ["u-1", "u-2", "u-3"]}"#,
        );
    }

    // --- Configure request body shapes ---

    #[test]
    fn configure_body_flattens_metadata_next_to_upload_id() {
        let metadata = FeedMetadata::Timeline(TimelineMetadata {
            caption: Some("golden hour".into()),
            location: None,
            usertags: vec![Usertag {
                user_id: "1234".into(),
                position: [0.5, 0.25],
            }],
        });
        let req = metadata.configure_request("u-42").unwrap();
        let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();

        assert_eq!(body["upload_id"], "u-42");
        assert_eq!(body["caption"], "golden hour");
        assert_eq!(body["usertags"][0]["user_id"], "1234");
        // The metadata is flattened, not nested under a key.
        assert!(body.get("metadata").is_none());
    }

    #[test]
    fn configure_body_omits_empty_optionals() {
        let metadata = FeedMetadata::Story(StoryMetadata::default());
        let req = metadata.configure_request("u-43").unwrap();
        let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();

        let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["upload_id"]);
    }

    #[test]
    fn location_fixture_roundtrip() {
        roundtrip_test::<Location>(r#"{"name": "Pier 39", "lat": 37.808, "lng": -122.41}"#);
    }

    #[test]
    fn sticker_rotation_defaults_to_zero() {
        let sticker: Sticker = serde_json::from_str(
            r#"{"type": "hashtag", "x": 0.1, "y": 0.2, "width": 0.3, "height": 0.1}"#,
        )
        .unwrap();
        assert_eq!(sticker.rotation, 0.0);
    }
}
