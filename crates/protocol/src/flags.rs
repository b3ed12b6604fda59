//! Server-advertised feature-flag snapshot.
//!
//! The mobile API gates upload behaviors behind experiment flags that
//! arrive with the session. A snapshot is an immutable name → value map
//! consulted by the strategy selector; values are either boolean gates
//! or numeric parameters (thresholds, percentages).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::feed::Feed;

/// A single flag value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Number(f64),
}

/// Snapshot of experiment flags for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagSnapshot {
    flags: HashMap<String, FlagValue>,
}

impl FlagSnapshot {
    /// Creates an empty snapshot (all gates disabled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a boolean gate (builder style, used mostly in tests).
    pub fn with_bool(mut self, name: impl Into<String>, value: bool) -> Self {
        self.flags.insert(name.into(), FlagValue::Bool(value));
        self
    }

    /// Sets a numeric parameter (builder style).
    pub fn with_number(mut self, name: impl Into<String>, value: f64) -> Self {
        self.flags.insert(name.into(), FlagValue::Number(value));
        self
    }

    /// Returns `true` if the named gate exists and is enabled.
    ///
    /// Numeric values count as enabled when non-zero (percentage gates
    /// fully rolled out arrive as numbers).
    pub fn is_enabled(&self, name: &str) -> bool {
        match self.flags.get(name) {
            Some(FlagValue::Bool(b)) => *b,
            Some(FlagValue::Number(n)) => *n != 0.0,
            None => false,
        }
    }

    /// Returns the named numeric parameter, if present.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.flags.get(name) {
            Some(FlagValue::Number(n)) => Some(*n),
            Some(FlagValue::Bool(_)) | None => None,
        }
    }

    /// Derives the per-feed key for a flag base name, e.g.
    /// `segmented_video_upload` + Story → `segmented_video_upload_story`.
    pub fn feed_key(base: &str, feed: Feed) -> String {
        format!("{base}_{}", feed.wire_name())
    }

    /// Convenience: `is_enabled` on the per-feed key.
    pub fn is_enabled_for(&self, base: &str, feed: Feed) -> bool {
        self.is_enabled(&Self::feed_key(base, feed))
    }

    /// Convenience: `number` on the per-feed key.
    pub fn number_for(&self, base: &str, feed: Feed) -> Option<f64> {
        self.number(&Self::feed_key(base, feed))
    }
}
