//! Byte windows and missing-range recovery.
//!
//! On a 201 the upload host reports the byte spans it already holds in
//! a `Range` header, e.g. `0-4076155/8152310,6114234-8152309/8152310`.
//! The server is known to silently drop chunks under peak load, so the
//! held set may contain gaps; recovery always re-sends the *first* gap
//! and re-derives on each response, which converges left-to-right for
//! any level of fragmentation.

use crate::TransferError;

/// A byte range to send next. `end` is inclusive, matching the wire
/// convention in `Content-Range` and `Range` headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkWindow {
    pub start: u64,
    pub end: u64,
}

impl ChunkWindow {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(end >= start);
        Self { start, end }
    }

    /// Window length in bytes (always at least 1).
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Bounds this window to at most `max_len` bytes from its start.
    pub fn capped(&self, max_len: u64) -> Self {
        let max_len = max_len.max(1);
        Self {
            start: self.start,
            end: self.end.min(self.start + max_len - 1),
        }
    }
}

/// A `(start, end, total)` triple reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldRange {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

/// Parses a `Range` header value into held ranges.
///
/// Accepts one or more comma-separated `start-end/total` triples.
pub fn parse_held_ranges(header: &str) -> Result<Vec<HeldRange>, TransferError> {
    let malformed = || TransferError::MalformedRange(header.to_string());

    header
        .split(',')
        .map(|part| {
            let part = part.trim();
            let (span, total) = part.split_once('/').ok_or_else(malformed)?;
            let (start, end) = span.split_once('-').ok_or_else(malformed)?;
            let start: u64 = start.trim().parse().map_err(|_| malformed())?;
            let end: u64 = end.trim().parse().map_err(|_| malformed())?;
            let total: u64 = total.trim().parse().map_err(|_| malformed())?;
            if end < start || end >= total {
                return Err(malformed());
            }
            Ok(HeldRange { start, end, total })
        })
        .collect()
}

/// Computes the first gap not covered by the held ranges.
///
/// Ranges are sorted and contiguous/overlapping spans merged before the
/// gap is derived, so three or more fragmented ranges reduce to the
/// two-range case. Returns `None` when `[0, total)` is fully held.
pub fn first_gap(ranges: &[HeldRange], total: u64) -> Option<ChunkWindow> {
    if total == 0 {
        return None;
    }
    if ranges.is_empty() {
        return Some(ChunkWindow::new(0, total - 1));
    }

    let mut sorted: Vec<HeldRange> = ranges.to_vec();
    sorted.sort_by_key(|r| r.start);

    // Merge touching and overlapping spans.
    let mut merged: Vec<(u64, u64)> = Vec::with_capacity(sorted.len());
    for r in &sorted {
        match merged.last_mut() {
            Some((_, end)) if r.start <= end.saturating_add(1) => {
                *end = (*end).max(r.end);
            }
            _ => merged.push((r.start, r.end)),
        }
    }

    let (first_start, first_end) = merged[0];
    if first_start > 0 {
        return Some(ChunkWindow::new(0, first_start - 1));
    }
    match merged.get(1) {
        Some((second_start, _)) => Some(ChunkWindow::new(first_end + 1, second_start - 1)),
        None if first_end + 1 < total => Some(ChunkWindow::new(first_end + 1, total - 1)),
        None => None,
    }
}
