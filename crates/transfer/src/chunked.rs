//! Legacy multi-chunk video transfer.
//!
//! Sends fixed-size byte ranges sequentially, resizing chunks from
//! observed throughput, recovering partially-accepted uploads from
//! server-reported missing ranges, and rotating upload servers after
//! repeated failures.

use std::collections::VecDeque;
use std::time::Instant;

use tracing::{debug, warn};

use grampost_protocol::rupload::content_range;
use grampost_protocol::{ApiErrorKind, HttpRequest};

use crate::progress::{ProgressCallback, SpeedCalculator, TransferProgress};
use crate::reader::ChunkSource;
use crate::session::UploadSession;
use crate::transport::UploadTransport;
use crate::window::{ChunkWindow, first_gap, parse_held_ranges};
use crate::{
    CHUNK_ATTEMPTS_PER_SERVER, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE, TransferError, UploadAck,
};

/// Mutable per-server transfer state. Rotating servers resets all of
/// it to start-of-file.
#[derive(Debug)]
struct ServerState {
    server: String,
    attempts: u32,
    offset: u64,
    chunk_len: u64,
}

/// Drives the chunked strategy over an abstract transport.
pub struct ChunkedTransfer<'a> {
    transport: &'a dyn UploadTransport,
    min_chunk: u64,
    max_chunk: u64,
    speed: SpeedCalculator,
    progress: Option<ProgressCallback>,
}

impl<'a> ChunkedTransfer<'a> {
    pub fn new(transport: &'a dyn UploadTransport) -> Self {
        Self {
            transport,
            min_chunk: MIN_CHUNK_SIZE,
            max_chunk: MAX_CHUNK_SIZE,
            speed: SpeedCalculator::default(),
            progress: None,
        }
    }

    /// Overrides the adaptive chunk bounds (tuning, tests).
    pub fn with_chunk_bounds(mut self, min_chunk: u64, max_chunk: u64) -> Self {
        self.min_chunk = min_chunk.max(1);
        self.max_chunk = max_chunk.max(self.min_chunk);
        self
    }

    /// Registers a callback invoked whenever the server confirms bytes.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    fn report(&self, session: &UploadSession) {
        if let Some(cb) = &self.progress {
            cb(TransferProgress::of(session, &self.speed));
        }
    }

    /// Transfers the whole of `source` through the given upload
    /// servers, trying each in order.
    ///
    /// `path` is the entity upload path appended to each server base;
    /// `job` is the server-affinity marker echoed in every request.
    pub async fn transfer(
        &self,
        source: &mut ChunkSource,
        session: &mut UploadSession,
        servers: Vec<String>,
        path: &str,
        job: &str,
    ) -> Result<UploadAck, TransferError> {
        let total = source.size();
        if total == 0 {
            return Err(TransferError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "empty upload source",
            )));
        }
        let mut servers: VecDeque<String> = servers.into();
        let mut state = self.next_server(&mut servers)?;

        loop {
            if state.attempts >= CHUNK_ATTEMPTS_PER_SERVER {
                warn!(
                    upload_id = %session.upload_id(),
                    server = %state.server,
                    "server exhausted its attempts, rotating"
                );
                state = self.next_server(&mut servers)?;
            }

            let window =
                ChunkWindow::new(state.offset, total - 1).capped(state.chunk_len);
            let data = source.read_window(window)?;

            debug!(
                upload_id = %session.upload_id(),
                server = %state.server,
                start = window.start,
                end = window.end,
                "sending chunk"
            );

            let req = HttpRequest::post(format!("{}{}", state.server, path), data)
                .header("Content-Range", content_range(window.start, window.end, total))
                .header("X-Upload-Session", session.upload_id())
                .header("X-Upload-Job", job);

            let started = Instant::now();
            let result = self.transport.execute(req).await;
            state.attempts += 1;

            // Size the next chunk from observed throughput.
            let elapsed = started.elapsed().as_secs_f64().max(1e-4);
            let next = (window.len() as f64 / elapsed * 5.0) as u64;
            state.chunk_len = next.clamp(self.min_chunk, self.max_chunk);

            let resp = match result {
                Ok(resp) => resp,
                Err(e) => {
                    // No status received: retry the same chunk.
                    warn!(upload_id = %session.upload_id(), error = %e, "chunk send failed");
                    continue;
                }
            };
            self.speed.add_sample(window.len());

            match resp.status {
                200 => {
                    // Final acknowledgement; an unparsable body means the
                    // upload host glitched, so start over on a fresh server.
                    if resp.body.is_empty()
                        || serde_json::from_slice::<serde_json::Value>(&resp.body).is_err()
                    {
                        warn!(
                            upload_id = %session.upload_id(),
                            "200 with unusable body, rotating server"
                        );
                        state = self.next_server(&mut servers)?;
                        continue;
                    }
                    session.confirm_to(total);
                    self.report(session);
                    return Ok(UploadAck {
                        upload_id: session.upload_id().to_string(),
                        body: resp.body,
                    });
                }
                201 => {
                    let Some(header) = resp.header("Range") else {
                        warn!(upload_id = %session.upload_id(), "201 without Range header");
                        continue;
                    };
                    let ranges = match parse_held_ranges(header) {
                        Ok(ranges) => ranges,
                        Err(e) => {
                            warn!(upload_id = %session.upload_id(), error = %e, "bad Range header");
                            continue;
                        }
                    };

                    // A readable 201 is progress on this server and
                    // never counts toward rotation, gap or not.
                    state.attempts = 0;

                    // Bytes held from the start of the file are confirmed.
                    if let Some(first) = ranges.iter().min_by_key(|r| r.start)
                        && first.start == 0
                    {
                        session.confirm_to(first.end + 1);
                    }
                    self.report(session);

                    match first_gap(&ranges, total) {
                        Some(gap) => {
                            state.offset = gap.start;
                            state.chunk_len = state.chunk_len.min(gap.len());
                        }
                        None => {
                            // Everything held but no 200 yet; ask again.
                            warn!(
                                upload_id = %session.upload_id(),
                                "201 with no gap, retrying for final status"
                            );
                        }
                    }
                }
                400 | 403 | 511 => {
                    return Err(match ApiErrorKind::classify(resp.status, &resp.body) {
                        Some(kind) => TransferError::Api(kind),
                        None => TransferError::Rejected(resp.status),
                    });
                }
                422 => return Err(TransferError::CorruptMedia),
                status => {
                    if let Some(kind) = ApiErrorKind::classify(status, &resp.body) {
                        return Err(TransferError::Api(kind));
                    }
                    warn!(
                        upload_id = %session.upload_id(),
                        status,
                        "unexpected chunk status, retrying"
                    );
                }
            }
        }
    }

    fn next_server(&self, servers: &mut VecDeque<String>) -> Result<ServerState, TransferError> {
        let server = servers.pop_front().ok_or(TransferError::NoServersLeft)?;
        Ok(ServerState {
            server,
            attempts: 0,
            offset: 0,
            chunk_len: self.min_chunk,
        })
    }
}
