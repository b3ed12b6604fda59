//! Transfer progress observation.
//!
//! Callers register a [`ProgressCallback`] on a transfer and receive
//! [`TransferProgress`] snapshots whenever the server confirms bytes.
//! Speed is averaged over a sliding sample window.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::session::UploadSession;

/// Snapshot of one asset's transfer state.
#[derive(Debug, Clone)]
pub struct TransferProgress {
    pub upload_id: String,
    pub total_bytes: u64,
    /// Bytes the server has acknowledged holding.
    pub confirmed_bytes: u64,
    /// Average upload speed in bytes/second over the recent window.
    pub bytes_per_second: f64,
    /// Estimated time to completion; `None` while speed is unknown.
    pub eta: Option<Duration>,
}

impl TransferProgress {
    /// Builds a snapshot from session state and a speed window.
    pub fn of(session: &UploadSession, speed: &SpeedCalculator) -> Self {
        Self {
            upload_id: session.upload_id().to_string(),
            total_bytes: session.total_bytes(),
            confirmed_bytes: session.confirmed_bytes(),
            bytes_per_second: speed.bytes_per_second(),
            eta: speed.eta(session.remaining_bytes()),
        }
    }

    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            100.0
        } else {
            self.confirmed_bytes as f64 / self.total_bytes as f64 * 100.0
        }
    }
}

/// Callback invoked with transfer progress.
pub type ProgressCallback = Box<dyn Fn(TransferProgress) + Send + Sync>;

struct Sample {
    bytes: u64,
    at: Instant,
}

/// Per-sample retention bounds of one [`SpeedCalculator`].
struct SampleWindow {
    samples: VecDeque<Sample>,
    span: Duration,
    cap: usize,
}

impl SampleWindow {
    /// Evicts from the front until the window ending at `now` holds at
    /// most `cap` samples, none older than `span`.
    fn evict(&mut self, now: Instant) {
        while self.samples.len() > self.cap {
            self.samples.pop_front();
        }
        while let Some(front) = self.samples.front() {
            if now.duration_since(front.at) <= self.span {
                break;
            }
            self.samples.pop_front();
        }
    }
}

/// Sliding-window throughput estimate over recorded sends.
///
/// Interior-mutable so transfer strategies can record samples through
/// the `&self` driver methods.
pub struct SpeedCalculator {
    inner: Mutex<SampleWindow>,
}

impl Default for SpeedCalculator {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl SpeedCalculator {
    /// `window_size` defaults to 5 s, `max_samples` to 100.
    pub fn new(window_size: Option<Duration>, max_samples: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(SampleWindow {
                samples: VecDeque::new(),
                span: window_size.unwrap_or(Duration::from_secs(5)),
                cap: max_samples.unwrap_or(100),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SampleWindow> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Records `bytes` as sent at the current instant.
    pub fn add_sample(&self, bytes: u64) {
        let now = Instant::now();
        let mut window = self.lock();
        window.samples.push_back(Sample { bytes, at: now });
        window.evict(now);
    }

    /// Average throughput over the window, in bytes per second.
    ///
    /// A single sample spans no time, so a rate needs at least two;
    /// otherwise 0.0.
    pub fn bytes_per_second(&self) -> f64 {
        let window = self.lock();
        let (Some(first), Some(last)) = (window.samples.front(), window.samples.back()) else {
            return 0.0;
        };
        let elapsed = last.at.duration_since(first.at);
        if window.samples.len() < 2 || elapsed.is_zero() {
            return 0.0;
        }
        let total: u64 = window.samples.iter().map(|s| s.bytes).sum();
        total as f64 / elapsed.as_secs_f64()
    }

    /// Projected time to move `remaining_bytes` at the current rate,
    /// `None` while the rate is unknown.
    pub fn eta(&self, remaining_bytes: u64) -> Option<Duration> {
        let rate = self.bytes_per_second();
        (rate > 0.0).then(|| Duration::from_secs_f64(remaining_bytes as f64 / rate))
    }

    /// Forgets all samples.
    pub fn reset(&self) {
        self.lock().samples.clear();
    }
}
