//! Lock-free progress counters shared by fetchers and the renderer.
//!
//! Fetchers only ever call [`ProgressState::add`]. The previous-sample
//! counter behind the instantaneous speed is advanced by the renderer alone.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Sentinel for timestamps that have not been recorded.
const UNSET: u64 = u64::MAX;

/// Progress of one download.
///
/// Timestamps are stored as nanoseconds since the state was created so they
/// fit in atomics.
#[derive(Debug)]
pub struct ProgressState {
    epoch: Instant,
    interval: Duration,
    transferred: AtomicU64,
    last_sample: AtomicU64,
    total: AtomicU64,
    started_at: AtomicU64,
    finished_at: AtomicU64,
}

impl ProgressState {
    /// Create counters sampled every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            epoch: Instant::now(),
            interval: interval.max(Duration::from_millis(1)),
            transferred: AtomicU64::new(0),
            last_sample: AtomicU64::new(0),
            total: AtomicU64::new(0),
            started_at: AtomicU64::new(UNSET),
            finished_at: AtomicU64::new(UNSET),
        }
    }

    /// Start a transfer of `total` bytes (`0` if unknown), clearing counters
    /// left by a previous run.
    pub fn start(&self, total: u64) {
        self.transferred.store(0, Ordering::Relaxed);
        self.last_sample.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
        self.finished_at.store(UNSET, Ordering::Relaxed);
        self.started_at.store(self.now(), Ordering::Release);
    }

    /// Freeze the elapsed time.
    pub fn finish(&self) {
        self.finished_at.store(self.now(), Ordering::Release);
    }

    /// Record `n` more bytes written.
    pub fn add(&self, n: u64) {
        self.transferred.fetch_add(n, Ordering::Relaxed);
    }

    /// Bytes transferred so far.
    pub fn transferred(&self) -> u64 {
        self.transferred.load(Ordering::Relaxed)
    }

    /// Total size, `0` if unknown.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// The reporting interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whole percent transferred, `None` when the total is unknown.
    pub fn percent(&self) -> Option<u64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let percent = self.transferred() as u128 * 100 / total as u128;
        Some(percent.min(100) as u64)
    }

    /// Bytes per second transferred since the last sample.
    pub fn instantaneous_speed(&self) -> u64 {
        self.speed_since_sample(self.transferred())
    }

    fn speed_since_sample(&self, transferred: u64) -> u64 {
        let delta = transferred.saturating_sub(self.last_sample.load(Ordering::Relaxed));
        (delta as u128 * 1_000_000 / self.interval.as_micros().max(1)) as u64
    }

    /// Bytes per second since [`start`](Self::start).
    ///
    /// Computed as `bytes * 1000 / elapsed_ms` so small transfers and short
    /// durations are not truncated to zero.
    pub fn average_speed(&self) -> u64 {
        let millis = self.elapsed().as_millis();
        if millis == 0 {
            return 0;
        }
        (self.transferred() as u128 * 1000 / millis) as u64
    }

    /// Time since [`start`](Self::start), up to [`finish`](Self::finish) if
    /// the transfer has ended.
    pub fn elapsed(&self) -> Duration {
        let started = self.started_at.load(Ordering::Acquire);
        if started == UNSET {
            return Duration::ZERO;
        }
        let end = match self.finished_at.load(Ordering::Acquire) {
            UNSET => self.now(),
            finished => finished,
        };
        Duration::from_nanos(end.saturating_sub(started))
    }

    /// Take a sample for the renderer: returns the instantaneous speed and
    /// moves the previous-sample mark to the current byte count.
    pub(crate) fn sample(&self) -> u64 {
        let transferred = self.transferred();
        let speed = self.speed_since_sample(transferred);
        self.last_sample.store(transferred, Ordering::Relaxed);
        speed
    }

    fn now(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }
}
