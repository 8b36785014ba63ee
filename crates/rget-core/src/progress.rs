//! Periodic progress sampling over a monotonic byte counter.
//!
//! The transfer loop pushes raw byte counts with [`Progress::add`]; a timer
//! task turns the counter into periodic samples for a caller-supplied sink.
//! Consumers derive rate and ETA from the sample deltas.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;

/// Time half of a sample.
#[derive(Debug, Clone, Copy)]
pub struct ProgressTime {
    /// When sampling started.
    pub start: Instant,
    /// When this sample was taken.
    pub now: Instant,
    /// Elapsed since start.
    pub duration: Duration,
    /// Elapsed since the previous sample.
    pub delta: Duration,
}

/// Byte-count half of a sample.
#[derive(Debug, Clone, Copy)]
pub struct ProgressTotal {
    /// Expected final byte count.
    pub total: u64,
    /// Bytes accounted for so far (includes any resumed prefix).
    pub current: u64,
    /// Bytes still to go; saturates at zero.
    pub remaining: u64,
    /// Bytes received since the previous sample.
    pub delta: u64,
}

impl ProgressTotal {
    /// Fraction complete in [0.0, 1.0]. A zero-byte total counts as done.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.current as f64 / self.total as f64).min(1.0)
    }
}

/// Instantaneous rate over the last sample window in bytes per second.
/// `None` when the window is empty (first sample, or a forced final sample
/// landing in the same instant as the previous one).
pub fn sample_rate(time: &ProgressTime, total: &ProgressTotal) -> Option<f64> {
    let secs = time.delta.as_secs_f64();
    if secs <= 0.0 {
        return None;
    }
    Some(total.delta as f64 / secs)
}

/// Estimated time to completion from the instantaneous rate. `None` when the
/// rate is unknown or zero.
pub fn sample_eta(time: &ProgressTime, total: &ProgressTotal) -> Option<Duration> {
    let rate = sample_rate(time, total)?;
    if rate <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(total.remaining as f64 / rate).ok()
}

/// Progress sink: called with each sample. Rendering is the caller's concern.
pub type ProgressSink = Arc<dyn Fn(&ProgressTime, &ProgressTotal) + Send + Sync>;

struct SampleState {
    start: Instant,
    prev_time: Instant,
    prev_current: u64,
}

struct Sampler {
    total: u64,
    current: Arc<AtomicU64>,
    sink: ProgressSink,
    state: Mutex<SampleState>,
}

impl Sampler {
    /// Takes one sample and hands it to the sink.
    fn update(&self) {
        let now = Instant::now();
        let current = self.current.load(Ordering::Relaxed);

        let mut state = self.state.lock().unwrap();
        let time = ProgressTime {
            start: state.start,
            now,
            duration: now.duration_since(state.start),
            delta: now.duration_since(state.prev_time),
        };
        let total = ProgressTotal {
            total: self.total,
            current,
            remaining: self.total.saturating_sub(current),
            delta: current.saturating_sub(state.prev_current),
        };
        state.prev_time = now;
        state.prev_current = current;
        drop(state);

        (self.sink)(&time, &total);
    }
}

/// Byte counter plus an optional periodic sampling session.
///
/// At most one session runs per instance. The session's timer task is owned
/// here and never outlives [`end`](Self::end) or drop.
pub struct Progress {
    total: u64,
    current: Arc<AtomicU64>,
    active: Option<Active>,
}

struct Active {
    sampler: Arc<Sampler>,
    handle: tokio::task::JoinHandle<()>,
}

impl Progress {
    /// `starting_current` is the byte count already on disk when resuming.
    pub fn new(total: u64, starting_current: u64) -> Self {
        Self {
            total,
            current: Arc::new(AtomicU64::new(starting_current)),
            active: None,
        }
    }

    /// Adds to the counter. No output happens until the next timer tick.
    pub fn add(&self, amount: u64) {
        self.current.fetch_add(amount, Ordering::Relaxed);
    }

    /// Current counter value.
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Relaxed)
    }

    /// Starts sampling: one immediate sample, then one every `interval`.
    /// Fails if a session is already running.
    pub fn start(&mut self, interval: Duration, sink: ProgressSink) -> Result<()> {
        if self.active.is_some() {
            anyhow::bail!("progress sampler already started");
        }

        let now = Instant::now();
        let sampler = Arc::new(Sampler {
            total: self.total,
            current: Arc::clone(&self.current),
            sink,
            state: Mutex::new(SampleState {
                start: now,
                prev_time: now,
                prev_current: self.current.load(Ordering::Relaxed),
            }),
        });

        sampler.update();

        let worker = Arc::clone(&sampler);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately; the immediate sample
            // above already covered it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                worker.update();
            }
        });

        self.active = Some(Active { sampler, handle });
        Ok(())
    }

    /// Stops the timer and forces one final sample so the sink observes the
    /// true final state. Idempotent; a no-op if never started.
    pub fn end(&mut self) {
        if let Some(active) = self.active.take() {
            active.handle.abort();
            active.sampler.update();
        }
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.handle.abort();
        }
    }
}
