// Performance metrics module
//
// Provides lightweight metrics tracking for monitoring runtime performance

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Global runtime metrics
///
/// Uses atomic operations for thread-safe metric tracking without locks.
/// Counters are bumped from both the render thread and the worker threads
/// and can be logged periodically or on shutdown for performance analysis.
#[derive(Debug)]
pub struct Metrics {
    /// Total frames rendered
    pub frames_rendered: AtomicU64,

    /// Total render time in microseconds
    pub total_frame_time_us: AtomicU64,

    /// Total callbacks invoked (synchronous, async bodies, and returns)
    pub callbacks_invoked: AtomicU64,

    /// Callback invocations that ended in a reported error
    pub callback_errors: AtomicU64,

    /// Structural mutations applied during frame drains
    pub mutations_applied: AtomicU64,

    /// Structural mutations rejected (missing targets, duplicate names)
    pub mutations_rejected: AtomicU64,

    /// Async jobs handed to the worker pool
    pub jobs_submitted: AtomicUsize,

    /// Worker pools created over the runtime's lifetime
    pub pools_created: AtomicUsize,

    /// Worker pools torn down after going idle
    pub pools_destroyed: AtomicUsize,

    /// Runtime start time
    start_time: Instant,
}

impl Metrics {
    /// Create a new Metrics instance
    pub fn new() -> Self {
        Self {
            frames_rendered: AtomicU64::new(0),
            total_frame_time_us: AtomicU64::new(0),
            callbacks_invoked: AtomicU64::new(0),
            callback_errors: AtomicU64::new(0),
            mutations_applied: AtomicU64::new(0),
            mutations_rejected: AtomicU64::new(0),
            jobs_submitted: AtomicUsize::new(0),
            pools_created: AtomicUsize::new(0),
            pools_destroyed: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a completed frame and its wall time
    pub fn record_frame(&self, duration: Duration) {
        self.frames_rendered.fetch_add(1, Ordering::Relaxed);
        self.total_frame_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Record a callback invocation
    pub fn record_callback_invoked(&self) {
        self.callbacks_invoked.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a callback error
    pub fn record_callback_error(&self) {
        self.callback_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an applied structural mutation
    pub fn record_mutation_applied(&self) {
        self.mutations_applied.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected structural mutation
    pub fn record_mutation_rejected(&self) {
        self.mutations_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an async job submission
    pub fn record_job_submitted(&self) {
        self.jobs_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a worker pool creation
    pub fn record_pool_created(&self) {
        self.pools_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a worker pool teardown
    pub fn record_pool_destroyed(&self) {
        self.pools_destroyed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average frame time in milliseconds
    pub fn avg_frame_time_ms(&self) -> f64 {
        let total = self.total_frame_time_us.load(Ordering::Relaxed);
        let count = self.frames_rendered.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64 / 1000.0
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        let uptime = self.uptime();
        tracing::info!("=== Runtime Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", uptime.as_secs_f64());
        tracing::info!(
            "Frames: {} rendered (avg: {:.3}ms per frame)",
            self.frames_rendered.load(Ordering::Relaxed),
            self.avg_frame_time_ms()
        );
        tracing::info!(
            "Callbacks: {} invoked, {} errors",
            self.callbacks_invoked.load(Ordering::Relaxed),
            self.callback_errors.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Mutations: {} applied, {} rejected",
            self.mutations_applied.load(Ordering::Relaxed),
            self.mutations_rejected.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Async: {} jobs submitted, {} pools created, {} pools destroyed",
            self.jobs_submitted.load(Ordering::Relaxed),
            self.pools_created.load(Ordering::Relaxed),
            self.pools_destroyed.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
