// src/metrics.rs
//
// Engine observability. Counters for every stage of the pipeline; export
// via the host's metrics endpoint or logs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct EngineMetrics {
    pub frames_processed: Arc<AtomicU64>,
    pub detections_seen: Arc<AtomicU64>,
    pub detections_rejected: Arc<AtomicU64>,
    pub duplicates_skipped: Arc<AtomicU64>,
    pub tracks_created: Arc<AtomicU64>,
    pub tracks_expired: Arc<AtomicU64>,
    pub scans_confirmed: Arc<AtomicU64>,
    pub store_successes: Arc<AtomicU64>,
    pub store_failures: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self {
            frames_processed: Arc::new(AtomicU64::new(0)),
            detections_seen: Arc::new(AtomicU64::new(0)),
            detections_rejected: Arc::new(AtomicU64::new(0)),
            duplicates_skipped: Arc::new(AtomicU64::new(0)),
            tracks_created: Arc::new(AtomicU64::new(0)),
            tracks_expired: Arc::new(AtomicU64::new(0)),
            scans_confirmed: Arc::new(AtomicU64::new(0)),
            store_successes: Arc::new(AtomicU64::new(0)),
            store_failures: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, counter: &AtomicU64, value: u64) {
        counter.fetch_add(value, Ordering::Relaxed);
    }

    pub fn get(&self, counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    /// Frames per second since engine start.
    pub fn fps(&self) -> f64 {
        let frames = self.frames_processed.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}
