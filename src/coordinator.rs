// src/coordinator.rs
//
// Drives one frame's worth of raw detections through the pipeline:
// validate -> match-or-create -> confirm -> persist, guarding against
// re-processing values already accepted.
//
// Concurrency model: frame processing is serialized through a single async
// lock over the track registry (the expiry sweep takes the same lock), but
// the persistence call is fire-and-continue. The scanned set is therefore
// reserved synchronously at the moment of confirmation, before any await on
// the store; checking-then-marking after an await would reopen the race
// where two frames confirm the same code while the first write is in flight.
// A failed write releases the reservation so a later frame can retry.

use crate::confirmation::is_confirmed;
use crate::geometry::Rect;
use crate::metrics::EngineMetrics;
use crate::regions::assign_regions;
use crate::store::{ScanStore, StoreError};
use crate::tracker::{Track, TrackRegistry};
use crate::types::{
    ConfirmedDetection, Detection, EngineConfig, MarkerStatus, ScanEvent, Viewport,
};
use crate::validator::is_acceptable;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Derives the product group key from a code. The default splits on the
/// first `-` and takes the prefix; hosts with other code formats plug in
/// their own function.
pub type GroupKeyFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Time source shared by the expiry sweep and, by contract, by the
/// `now_ms` values the host passes to `process_frame`. Defaults to unix
/// wall-clock milliseconds; hosts feeding frame-relative or media
/// timestamps plug in a matching clock via `with_clock`, otherwise the
/// first sweep would see every live track as ancient and expire it.
pub type ClockFn = Arc<dyn Fn() -> u64 + Send + Sync>;

pub fn default_group_key(code: &str) -> String {
    code.split_once('-')
        .map(|(prefix, _)| prefix)
        .unwrap_or(code)
        .to_string()
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Session-wide mutable state with an explicit lifecycle: reset on
/// `clear_session` and discarded with the coordinator. Owned context, not
/// an ambient singleton, so tests construct isolated instances.
struct SessionState {
    scanned: RwLock<HashSet<String>>,
    markers: RwLock<Vec<ConfirmedDetection>>,
    next_marker_id: AtomicU64,
}

#[derive(Clone)]
pub struct ScanCoordinator {
    config: Arc<EngineConfig>,
    viewport: Arc<RwLock<Viewport>>,
    registry: Arc<Mutex<TrackRegistry>>,
    session: Arc<SessionState>,
    store: Arc<dyn ScanStore>,
    group_key: GroupKeyFn,
    clock: ClockFn,
    events: broadcast::Sender<ScanEvent>,
    pub metrics: EngineMetrics,
}

impl ScanCoordinator {
    pub fn new(store: Arc<dyn ScanStore>, config: EngineConfig, viewport: Viewport) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            config: Arc::new(config),
            viewport: Arc::new(RwLock::new(viewport)),
            registry: Arc::new(Mutex::new(TrackRegistry::new())),
            session: Arc::new(SessionState {
                scanned: RwLock::new(HashSet::new()),
                markers: RwLock::new(Vec::new()),
                next_marker_id: AtomicU64::new(1),
            }),
            store,
            group_key: Arc::new(default_group_key),
            clock: Arc::new(now_millis),
            events,
            metrics: EngineMetrics::new(),
        }
    }

    pub fn with_group_key(mut self, group_key: GroupKeyFn) -> Self {
        self.group_key = group_key;
        self
    }

    /// Replace the engine clock. Required when `process_frame` is fed
    /// timestamps that are not unix milliseconds, so the expiry sweep
    /// measures idleness on the same time base.
    pub fn with_clock(mut self, clock: ClockFn) -> Self {
        self.clock = clock;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.events.subscribe()
    }

    /// Called by the UI collaborator when display geometry changes.
    pub async fn set_viewport(&self, viewport: Viewport) {
        *self.viewport.write().await = viewport;
    }

    /// Seed the scanned set from the store so codes persisted in an earlier
    /// session are never re-emitted. Returns the number of codes loaded.
    pub async fn hydrate(&self) -> Result<usize, StoreError> {
        let records = self.store.load_all().await?;
        let count = records.len();
        let mut scanned = self.session.scanned.write().await;
        for record in records {
            scanned.insert(record.code);
        }
        info!(count, "session hydrated from store");
        Ok(count)
    }

    /// Clear the store and reset all session state.
    pub async fn clear_session(&self) -> Result<(), StoreError> {
        self.store.clear_all().await?;
        self.session.scanned.write().await.clear();
        self.session.markers.write().await.clear();
        self.registry.lock().await.clear();
        info!("session cleared");
        Ok(())
    }

    /// Process one frame of raw detections. Malformed detections, validator
    /// rejections, and already-scanned codes are dropped silently; nothing
    /// here is fatal.
    ///
    /// `now_ms` must be on the engine's time base (unix milliseconds unless
    /// a different clock was installed with `with_clock`), since the expiry
    /// sweep compares `last_seen` against that clock.
    pub async fn process_frame(&self, detections: &[Detection], now_ms: u64) {
        self.metrics.inc(&self.metrics.frames_processed);
        let viewport = *self.viewport.read().await;
        let mut registry = self.registry.lock().await;

        for detection in detections {
            self.metrics.inc(&self.metrics.detections_seen);

            let code = detection.value.trim();
            if code.is_empty() {
                continue;
            }
            let Some(frame) = detection.bounding_rect() else {
                continue;
            };
            if !is_acceptable(&frame, &viewport, &self.config.validator) {
                self.metrics.inc(&self.metrics.detections_rejected);
                continue;
            }
            if self.session.scanned.read().await.contains(code) {
                self.metrics.inc(&self.metrics.duplicates_skipped);
                // permanent dedup, independent of tracks; the marker keeps
                // following the code while the camera still sees it
                self.refresh_marker(code, frame).await;
                continue;
            }

            let threshold = self.config.tracker.confirm_hits;
            let confirmed = match registry.find_match(code, &frame, self.config.tracker.iou_threshold)
            {
                Some(index) => {
                    let track = registry.update(index, frame, now_ms);
                    is_confirmed(track, threshold)
                }
                None => {
                    let track = registry.create(code, frame, now_ms);
                    self.metrics.inc(&self.metrics.tracks_created);
                    is_confirmed(track, threshold)
                }
            };

            if confirmed {
                self.confirm(code, frame, now_ms).await;
            }
        }
    }

    /// Sweep the registry for idle tracks. Runs from `spawn_expiry_sweep`
    /// but is callable directly by hosts driving their own scheduling.
    pub async fn expire_stale(&self, now_ms: u64) -> usize {
        let removed = self
            .registry
            .lock()
            .await
            .expire(now_ms, self.config.tracker.track_timeout_ms);
        if removed > 0 {
            self.metrics.add(&self.metrics.tracks_expired, removed as u64);
            debug!(removed, "expiry sweep removed idle tracks");
        }
        removed
    }

    /// Background task sweeping idle tracks independently of frame arrival,
    /// so codes that left the frame become scoreable again after the timeout
    /// even if no further frames mention them.
    pub fn spawn_expiry_sweep(&self) -> JoinHandle<()> {
        let coordinator = self.clone();
        let period = Duration::from_millis(coordinator.config.tracker.sweep_interval_ms.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let now_ms = (coordinator.clock)();
                coordinator.expire_stale(now_ms).await;
            }
        })
    }

    /// Current region-assigned marker set for the display collaborator.
    pub async fn markers(&self) -> Vec<ConfirmedDetection> {
        self.session.markers.read().await.clone()
    }

    pub async fn is_scanned(&self, code: &str) -> bool {
        self.session.scanned.read().await.contains(code)
    }

    /// Snapshot of live tracks, for diagnostics.
    pub async fn tracks(&self) -> Vec<Track> {
        self.registry.lock().await.tracks().to_vec()
    }

    pub async fn track_count(&self) -> usize {
        self.registry.lock().await.len()
    }

    // ------------------------------------------------------------------
    // confirmation + two-phase persistence
    // ------------------------------------------------------------------

    async fn confirm(&self, code: &str, frame: Rect, now_ms: u64) {
        {
            // Reserve before any suspension on the store call. A second
            // detection confirming the same code in this batch (or a racing
            // one) must find the mark already set.
            let mut scanned = self.session.scanned.write().await;
            if !scanned.insert(code.to_string()) {
                return;
            }
        }
        self.metrics.inc(&self.metrics.scans_confirmed);
        self.insert_marker(code, frame, now_ms).await;

        let group_key = (self.group_key)(code);
        info!(code, group_key = %group_key, "scan confirmed; persistence in flight");

        let coordinator = self.clone();
        let code = code.to_string();
        tokio::spawn(async move {
            coordinator.finish_persist(code, group_key).await;
        });
    }

    async fn finish_persist(&self, code: String, group_key: String) {
        match self.store.add_scan(&code, &group_key).await {
            Ok(()) => {
                self.metrics.inc(&self.metrics.store_successes);
                self.mark_saved(&code).await;
                let _ = self.events.send(ScanEvent::Confirmed { code, group_key });
            }
            Err(err) => {
                self.metrics.inc(&self.metrics.store_failures);
                warn!(code = %code, error = %err, "persistence failed; releasing scanned mark for retry");
                self.session.scanned.write().await.remove(&code);
                self.remove_marker(&code).await;
                let _ = self.events.send(ScanEvent::PersistFailed { code });
            }
        }
    }

    // ------------------------------------------------------------------
    // marker set maintenance
    // ------------------------------------------------------------------

    async fn insert_marker(&self, code: &str, frame: Rect, now_ms: u64) {
        let mut markers = self.session.markers.write().await;
        if let Some(existing) = markers.iter_mut().find(|m| m.code == code) {
            // never duplicated for the same code
            existing.frame = frame;
            return;
        }
        let id = self.session.next_marker_id.fetch_add(1, Ordering::Relaxed);
        markers.push(ConfirmedDetection {
            id,
            code: code.to_string(),
            frame,
            status: MarkerStatus::Pending,
            timestamp_ms: now_ms,
            region_index: None,
            index_in_region: None,
        });
        let assigned = assign_regions(&markers, &self.config.regions);
        *markers = assigned;
    }

    async fn refresh_marker(&self, code: &str, frame: Rect) {
        let mut markers = self.session.markers.write().await;
        let Some(marker) = markers.iter_mut().find(|m| m.code == code) else {
            return;
        };
        marker.frame = frame;
        // a moved center can change row membership, so the grouping is
        // recomputed like any other change to the confirmed set
        let assigned = assign_regions(&markers, &self.config.regions);
        *markers = assigned;
    }

    async fn mark_saved(&self, code: &str) {
        let mut markers = self.session.markers.write().await;
        if let Some(marker) = markers.iter_mut().find(|m| m.code == code) {
            marker.status = MarkerStatus::Saved;
        }
    }

    async fn remove_marker(&self, code: &str) {
        let mut markers = self.session.markers.write().await;
        markers.retain(|m| m.code != code);
        let assigned = assign_regions(&markers, &self.config.regions);
        *markers = assigned;
    }
}
