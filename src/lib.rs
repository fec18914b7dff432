// src/lib.rs
//
// scantrack: detection stabilization and confirmation engine for
// camera-based barcode scanning. Turns noisy, independent per-frame
// detections into confirmed, de-duplicated, spatially grouped scan events.
//
// Data flow per frame:
//   raw detections -> validator (filter) -> track registry (match-or-create)
//   -> confirmation policy (promote) -> coordinator (dedupe + persist)
//   -> region assigner (over the growing confirmed set)
//
// Camera capture, decoding, rendering, and the storage backend live with
// the host; they reach the engine through `Detection`, `Viewport`, and the
// `ScanStore` trait.

mod config;
pub mod confirmation;
pub mod coordinator;
pub mod geometry;
pub mod metrics;
pub mod regions;
pub mod store;
pub mod tracker;
pub mod types;
pub mod validator;

pub use coordinator::{default_group_key, now_millis, ClockFn, GroupKeyFn, ScanCoordinator};
pub use geometry::{overlap_ratio, Rect, Roi};
pub use metrics::EngineMetrics;
pub use regions::assign_regions;
pub use store::{MemoryStore, ScanRecord, ScanStore, StoreError};
pub use tracker::{Track, TrackRegistry};
pub use types::{
    ConfirmedDetection, Detection, EngineConfig, LoggingConfig, MarkerStatus, RegionConfig,
    ScanEvent, TrackerConfig, ValidatorConfig, Viewport,
};
pub use validator::is_acceptable;
