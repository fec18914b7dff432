// src/types.rs

use crate::geometry::{Rect, Roi};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub validator: ValidatorConfig,
    pub tracker: TrackerConfig,
    pub regions: RegionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Detection area divided by total frame area must reach this value.
    /// Rejects specks and decoder noise.
    pub min_area_ratio: f32,
    /// Acceptable width/height band. Rejects degenerate slivers from misreads.
    pub min_aspect_ratio: f32,
    pub max_aspect_ratio: f32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_area_ratio: 0.002,
            min_aspect_ratio: 0.3,
            max_aspect_ratio: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum IoU to match a detection to an existing track of the same code.
    pub iou_threshold: f32,
    /// Sightings required before a track's read is trusted. 1 confirms on
    /// first sight; higher values demand multi-frame agreement. This is the
    /// engine's accuracy/latency knob.
    pub confirm_hits: u32,
    /// A track idle this long is forgotten and the code becomes scoreable
    /// from scratch.
    pub track_timeout_ms: u64,
    /// Period of the expiry sweep, which runs independently of frame arrival.
    pub sweep_interval_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.3,
            confirm_hits: 3,
            track_timeout_ms: 1500,
            sweep_interval_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Confirmed detections per logical row of the display grid.
    pub group_size: usize,
    /// Vertical centers closer than this are treated as the same row.
    pub row_epsilon_px: f32,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            group_size: 4,
            row_epsilon_px: 12.0,
        }
    }
}

/// Log level hint for the host's subscriber; the library itself only emits
/// `tracing` events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// One raw per-frame detection from the camera collaborator. Carries no
/// identity across frames; identity is reconstructed by the track registry
/// from `(value, spatial overlap)`.
#[derive(Debug, Clone)]
pub struct Detection {
    pub value: String,
    pub frame: Option<Rect>,
    /// Optional corner points; used to derive a bounding box when the
    /// camera reports quadrilaterals instead of rectangles.
    pub corners: Option<[(f32, f32); 4]>,
}

impl Detection {
    pub fn new(value: impl Into<String>, frame: Rect) -> Self {
        Self {
            value: value.into(),
            frame: Some(frame),
            corners: None,
        }
    }

    pub fn from_corners(value: impl Into<String>, corners: [(f32, f32); 4]) -> Self {
        Self {
            value: value.into(),
            frame: None,
            corners: Some(corners),
        }
    }

    /// Usable bounding geometry, if any. Prefers the reported rectangle and
    /// falls back to the corner hull; `None` means the detection is malformed
    /// and must be skipped.
    pub fn bounding_rect(&self) -> Option<Rect> {
        match self.frame {
            Some(rect) if rect.is_valid() => Some(rect),
            _ => self.corners.as_ref().and_then(Rect::from_corners),
        }
    }
}

/// Frame dimensions plus region of interest, owned by the UI collaborator
/// and recomputed only when display geometry changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub frame_width: f32,
    pub frame_height: f32,
    pub roi: Roi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerStatus {
    /// Confirmed; persistence call still in flight.
    Pending,
    /// Persistence acknowledged.
    Saved,
}

/// A confirmed, de-duplicated detection ("marker"), durable for the session.
/// At most one exists per code; only its frame is refreshed while the camera
/// still sees the code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmedDetection {
    pub id: u64,
    pub code: String,
    pub frame: Rect,
    pub status: MarkerStatus,
    pub timestamp_ms: u64,
    pub region_index: Option<usize>,
    pub index_in_region: Option<usize>,
}

/// Events published to display / observability collaborators.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    Confirmed { code: String, group_key: String },
    PersistFailed { code: String },
}
