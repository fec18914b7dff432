// src/tracker.rs
//
// In-memory registry of active tracks, each representing "the same physical
// code observed across consecutive frames". The camera gives no persistent
// object identity, so identity is reconstructed from value equality plus
// spatial overlap. Multiple simultaneous instances of the same code at
// different locations stay distinct tracks.

use crate::geometry::{overlap_ratio, Rect};
use tracing::debug;

/// The engine's transient belief that a code has been continuously observed.
/// Owned exclusively by the registry; mutated only through `update`.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: u64,
    pub code: String,
    pub frame: Rect,
    pub hit_count: u32,
    pub last_seen_ms: u64,
}

#[derive(Debug, Default)]
pub struct TrackRegistry {
    tracks: Vec<Track>,
    next_id: u64,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self {
            tracks: Vec::with_capacity(16),
            next_id: 1,
        }
    }

    /// First track with an equal code and IoU at or above the threshold, in
    /// insertion order.
    ///
    /// Deliberately first-match rather than best-overlap: preserved for
    /// behavioral parity with the reference engine (a simplicity trade-off,
    /// flagged as a possible accuracy improvement, not a defect).
    pub fn find_match(&self, code: &str, frame: &Rect, iou_threshold: f32) -> Option<usize> {
        self.tracks
            .iter()
            .position(|t| t.code == code && overlap_ratio(&t.frame, frame) >= iou_threshold)
    }

    /// Record another sighting: bump the hit count, replace the frame with
    /// the new observation (last-write-wins, no smoothing), refresh
    /// `last_seen`. Returns the new authoritative state.
    pub fn update(&mut self, index: usize, frame: Rect, now_ms: u64) -> &Track {
        let track = &mut self.tracks[index];
        track.hit_count += 1;
        track.frame = frame;
        track.last_seen_ms = now_ms;
        debug!(
            track_id = track.id,
            code = %track.code,
            hit_count = track.hit_count,
            "track updated"
        );
        track
    }

    pub fn create(&mut self, code: &str, frame: Rect, now_ms: u64) -> &Track {
        let track = Track {
            id: self.next_id,
            code: code.to_string(),
            frame,
            hit_count: 1,
            last_seen_ms: now_ms,
        };
        debug!(track_id = track.id, code = %track.code, "new track created");
        self.next_id += 1;
        self.tracks.push(track);
        self.tracks.last().expect("just pushed")
    }

    /// Remove every track idle for `timeout_ms` or longer, regardless of hit
    /// count. Returns the number removed. Driven by a periodic sweep so codes
    /// no longer visible are forgotten even when no further frames mention
    /// them.
    pub fn expire(&mut self, now_ms: u64, timeout_ms: u64) -> usize {
        let before = self.tracks.len();
        self.tracks.retain(|t| {
            let stale = now_ms.saturating_sub(t.last_seen_ms) >= timeout_ms;
            if stale {
                debug!(
                    track_id = t.id,
                    code = %t.code,
                    hit_count = t.hit_count,
                    "track expired"
                );
            }
            !stale
        });
        before - self.tracks.len()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.next_id = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32) -> Rect {
        Rect::new(x, y, 50.0, 50.0)
    }

    #[test]
    fn create_starts_at_one_hit() {
        let mut registry = TrackRegistry::new();
        let track = registry.create("ABC-001", rect(10.0, 10.0), 100);
        assert_eq!(track.hit_count, 1);
        assert_eq!(track.last_seen_ms, 100);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn match_requires_same_code_and_overlap() {
        let mut registry = TrackRegistry::new();
        registry.create("ABC-001", rect(10.0, 10.0), 0);

        // same code, heavy overlap
        assert!(registry.find_match("ABC-001", &rect(15.0, 15.0), 0.3).is_some());
        // same code, disjoint box
        assert!(registry.find_match("ABC-001", &rect(400.0, 400.0), 0.3).is_none());
        // different code, same box
        assert!(registry.find_match("XYZ-001", &rect(10.0, 10.0), 0.3).is_none());
    }

    #[test]
    fn find_match_returns_first_in_insertion_order() {
        let mut registry = TrackRegistry::new();
        let first = registry.create("ABC-001", rect(10.0, 10.0), 0).id;
        // second track of the same code, nearly the same spot; the probe box
        // overlaps it strictly better than the first
        registry.create("ABC-001", rect(20.0, 20.0), 0);

        let index = registry
            .find_match("ABC-001", &rect(20.0, 20.0), 0.3)
            .expect("both tracks overlap the probe");
        assert_eq!(registry.get(index).expect("index valid").id, first);
    }

    #[test]
    fn update_is_last_write_wins() {
        let mut registry = TrackRegistry::new();
        registry.create("ABC-001", rect(10.0, 10.0), 0);
        let track = registry.update(0, rect(14.0, 12.0), 33);
        assert_eq!(track.hit_count, 2);
        assert_eq!(track.frame, rect(14.0, 12.0));
        assert_eq!(track.last_seen_ms, 33);
    }

    #[test]
    fn expire_removes_stale_tracks_regardless_of_hits() {
        let mut registry = TrackRegistry::new();
        registry.create("ABC-001", rect(10.0, 10.0), 0);
        for _ in 0..10 {
            registry.update(0, rect(10.0, 10.0), 100);
        }
        registry.create("XYZ-002", rect(200.0, 10.0), 900);

        let removed = registry.expire(1600, 1500);
        assert_eq!(removed, 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.tracks()[0].code, "XYZ-002");
    }

    #[test]
    fn expired_code_is_scoreable_from_scratch() {
        let mut registry = TrackRegistry::new();
        registry.create("ABC-001", rect(10.0, 10.0), 0);
        registry.expire(2000, 1500);
        assert!(registry.is_empty());

        let track = registry.create("ABC-001", rect(10.0, 10.0), 2000);
        assert_eq!(track.hit_count, 1);
    }

    #[test]
    fn expire_boundary_is_inclusive() {
        let mut registry = TrackRegistry::new();
        registry.create("ABC-001", rect(10.0, 10.0), 0);
        // exactly timeout_ms idle counts as stale
        assert_eq!(registry.expire(1500, 1500), 1);
    }
}
