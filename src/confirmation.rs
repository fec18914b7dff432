// src/confirmation.rs

use crate::tracker::Track;

/// Whether a track has produced a trustworthy read.
///
/// Confirmation is a derived predicate, never a stored flag: callers must
/// re-check it every time a track is touched, not just at creation. The
/// threshold is clamped to at least 1, so a first sighting always confirms
/// at the floor setting.
pub fn is_confirmed(track: &Track, threshold: u32) -> bool {
    track.hit_count >= threshold.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn track(hit_count: u32) -> Track {
        Track {
            id: 1,
            code: "ABC-001".to_string(),
            frame: Rect::new(0.0, 0.0, 50.0, 50.0),
            hit_count,
            last_seen_ms: 0,
        }
    }

    #[test]
    fn confirms_exactly_at_threshold() {
        assert!(!is_confirmed(&track(1), 3));
        assert!(!is_confirmed(&track(2), 3));
        assert!(is_confirmed(&track(3), 3));
        assert!(is_confirmed(&track(4), 3));
    }

    #[test]
    fn threshold_one_confirms_first_sighting() {
        assert!(is_confirmed(&track(1), 1));
    }

    #[test]
    fn zero_threshold_clamps_to_one() {
        assert!(is_confirmed(&track(1), 0));
    }
}
