// src/validator.rs
//
// Classifies one raw per-frame detection as acceptable or rejected.
// Rejections are expected high-frequency filtering, not errors; nothing
// here logs or mutates.

use crate::geometry::Rect;
use crate::types::{ValidatorConfig, Viewport};

/// Pure acceptance predicate for a detection's bounding geometry.
///
/// Checks short-circuit cheapest-first: center inside the ROI, then area
/// ratio, then aspect ratio. A detection whose center falls outside the
/// region of interest is ignored entirely, even if its value is valid.
pub fn is_acceptable(frame: &Rect, viewport: &Viewport, config: &ValidatorConfig) -> bool {
    if !frame.is_valid() {
        return false;
    }

    let (cx, cy) = frame.center();
    if !viewport.roi.contains(cx, cy) {
        return false;
    }

    let frame_area = viewport.frame_width * viewport.frame_height;
    if frame_area <= 0.0 {
        return false;
    }
    if frame.area() / frame_area < config.min_area_ratio {
        return false;
    }

    let aspect = frame.width / frame.height;
    aspect >= config.min_aspect_ratio && aspect <= config.max_aspect_ratio
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Roi;

    fn viewport() -> Viewport {
        Viewport {
            frame_width: 640.0,
            frame_height: 480.0,
            roi: Roi::new(100.0, 100.0, 200.0, 200.0),
        }
    }

    #[test]
    fn accepts_well_formed_detection() {
        // center (175, 175) inside ROI, area ratio ~0.008, aspect 1.0
        let frame = Rect::new(150.0, 150.0, 50.0, 50.0);
        assert!(is_acceptable(&frame, &viewport(), &ValidatorConfig::default()));
    }

    #[test]
    fn rejects_center_outside_roi() {
        let frame = Rect::new(400.0, 150.0, 50.0, 50.0);
        assert!(!is_acceptable(&frame, &viewport(), &ValidatorConfig::default()));
    }

    #[test]
    fn center_on_roi_edge_is_accepted() {
        // center lands exactly on the ROI's left edge at (100, 175)
        let frame = Rect::new(75.0, 150.0, 50.0, 50.0);
        assert!(is_acceptable(&frame, &viewport(), &ValidatorConfig::default()));
    }

    #[test]
    fn rejects_speck_below_area_ratio() {
        let frame = Rect::new(174.0, 174.0, 2.0, 2.0);
        assert!(!is_acceptable(&frame, &viewport(), &ValidatorConfig::default()));
    }

    #[test]
    fn rejects_degenerate_sliver() {
        let frame = Rect::new(150.0, 170.0, 120.0, 10.0);
        assert!(!is_acceptable(&frame, &viewport(), &ValidatorConfig::default()));
    }

    #[test]
    fn rejects_invalid_geometry() {
        let frame = Rect::new(150.0, 150.0, -50.0, 50.0);
        assert!(!is_acceptable(&frame, &viewport(), &ValidatorConfig::default()));
    }
}
