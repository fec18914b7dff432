// src/regions.rs
//
// Stable spatial grouping of the confirmed set into rows of `group_size`
// for display and ordering. Recomputed from scratch on every change; the
// confirmed set is bounded by realistic scan volume, so the full re-sort is
// cheap. Would need revisiting for large-N deployments.

use crate::types::{ConfirmedDetection, RegionConfig};

/// Pure transform: returns a new sequence ordered top-to-bottom, then
/// left-to-right within a row band, with `region_index` / `index_in_region`
/// filled in.
///
/// Row banding is done in two passes so the sort key is a total order: sort
/// by vertical center, walk the result opening a new row whenever the gap to
/// the previous center reaches `row_epsilon_px`, then sort by
/// `(row, horizontal center)`. Neighbors closer than the epsilon chain into
/// the same row. Deterministic for a fixed input.
pub fn assign_regions(markers: &[ConfirmedDetection], config: &RegionConfig) -> Vec<ConfirmedDetection> {
    let mut sorted: Vec<ConfirmedDetection> = markers.to_vec();
    let epsilon = config.row_epsilon_px;

    sorted.sort_by(|a, b| a.frame.center().1.total_cmp(&b.frame.center().1));

    let mut row_ids: Vec<usize> = Vec::with_capacity(sorted.len());
    let mut current_row = 0usize;
    let mut prev_y = f32::NEG_INFINITY;
    for (index, marker) in sorted.iter().enumerate() {
        let (_, cy) = marker.frame.center();
        if index > 0 && cy - prev_y >= epsilon {
            current_row += 1;
        }
        row_ids.push(current_row);
        prev_y = cy;
    }

    let mut keyed: Vec<(usize, ConfirmedDetection)> = row_ids.into_iter().zip(sorted).collect();
    keyed.sort_by(|(row_a, a), (row_b, b)| {
        row_a
            .cmp(row_b)
            .then(a.frame.center().0.total_cmp(&b.frame.center().0))
    });

    let group_size = config.group_size.max(1);
    keyed
        .into_iter()
        .enumerate()
        .map(|(index, (_, mut marker))| {
            marker.region_index = Some(index / group_size);
            marker.index_in_region = Some(index % group_size);
            marker
        })
        .collect()
}
