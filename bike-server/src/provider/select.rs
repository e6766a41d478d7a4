//! Spatial selection over cached station lists.
//!
//! A query asks for the stations in a bounding box but never wants more than
//! a fixed number of them. Selection first tries generous buffers around the
//! box so stations just off-screen are included, shrinking the buffer while
//! the result is still too large. Whatever remains is ordered by station key
//! and truncated, so the same set of station ids always yields the same
//! subset in the same order.

use crate::domain::{BoundingBox, Station};
use crate::geo::Coordinate;

/// Select at most `max_count` stations inside `bbox`.
///
/// `buffers` are tried in order; filtering stops at the first buffer whose
/// box holds no more than `max_count` stations. An empty `buffers` slice
/// filters by the unbuffered box.
pub fn select_stations(
    stations: &[Station],
    bbox: &BoundingBox,
    buffers: &[f64],
    max_count: usize,
) -> Vec<Station> {
    let buffers = if buffers.is_empty() { &[0.0][..] } else { buffers };
    let mut candidates: Vec<&Station> = stations.iter().collect();

    for &buffer in buffers {
        let buffered = bbox.buffered(buffer);
        candidates.retain(|s| buffered.contains_item(*s));
        if candidates.len() <= max_count {
            break;
        }
    }

    candidates.sort_by(|a, b| a.key.cmp(&b.key));
    candidates.into_iter().take(max_count).cloned().collect()
}

/// Count stations strictly inside `bbox`.
pub fn count_within(stations: &[Station], bbox: &BoundingBox) -> usize {
    stations.iter().filter(|s| bbox.contains_item(*s)).count()
}

/// Arithmetic mean of station coordinates, or `None` for no stations.
pub fn center(stations: &[Station]) -> Option<Coordinate> {
    if stations.is_empty() {
        return None;
    }

    let n = stations.len() as f64;
    let (sum_x, sum_y) = stations
        .iter()
        .fold((0.0, 0.0), |(x, y), s| (x + s.x, y + s.y));

    Some(Coordinate::new(sum_x / n, sum_y / n))
}
