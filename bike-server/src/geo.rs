//! Great-circle distance and distance ordering.
//!
//! Coordinates follow the map convention used throughout the crate:
//! `x` is longitude and `y` is latitude, both in degrees.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Longitude in degrees.
    pub x: f64,
    /// Latitude in degrees.
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Anything with a map position.
pub trait Positioned {
    fn position(&self) -> Coordinate;
}

impl Positioned for Coordinate {
    fn position(&self) -> Coordinate {
        *self
    }
}

/// Great-circle distance between two points in meters (haversine formula).
///
/// # Example
///
/// ```
/// use bike_server::geo::{Coordinate, haversine_distance};
///
/// // One degree of latitude is roughly 111 km.
/// let d = haversine_distance(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
/// assert!((d - 111_195.0).abs() < 100.0);
/// ```
pub fn haversine_distance(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.y.to_radians();
    let lat2 = to.y.to_radians();
    let delta_lat = (to.y - from.y).to_radians();
    let delta_lon = (to.x - from.x).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Sort items by ascending distance from `origin`.
///
/// The sort is stable: items at equal distance keep their relative order.
pub fn sort_by_distance<T: Positioned>(items: Vec<T>, origin: Coordinate) -> Vec<T> {
    let mut keyed: Vec<(f64, T)> = items
        .into_iter()
        .map(|item| (haversine_distance(origin, item.position()), item))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| a.total_cmp(b));
    keyed.into_iter().map(|(_, item)| item).collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-180.0f64..180.0, -90.0f64..90.0).prop_map(|(x, y)| Coordinate::new(x, y))
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(a in coordinate(), b in coordinate()) {
            let ab = haversine_distance(a, b);
            let ba = haversine_distance(b, a);
            prop_assert!((ab - ba).abs() < 1e-6);
        }

        #[test]
        fn distance_is_bounded(a in coordinate(), b in coordinate()) {
            let d = haversine_distance(a, b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_M + 1.0);
        }

        #[test]
        fn sorted_output_is_non_decreasing(
            points in prop::collection::vec(coordinate(), 0..30),
            origin in coordinate(),
        ) {
            let n = points.len();
            let sorted = sort_by_distance(points, origin);
            prop_assert_eq!(sorted.len(), n);

            for pair in sorted.windows(2) {
                prop_assert!(
                    haversine_distance(origin, pair[0]) <= haversine_distance(origin, pair[1])
                );
            }
        }
    }
}
