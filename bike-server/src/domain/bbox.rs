//! Rectangular map areas.

use crate::geo::Positioned;

/// Coordinates of a rectangular area of a map.
///
/// Containment is strict: points on the edge are outside. A box with
/// `xmin > xmax` or `ymin > ymax` contains nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl BoundingBox {
    /// The whole world.
    pub const WORLD: BoundingBox = BoundingBox {
        xmin: -180.0,
        xmax: 180.0,
        ymin: -90.0,
        ymax: 90.0,
    };

    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// Return a copy grown by `buffer` times the span of each axis on both sides.
    ///
    /// # Example
    ///
    /// ```
    /// use bike_server::domain::BoundingBox;
    ///
    /// let bbox = BoundingBox::new(0.0, 10.0, 0.0, 2.0).buffered(0.1);
    /// assert_eq!(bbox, BoundingBox::new(-1.0, 11.0, -0.2, 2.2));
    /// ```
    pub fn buffered(&self, buffer: f64) -> Self {
        let dx = buffer * (self.xmax - self.xmin);
        let dy = buffer * (self.ymax - self.ymin);
        Self {
            xmin: self.xmin - dx,
            xmax: self.xmax + dx,
            ymin: self.ymin - dy,
            ymax: self.ymax + dy,
        }
    }

    /// Return `true` if `x, y` lies strictly inside the box.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.xmin < x && x < self.xmax && self.ymin < y && y < self.ymax
    }

    /// Return `true` if `item`'s position lies strictly inside the box.
    pub fn contains_item<T: Positioned>(&self, item: &T) -> bool {
        let p = item.position();
        self.contains(p.x, p.y)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::WORLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;

    #[test]
    fn contains_interior_point() {
        let bbox = BoundingBox::new(24.84, 24.89, 60.14, 60.17);
        assert!(bbox.contains(24.86, 60.15));
        assert!(!bbox.contains(24.95, 60.15));
        assert!(!bbox.contains(24.86, 60.20));
    }

    #[test]
    fn edges_are_outside() {
        let bbox = BoundingBox::new(0.0, 1.0, 0.0, 1.0);
        assert!(!bbox.contains(0.0, 0.5));
        assert!(!bbox.contains(1.0, 0.5));
        assert!(!bbox.contains(0.5, 0.0));
        assert!(!bbox.contains(0.5, 1.0));
    }

    #[test]
    fn zero_buffer_is_identity() {
        let bbox = BoundingBox::new(-3.0, 4.0, 1.0, 9.0);
        assert_eq!(bbox.buffered(0.0), bbox);
    }

    #[test]
    fn buffer_grows_both_axes_symmetrically() {
        let bbox = BoundingBox::new(-1.0, 1.0, -2.0, 2.0).buffered(0.2);
        assert!((bbox.xmin - -1.4).abs() < 1e-12);
        assert!((bbox.xmax - 1.4).abs() < 1e-12);
        assert!((bbox.ymin - -2.8).abs() < 1e-12);
        assert!((bbox.ymax - 2.8).abs() < 1e-12);
    }

    #[test]
    fn buffered_box_admits_borderline_points() {
        let bbox = BoundingBox::new(0.0, 10.0, 0.0, 10.0);
        assert!(!bbox.contains(10.5, 5.0));
        assert!(bbox.buffered(0.1).contains(10.5, 5.0));
    }

    #[test]
    fn malformed_box_contains_nothing() {
        let bbox = BoundingBox::new(1.0, -1.0, -1.0, 1.0);
        assert!(!bbox.contains(0.0, 0.0));
        assert!(!bbox.contains(1.5, 0.0));
        assert!(!bbox.contains(-1.5, 0.0));
    }

    #[test]
    fn world_contains_ordinary_points() {
        assert!(BoundingBox::WORLD.contains(24.941, 60.169));
        assert!(BoundingBox::default().contains_item(&Coordinate::new(-74.0, 40.7)));
    }
}
