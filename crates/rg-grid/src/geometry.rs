//! Geometric primitives shared by grid and active-cell code.

pub use nalgebra::Point3;

/// Axis-aligned bounding box. Starts empty (invalid) and grows by `add_*`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min: Point3<f64>,
    max: Point3<f64>,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundingBox {
    /// An empty box.
    pub fn new() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Self {
        let mut bb = Self::new();
        for p in points {
            bb.add_point(p);
        }
        bb
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn add_point(&mut self, p: &Point3<f64>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    pub fn add_box(&mut self, other: &BoundingBox) {
        if other.is_valid() {
            self.add_point(&other.min);
            self.add_point(&other.max);
        }
    }

    pub fn min(&self) -> Point3<f64> {
        self.min
    }

    pub fn max(&self) -> Point3<f64> {
        self.max
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn contains(&self, p: &Point3<f64>) -> bool {
        self.is_valid()
            && (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_is_invalid() {
        let bb = BoundingBox::new();
        assert!(!bb.is_valid());
        assert!(!bb.contains(&Point3::origin()));
    }

    #[test]
    fn box_grows_with_points() {
        let pts = [Point3::new(1.0, -2.0, 3.0), Point3::new(-1.0, 4.0, 0.5)];
        let bb = BoundingBox::from_points(pts.iter());
        assert!(bb.is_valid());
        assert_eq!(bb.min(), Point3::new(-1.0, -2.0, 0.5));
        assert_eq!(bb.max(), Point3::new(1.0, 4.0, 3.0));
        assert_eq!(bb.center(), Point3::new(0.0, 1.0, 1.75));
        assert!(bb.contains(&Point3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn adding_invalid_box_is_noop() {
        let mut bb = BoundingBox::from_points([Point3::new(0.0, 0.0, 0.0)].iter());
        bb.add_box(&BoundingBox::new());
        assert_eq!(bb.min(), Point3::origin());
        assert_eq!(bb.max(), Point3::origin());
    }
}
