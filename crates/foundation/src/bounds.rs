use crate::geo::GeoPoint;

/// Axis-aligned lon/lat bounding box in degrees.
///
/// `min` is the south-west corner, `max` the north-east corner. Boxes never
/// wrap the antimeridian.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBounds {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl GeoBounds {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        GeoBounds { min, max }
    }

    pub fn from_point(p: GeoPoint) -> Self {
        GeoBounds {
            min: [p.lon_deg, p.lat_deg],
            max: [p.lon_deg, p.lat_deg],
        }
    }

    /// Bounds of all points, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = GeoPoint>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut out = Self::from_point(first);
        for p in iter {
            out.extend(p);
        }
        Some(out)
    }

    pub fn extend(&mut self, p: GeoPoint) {
        self.min[0] = self.min[0].min(p.lon_deg);
        self.min[1] = self.min[1].min(p.lat_deg);
        self.max[0] = self.max[0].max(p.lon_deg);
        self.max[1] = self.max[1].max(p.lat_deg);
    }

    pub fn union(self, other: GeoBounds) -> GeoBounds {
        GeoBounds {
            min: [self.min[0].min(other.min[0]), self.min[1].min(other.min[1])],
            max: [self.max[0].max(other.max[0]), self.max[1].max(other.max[1])],
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            0.5 * (self.min[0] + self.max[0]),
            0.5 * (self.min[1] + self.max[1]),
        )
    }
}
