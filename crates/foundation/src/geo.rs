/// Largest longitude magnitude accepted for a boundary coordinate (degrees).
pub const MAX_ABS_LON_DEG: f64 = 180.0;
/// Largest latitude magnitude accepted for a boundary coordinate (degrees).
pub const MAX_ABS_LAT_DEG: f64 = 90.0;

/// A WGS84 longitude/latitude pair in degrees, GeoJSON axis order.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeoPoint {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    /// `true` when neither axis exceeds its magnitude limit.
    ///
    /// Values exactly on the limit (e.g. lon = -180) are in range.
    pub fn in_range(&self) -> bool {
        self.lon_deg.abs() <= MAX_ABS_LON_DEG && self.lat_deg.abs() <= MAX_ABS_LAT_DEG
    }
}
