use crate::feature_collection::Geometry;

/// Whether a feature geometry may be handed to a renderer.
///
/// Absent geometry is invalid. Polygon and MultiPolygon rings must stay within
/// |lon| <= 180 and |lat| <= 90; other geometry types are not range-checked.
pub fn is_valid(geometry: Option<&Geometry>) -> bool {
    let Some(geometry) = geometry else {
        return false;
    };
    match geometry {
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) => geometry
            .rings()
            .all(|ring| ring.iter().all(|p| p.in_range())),
        Geometry::Other { .. } => true,
    }
}
