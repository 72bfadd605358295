use foundation::bounds::GeoBounds;
use foundation::geo::GeoPoint;
use serde_json::{Map, Value};

/// Geometry of a boundary feature.
///
/// Only the two areal shapes the map renders are decoded; every other GeoJSON
/// geometry type is carried through untouched so it can be re-encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Vec<Vec<GeoPoint>>),
    MultiPolygon(Vec<Vec<Vec<GeoPoint>>>),
    Other { kind: String, coordinates: Value },
}

impl Geometry {
    pub fn type_name(&self) -> &str {
        match self {
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::Other { kind, .. } => kind,
        }
    }

    /// Iterates every ring of a Polygon or MultiPolygon. Empty for other types.
    pub fn rings(&self) -> Box<dyn Iterator<Item = &[GeoPoint]> + '_> {
        match self {
            Geometry::Polygon(rings) => Box::new(rings.iter().map(Vec::as_slice)),
            Geometry::MultiPolygon(polys) => {
                Box::new(polys.iter().flatten().map(Vec::as_slice))
            }
            Geometry::Other { .. } => Box::new(std::iter::empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    /// `None` when the source geometry lacked a type or coordinates, or its
    /// polygon rings could not be decoded.
    pub geometry: Option<Geometry>,
}

impl Feature {
    /// String value of `field` in the properties bag.
    pub fn property_str(&self, field: &str) -> Option<&str> {
        self.properties.get(field).and_then(Value::as_str)
    }

    /// Lon/lat extent of this feature's polygon rings.
    pub fn bounds(&self) -> Option<GeoBounds> {
        let points = self
            .geometry
            .iter()
            .flat_map(|g| g.rings())
            .flat_map(|ring| ring.iter().copied());
        GeoBounds::from_points(points)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    InvalidJson(String),
    MissingFeatures,
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::InvalidJson(msg) => write!(f, "invalid GeoJSON: {msg}"),
            FormatError::MissingFeatures => write!(f, "invalid GeoJSON: no features found"),
        }
    }
}

impl std::error::Error for FormatError {}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn from_geojson_slice(payload: &[u8]) -> Result<Self, FormatError> {
        let value: Value = serde_json::from_slice(payload)
            .map_err(|e| FormatError::InvalidJson(e.to_string()))?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, FormatError> {
        Self::from_geojson_slice(payload.as_bytes())
    }

    /// Decodes a FeatureCollection.
    ///
    /// Only the `features` array is structural: a payload without one is a
    /// `FormatError`. Broken individual features are kept with an absent
    /// geometry and left for validation to reject.
    pub fn from_geojson_value(value: &Value) -> Result<Self, FormatError> {
        let features_val = value
            .get("features")
            .and_then(Value::as_array)
            .ok_or(FormatError::MissingFeatures)?;

        let features = features_val.iter().map(parse_feature).collect();
        Ok(Self { features })
    }

    /// Emits a GeoJSON FeatureCollection for hand-off to a rendering library.
    pub fn to_geojson_value(&self) -> Value {
        let mut root = Map::new();
        root.insert(
            "type".to_string(),
            Value::String("FeatureCollection".to_string()),
        );
        let features = self.features.iter().map(feature_to_geojson_value).collect();
        root.insert("features".to_string(), Value::Array(features));
        Value::Object(root)
    }

    /// Lon/lat extent of every decoded polygon ring, if any.
    pub fn bounds(&self) -> Option<GeoBounds> {
        self.features
            .iter()
            .filter_map(Feature::bounds)
            .reduce(GeoBounds::union)
    }
}

pub fn feature_to_geojson_value(feat: &Feature) -> Value {
    let mut fobj = Map::new();
    fobj.insert("type".to_string(), Value::String("Feature".to_string()));
    if let Some(id) = &feat.id {
        fobj.insert("id".to_string(), Value::String(id.clone()));
    }
    fobj.insert(
        "properties".to_string(),
        Value::Object(feat.properties.clone()),
    );
    let geometry = feat
        .geometry
        .as_ref()
        .map(geometry_to_geojson_value)
        .unwrap_or(Value::Null);
    fobj.insert("geometry".to_string(), geometry);
    Value::Object(fobj)
}

fn parse_feature(value: &Value) -> Feature {
    let id = match value.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    let properties = value
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let geometry = value.get("geometry").and_then(parse_geometry);
    Feature {
        id,
        properties,
        geometry,
    }
}

fn parse_geometry(value: &Value) -> Option<Geometry> {
    let obj = value.as_object()?;
    let ty = obj.get("type").and_then(Value::as_str)?;
    let coords = obj.get("coordinates").filter(|c| !c.is_null())?;

    match ty {
        "Polygon" => parse_polygon(coords).map(Geometry::Polygon),
        "MultiPolygon" => parse_multi_polygon(coords).map(Geometry::MultiPolygon),
        other => Some(Geometry::Other {
            kind: other.to_string(),
            coordinates: coords.clone(),
        }),
    }
}

fn parse_point(coords: &Value) -> Option<GeoPoint> {
    let arr = coords.as_array()?;
    if arr.len() < 2 {
        return None;
    }
    Some(GeoPoint::new(arr[0].as_f64()?, arr[1].as_f64()?))
}

fn parse_ring(coords: &Value) -> Option<Vec<GeoPoint>> {
    coords.as_array()?.iter().map(parse_point).collect()
}

fn parse_polygon(coords: &Value) -> Option<Vec<Vec<GeoPoint>>> {
    coords.as_array()?.iter().map(parse_ring).collect()
}

fn parse_multi_polygon(coords: &Value) -> Option<Vec<Vec<Vec<GeoPoint>>>> {
    coords.as_array()?.iter().map(parse_polygon).collect()
}

fn geometry_to_geojson_value(geom: &Geometry) -> Value {
    let mut obj = Map::new();
    obj.insert(
        "type".to_string(),
        Value::String(geom.type_name().to_string()),
    );
    let coords = match geom {
        Geometry::Polygon(rings) => rings_to_value(rings),
        Geometry::MultiPolygon(polys) => {
            Value::Array(polys.iter().map(|rings| rings_to_value(rings)).collect())
        }
        Geometry::Other { coordinates, .. } => coordinates.clone(),
    };
    obj.insert("coordinates".to_string(), coords);
    Value::Object(obj)
}

fn rings_to_value(rings: &[Vec<GeoPoint>]) -> Value {
    Value::Array(
        rings
            .iter()
            .map(|ring| Value::Array(ring.iter().map(point_coords).collect()))
            .collect(),
    )
}

fn point_coords(p: &GeoPoint) -> Value {
    Value::Array(vec![Value::from(p.lon_deg), Value::from(p.lat_deg)])
}
