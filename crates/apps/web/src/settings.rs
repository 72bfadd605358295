use runtime::surface::PointOfView;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a>";
pub const NIGHT_EARTH_URL: &str = "https://unpkg.com/three-globe/example/img/earth-night.jpg";

/// Ids of the page elements the widget mounts into.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementIds {
    pub flat_map: String,
    pub globe: String,
    pub error_message: String,
    pub toggle: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            flat_map: "flat-map".to_string(),
            globe: "globe".to_string(),
            error_message: "error-message".to_string(),
            toggle: "toggle-btn".to_string(),
        }
    }
}

/// Initial view and tile source of the Leaflet map. Serialized as-is into
/// the map constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlatViewSettings {
    /// `[lat, lng]`, Leaflet order.
    pub center: [f64; 2],
    pub zoom: f64,
    pub tile_url: String,
    pub attribution: String,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for FlatViewSettings {
    fn default() -> Self {
        Self {
            center: [20.0, 0.0],
            zoom: 2.0,
            tile_url: OSM_TILE_URL.to_string(),
            attribution: OSM_ATTRIBUTION.to_string(),
            min_zoom: 2.0,
            max_zoom: 18.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobeViewSettings {
    /// Canvas height in CSS pixels.
    pub height: f64,
    pub image_url: String,
    pub point_of_view: PointOfView,
}

impl Default for GlobeViewSettings {
    fn default() -> Self {
        Self {
            height: 500.0,
            image_url: NIGHT_EARTH_URL.to_string(),
            point_of_view: PointOfView::default(),
        }
    }
}

/// Browser-only settings read from the same object as the map configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WebSettings {
    pub elements: ElementIds,
    pub flat: FlatViewSettings,
    pub globe: GlobeViewSettings,
}

impl WebSettings {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        let settings: WebSettings = serde_json::from_value(value.clone())?;
        Ok(settings.sanitized())
    }

    /// Replaces values Leaflet or Globe.gl would reject with defaults.
    fn sanitized(mut self) -> Self {
        let flat_defaults = FlatViewSettings::default();
        let flat = &mut self.flat;
        if !(flat.min_zoom.is_finite() && flat.max_zoom.is_finite() && flat.min_zoom <= flat.max_zoom)
        {
            flat.min_zoom = flat_defaults.min_zoom;
            flat.max_zoom = flat_defaults.max_zoom;
        }
        flat.zoom = if flat.zoom.is_finite() {
            flat.zoom.clamp(flat.min_zoom, flat.max_zoom)
        } else {
            flat_defaults.zoom.clamp(flat.min_zoom, flat.max_zoom)
        };
        if !flat.center.iter().all(|c| c.is_finite()) {
            flat.center = flat_defaults.center;
        }

        let globe_defaults = GlobeViewSettings::default();
        if !(self.globe.height.is_finite() && self.globe.height > 0.0) {
            self.globe.height = globe_defaults.height;
        }
        let pov = self.globe.point_of_view;
        if ![pov.lat, pov.lng, pov.altitude].iter().all(|v| v.is_finite()) || pov.altitude <= 0.0 {
            self.globe.point_of_view = globe_defaults.point_of_view;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{NIGHT_EARTH_URL, OSM_TILE_URL, WebSettings};
    use pretty_assertions::assert_eq;
    use runtime::surface::PointOfView;
    use serde_json::json;

    #[test]
    fn unrelated_keys_select_defaults() {
        let s = WebSettings::from_value(&json!({
            "baseUrl": "https://example.org",
            "displayedLocations": ["France"]
        }))
        .expect("settings");
        assert_eq!(s, WebSettings::default());
        assert_eq!(s.elements.toggle, "toggle-btn");
        assert_eq!(s.flat.center, [20.0, 0.0]);
        assert_eq!(s.flat.tile_url, OSM_TILE_URL);
        assert_eq!(s.globe.image_url, NIGHT_EARTH_URL);
        assert_eq!(s.globe.point_of_view, PointOfView::default());
    }

    #[test]
    fn overrides_are_read_in_camel_case() {
        let s = WebSettings::from_value(&json!({
            "elements": { "flatMap": "map-a", "errorMessage": "oops" },
            "flat": { "center": [48.8, 2.3], "zoom": 5, "maxZoom": 12 },
            "globe": { "height": 640, "pointOfView": { "lat": 10 } }
        }))
        .expect("settings");
        assert_eq!(s.elements.flat_map, "map-a");
        assert_eq!(s.elements.error_message, "oops");
        assert_eq!(s.elements.globe, "globe");
        assert_eq!(s.flat.center, [48.8, 2.3]);
        assert_eq!(s.flat.zoom, 5.0);
        assert_eq!(s.flat.max_zoom, 12.0);
        assert_eq!(s.globe.height, 640.0);
        assert_eq!(s.globe.point_of_view.lat, 10.0);
        assert_eq!(s.globe.point_of_view.lng, -76.0);
    }

    #[test]
    fn out_of_range_view_values_are_replaced() {
        let s = WebSettings::from_value(&json!({
            "flat": { "zoom": 40, "minZoom": 9, "maxZoom": 3 },
            "globe": { "height": -1, "pointOfView": { "altitude": 0 } }
        }))
        .expect("settings");
        assert_eq!((s.flat.min_zoom, s.flat.max_zoom), (2.0, 18.0));
        assert_eq!(s.flat.zoom, 18.0);
        assert_eq!(s.globe.height, 500.0);
        assert_eq!(s.globe.point_of_view.altitude, 2.5);
    }

    #[test]
    fn serializes_leaflet_option_names() {
        let v = serde_json::to_value(WebSettings::default().flat).expect("json");
        assert_eq!(v["tileUrl"], json!(OSM_TILE_URL));
        assert_eq!(v["minZoom"], json!(2.0));
        assert_eq!(v["center"], json!([20.0, 0.0]));

        let g = serde_json::to_value(WebSettings::default().globe).expect("json");
        assert_eq!(
            g["pointOfView"],
            json!({ "lat": 39.0, "lng": -76.0, "altitude": 2.5 })
        );
    }
}
