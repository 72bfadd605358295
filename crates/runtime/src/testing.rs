//! Fixtures and recording surfaces shared by this crate's tests.

use std::collections::BTreeMap;

use foundation::geo::GeoPoint;
use layers::filter::AllowList;
use layers::layer::LayerKind;
use layers::symbology::LayerStyle;
use serde_json::json;

use crate::config::{DatasetEndpoints, MapConfig};
use crate::surface::{
    FlatCamera, FlatSurface, GlobeSurface, PointOfView, RenderFeature, Surface,
};

pub const COUNTRIES_URL: &str = "mem://countries";
pub const STATES_URL: &str = "mem://states";

pub fn config(allow: &[&str]) -> MapConfig {
    MapConfig {
        base_url: "https://example.org".to_string(),
        allow_list: AllowList::new(allow.iter().copied()),
        datasets: DatasetEndpoints {
            countries: Some(COUNTRIES_URL.to_string()),
            us_states: Some(STATES_URL.to_string()),
        },
        ..MapConfig::default()
    }
}

fn square(lon: f64, lat: f64) -> serde_json::Value {
    json!([[[lon, lat], [lon + 1.0, lat], [lon + 1.0, lat + 1.0], [lon, lat]]])
}

pub fn countries_body() -> String {
    json!({
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": { "name": "France" },
              "geometry": { "type": "Polygon", "coordinates": square(2.0, 46.0) } },
            { "type": "Feature", "properties": { "name": "Germany" },
              "geometry": { "type": "Polygon", "coordinates": square(10.0, 51.0) } }
        ]
    })
    .to_string()
}

pub fn states_body() -> String {
    json!({
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": { "NAME": "Texas" },
              "geometry": { "type": "Polygon", "coordinates": square(-100.0, 30.0) } },
            { "type": "Feature", "properties": { "NAME": "New York" },
              "geometry": { "type": "Polygon", "coordinates": square(-75.0, 42.0) } }
        ]
    })
    .to_string()
}

#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub visible: bool,
    pub visibility_calls: usize,
    /// Navigation targets of the loaded features, per layer.
    pub targets: BTreeMap<LayerKind, Vec<String>>,
    pub styles: BTreeMap<LayerKind, LayerStyle>,
}

impl SurfaceLog {
    fn load(&mut self, layer: LayerKind, features: &[RenderFeature]) {
        let targets = features.iter().map(|f| f.binding.target.clone()).collect();
        self.targets.insert(layer, targets);
    }
}

#[derive(Debug, Default)]
pub struct RecordingFlat {
    pub log: SurfaceLog,
    pub invalidations: usize,
    pub camera: FlatCamera,
}

impl RecordingFlat {
    /// Stands in for a user drag/zoom gesture.
    pub fn pan_to(&mut self, lon: f64, lat: f64, zoom: f64) {
        self.camera = FlatCamera {
            center: GeoPoint::new(lon, lat),
            zoom,
        };
    }
}

impl Surface for RecordingFlat {
    fn load(&mut self, layer: LayerKind, features: &[RenderFeature]) {
        self.log.load(layer, features);
    }

    fn set_style(&mut self, layer: LayerKind, style: &LayerStyle) {
        self.log.styles.insert(layer, *style);
    }

    fn set_visible(&mut self, visible: bool) {
        self.log.visible = visible;
        self.log.visibility_calls += 1;
    }
}

impl FlatSurface for RecordingFlat {
    fn invalidate_size(&mut self) {
        self.invalidations += 1;
    }

    fn camera(&self) -> FlatCamera {
        self.camera
    }
}

#[derive(Debug, Default)]
pub struct RecordingGlobe {
    pub log: SurfaceLog,
    pub pov: PointOfView,
}

impl Surface for RecordingGlobe {
    fn load(&mut self, layer: LayerKind, features: &[RenderFeature]) {
        self.log.load(layer, features);
    }

    fn set_style(&mut self, layer: LayerKind, style: &LayerStyle) {
        self.log.styles.insert(layer, *style);
    }

    fn set_visible(&mut self, visible: bool) {
        self.log.visible = visible;
        self.log.visibility_calls += 1;
    }
}

impl GlobeSurface for RecordingGlobe {
    fn point_of_view(&self) -> PointOfView {
        self.pov
    }
}
