use formats::feature_collection::Feature;
use foundation::geo::GeoPoint;
use layers::interaction::FeatureBinding;
use layers::layer::LayerKind;
use layers::symbology::LayerStyle;
use serde::{Deserialize, Serialize};

/// A filtered feature paired with its label and navigation target.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFeature {
    pub feature: Feature,
    pub binding: FeatureBinding,
}

/// Contract shared by both renderable views.
///
/// `load` replaces whatever was previously loaded for `layer`, so applying the
/// same pass twice leaves the surface unchanged.
pub trait Surface {
    fn load(&mut self, layer: LayerKind, features: &[RenderFeature]);
    fn set_style(&mut self, layer: LayerKind, style: &LayerStyle);
    fn set_visible(&mut self, visible: bool);
}

/// Pan/zoom state of the flat map.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlatCamera {
    pub center: GeoPoint,
    pub zoom: f64,
}

impl Default for FlatCamera {
    fn default() -> Self {
        Self {
            center: GeoPoint::new(0.0, 20.0),
            zoom: 2.0,
        }
    }
}

/// The projected 2D map. Hover popups live entirely inside the adapter.
pub trait FlatSurface: Surface {
    /// Recomputes layout after the container was hidden.
    fn invalidate_size(&mut self);
    fn camera(&self) -> FlatCamera;
}

/// Camera of the globe, in Globe.gl's terms.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointOfView {
    pub lat: f64,
    pub lng: f64,
    /// Distance from the surface in globe radii.
    pub altitude: f64,
}

impl Default for PointOfView {
    fn default() -> Self {
        Self {
            lat: 39.0,
            lng: -76.0,
            altitude: 2.5,
        }
    }
}

pub trait GlobeSurface: Surface {
    fn point_of_view(&self) -> PointOfView;
}

// A surface that failed to mount. Loads and visibility changes are dropped so
// the other surface keeps working.
impl<S: Surface> Surface for Option<S> {
    fn load(&mut self, layer: LayerKind, features: &[RenderFeature]) {
        if let Some(s) = self {
            s.load(layer, features);
        }
    }

    fn set_style(&mut self, layer: LayerKind, style: &LayerStyle) {
        if let Some(s) = self {
            s.set_style(layer, style);
        }
    }

    fn set_visible(&mut self, visible: bool) {
        if let Some(s) = self {
            s.set_visible(visible);
        }
    }
}

impl<S: GlobeSurface> GlobeSurface for Option<S> {
    fn point_of_view(&self) -> PointOfView {
        self.as_ref()
            .map(|s| s.point_of_view())
            .unwrap_or_default()
    }
}
