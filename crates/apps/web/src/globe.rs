use std::cell::RefCell;
use std::rc::Rc;

use formats::feature_collection::feature_to_geojson_value;
use layers::interaction::label_html;
use layers::layer::LayerKind;
use layers::symbology::LayerStyle;
use runtime::surface::{GlobeSurface, PointOfView, RenderFeature, Surface};
use serde_json::{Value, json};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::dom;
use crate::settings::GlobeViewSettings;

// Globe.gl is a chained-setter factory on the global `Globe`. Polygons carry
// `__index` and `__label` so callbacks can be answered from Rust data.
#[wasm_bindgen(inline_js = "
export function travel_map_globe_create(container, view, onClick) {
    const globe = Globe()
        .height(view.height)
        .globeImageUrl(view.imageUrl)
        .polygonsData([])
        .polygonLabel((d) => d.__label)
        .onPolygonClick((d) => onClick(d.__index));
    globe(container);
    globe.pointOfView(view.pointOfView, 0);
    return globe;
}

export function travel_map_globe_style(globe, style) {
    globe
        .backgroundColor(style.background)
        .polygonCapColor(() => style.cap)
        .polygonSideColor(() => style.side)
        .polygonStrokeColor(() => style.stroke);
}

export function travel_map_globe_polygons(globe, polygons) {
    globe.polygonsData(polygons);
}

export function travel_map_globe_pov(globe) {
    const p = globe.pointOfView();
    return [p.lat, p.lng, p.altitude];
}
")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn travel_map_globe_create(
        container: &Element,
        view: JsValue,
        on_click: &js_sys::Function,
    ) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    fn travel_map_globe_style(globe: &JsValue, style: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn travel_map_globe_polygons(globe: &JsValue, polygons: JsValue) -> Result<(), JsValue>;

    fn travel_map_globe_pov(globe: &JsValue) -> js_sys::Array;
}

/// CSS colors for the globe's accessor callbacks. Globe.gl has no stroke
/// width, so `border_weight` is not used here.
fn globe_colors(style: &LayerStyle) -> Value {
    let defaults = LayerStyle::default_for(LayerKind::CountryGlobe).globe;
    let extra = style.globe.or(defaults);
    json!({
        "background": extra.map(|g| g.background_color.to_hex()),
        "cap": style.fill_color.to_rgba_css(style.fill_opacity),
        "side": extra.map(|g| g.side_color.to_rgba_css(g.side_opacity)),
        "stroke": style.border_color.to_rgba_css(style.border_opacity),
    })
}

/// A polygon datum: the feature plus its position and tooltip.
fn polygon_datum(index: usize, feature: &RenderFeature) -> Value {
    let mut value = feature_to_geojson_value(&feature.feature);
    if let Value::Object(obj) = &mut value {
        obj.insert("__index".to_string(), json!(index));
        obj.insert(
            "__label".to_string(),
            Value::String(label_html(&feature.binding.label)),
        );
    }
    value
}

/// The 3D view: a Globe.gl instance inside the `globe` container.
pub struct GlobeGlSurface {
    globe: JsValue,
    container: Element,
    targets: Rc<RefCell<Vec<String>>>,
    _on_click: Closure<dyn FnMut(u32)>,
}

impl std::fmt::Debug for GlobeGlSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobeGlSurface")
            .field("polygons", &self.targets.borrow().len())
            .finish()
    }
}

impl GlobeGlSurface {
    pub fn mount(container: Element, view: &GlobeViewSettings) -> Result<Self, JsValue> {
        let targets: Rc<RefCell<Vec<String>>> = Rc::default();
        let on_click = {
            let targets = targets.clone();
            Closure::wrap(Box::new(move |index: u32| {
                if let Some(target) = targets.borrow().get(index as usize) {
                    dom::navigate(target);
                }
            }) as Box<dyn FnMut(u32)>)
        };
        let view = serde_json::to_value(view).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let globe = travel_map_globe_create(
            &container,
            dom::json_to_js(&view)?,
            on_click.as_ref().unchecked_ref(),
        )?;
        let mut surface = Self {
            globe,
            container,
            targets,
            _on_click: on_click,
        };
        surface.set_style(
            LayerKind::CountryGlobe,
            &LayerStyle::default_for(LayerKind::CountryGlobe),
        );
        Ok(surface)
    }
}

impl Surface for GlobeGlSurface {
    fn load(&mut self, layer: LayerKind, features: &[RenderFeature]) {
        let polygons = Value::Array(
            features
                .iter()
                .enumerate()
                .map(|(i, f)| polygon_datum(i, f))
                .collect(),
        );
        let result = dom::json_to_js(&polygons)
            .and_then(|polygons| travel_map_globe_polygons(&self.globe, polygons));
        match result {
            Ok(()) => {
                *self.targets.borrow_mut() =
                    features.iter().map(|f| f.binding.target.clone()).collect();
            }
            Err(err) => dom::log_error(&format!("{layer} layer could not be drawn: {err:?}")),
        }
    }

    fn set_style(&mut self, layer: LayerKind, style: &LayerStyle) {
        let result = dom::json_to_js(&globe_colors(style))
            .and_then(|colors| travel_map_globe_style(&self.globe, colors));
        if let Err(err) = result {
            dom::log_error(&format!("{layer} restyle failed: {err:?}"));
        }
    }

    fn set_visible(&mut self, visible: bool) {
        dom::set_active(&self.container, visible);
    }
}

impl GlobeSurface for GlobeGlSurface {
    fn point_of_view(&self) -> PointOfView {
        let values = travel_map_globe_pov(&self.globe);
        let at = |i: u32| values.get(i).as_f64();
        match (at(0), at(1), at(2)) {
            (Some(lat), Some(lng), Some(altitude)) => PointOfView { lat, lng, altitude },
            _ => PointOfView::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{globe_colors, polygon_datum};
    use formats::feature_collection::Feature;
    use layers::interaction::FeatureBinding;
    use layers::layer::LayerKind;
    use layers::symbology::LayerStyle;
    use pretty_assertions::assert_eq;
    use runtime::surface::RenderFeature;
    use serde_json::{Map, json};

    #[test]
    fn default_globe_colors() {
        let colors = globe_colors(&LayerStyle::default_for(LayerKind::CountryGlobe));
        assert_eq!(
            colors,
            json!({
                "background": "#000000",
                "cap": "rgba(145, 0, 180, 0.3)",
                "side": "rgba(0, 100, 0, 0.15)",
                "stroke": "rgba(17, 17, 17, 1)",
            })
        );
    }

    #[test]
    fn polygon_datum_carries_index_and_escaped_label() {
        let feature = RenderFeature {
            feature: Feature {
                id: None,
                properties: Map::new(),
                geometry: None,
            },
            binding: FeatureBinding {
                label: "Bosnia & Herzegovina".to_string(),
                slug: "bosnia-&-herzegovina".to_string(),
                target: "/wp/location/bosnia-&-herzegovina".to_string(),
            },
        };
        let datum = polygon_datum(4, &feature);
        assert_eq!(datum["type"], json!("Feature"));
        assert_eq!(datum["__index"], json!(4));
        assert_eq!(datum["__label"], json!("<b>Bosnia &amp; Herzegovina</b>"));
    }
}
