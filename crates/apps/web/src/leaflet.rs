use std::cell::{OnceCell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use foundation::geo::GeoPoint;
use formats::feature_collection::feature_to_geojson_value;
use layers::interaction::{HOVER_OPEN_DELAY, HoverDebounce, escape_html};
use layers::layer::LayerKind;
use layers::symbology::LayerStyle;
use runtime::surface::{FlatCamera, FlatSurface, RenderFeature, Surface};
use serde_json::{Value, json};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::dom;
use crate::settings::FlatViewSettings;

// Thin glue over the global `L` namespace. Each feature keeps its index so
// Rust can address individual shapes for popups and clicks.
#[wasm_bindgen(inline_js = "
export function travel_map_leaflet_create(container, view) {
    const map = L.map(container).setView(view.center, view.zoom);
    L.tileLayer(view.tileUrl, {
        attribution: view.attribution,
        minZoom: view.minZoom,
        maxZoom: view.maxZoom,
    }).addTo(map);
    return map;
}

export function travel_map_leaflet_invalidate(map) {
    map.invalidateSize();
}

export function travel_map_leaflet_camera(map) {
    const c = map.getCenter();
    return [c.lng, c.lat, map.getZoom()];
}

export function travel_map_leaflet_add(map, collection, style, popups, onEnter, onExit, onClick) {
    const shapes = [];
    const layer = L.geoJSON(collection, {
        style: style,
        onEachFeature: (feature, shape) => {
            const index = collection.features.indexOf(feature);
            shapes[index] = shape;
            shape.bindPopup(popups[index], { closeButton: false, autoPan: false });
            shape.on('mouseover', () => onEnter(index));
            shape.on('mouseout', () => onExit(index));
            shape.on('click', () => onClick(index));
        },
    }).addTo(map);
    layer.__travelMapShapes = shapes;
    return layer;
}

export function travel_map_leaflet_remove(map, layer) {
    map.removeLayer(layer);
}

export function travel_map_leaflet_set_style(layer, style) {
    layer.setStyle(style);
}

export function travel_map_leaflet_open_popup(layer, index) {
    const shape = layer.__travelMapShapes[index];
    if (shape && shape._map) shape.openPopup();
}

export function travel_map_leaflet_close_popup(layer, index) {
    const shape = layer.__travelMapShapes[index];
    if (shape) shape.closePopup();
}
")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn travel_map_leaflet_create(container: &Element, view: JsValue) -> Result<JsValue, JsValue>;

    fn travel_map_leaflet_invalidate(map: &JsValue);

    fn travel_map_leaflet_camera(map: &JsValue) -> js_sys::Array;

    #[wasm_bindgen(catch)]
    fn travel_map_leaflet_add(
        map: &JsValue,
        collection: JsValue,
        style: JsValue,
        popups: js_sys::Array,
        on_enter: &js_sys::Function,
        on_exit: &js_sys::Function,
        on_click: &js_sys::Function,
    ) -> Result<JsValue, JsValue>;

    fn travel_map_leaflet_remove(map: &JsValue, layer: &JsValue);

    #[wasm_bindgen(catch)]
    fn travel_map_leaflet_set_style(layer: &JsValue, style: JsValue) -> Result<(), JsValue>;

    fn travel_map_leaflet_open_popup(layer: &JsValue, index: u32);

    fn travel_map_leaflet_close_popup(layer: &JsValue, index: u32);
}

/// Leaflet path options for a resolved style.
fn path_options(style: &LayerStyle) -> Value {
    json!({
        "fillColor": style.fill_color.to_hex(),
        "fillOpacity": style.fill_opacity,
        "color": style.border_color.to_hex(),
        "opacity": style.border_opacity,
        "weight": style.border_weight,
    })
}

/// One `L.geoJSON` layer and the Rust callbacks it holds.
struct MountedLayer {
    handle: JsValue,
    _on_enter: Closure<dyn FnMut(u32)>,
    _on_exit: Closure<dyn FnMut(u32)>,
    _on_click: Closure<dyn FnMut(u32)>,
}

/// The flat map: a Leaflet map inside the `flat-map` container.
pub struct LeafletSurface {
    map: JsValue,
    container: Element,
    mounted: BTreeMap<LayerKind, MountedLayer>,
    styles: BTreeMap<LayerKind, LayerStyle>,
}

impl std::fmt::Debug for LeafletSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeafletSurface")
            .field("layers", &self.mounted.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl LeafletSurface {
    pub fn mount(container: Element, view: &FlatViewSettings) -> Result<Self, JsValue> {
        let view = serde_json::to_value(view).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let map = travel_map_leaflet_create(&container, dom::json_to_js(&view)?)?;
        Ok(Self {
            map,
            container,
            mounted: BTreeMap::new(),
            styles: BTreeMap::new(),
        })
    }

    fn style_for(&self, layer: LayerKind) -> LayerStyle {
        self.styles
            .get(&layer)
            .copied()
            .unwrap_or_else(|| LayerStyle::default_for(layer))
    }

    fn mount_layer(
        &self,
        layer: LayerKind,
        features: &[RenderFeature],
    ) -> Result<MountedLayer, JsValue> {
        let collection = json!({
            "type": "FeatureCollection",
            "features": features
                .iter()
                .map(|f| feature_to_geojson_value(&f.feature))
                .collect::<Vec<_>>(),
        });
        let popups: js_sys::Array = features
            .iter()
            .map(|f| JsValue::from_str(&escape_html(&f.binding.label)))
            .collect();
        let targets: Rc<Vec<String>> =
            Rc::new(features.iter().map(|f| f.binding.target.clone()).collect());

        // The handle only exists once Leaflet has built the layer, after the
        // callbacks were handed over.
        let shapes: Rc<OnceCell<JsValue>> = Rc::new(OnceCell::new());
        let hover = Rc::new(RefCell::new(HoverDebounce::new()));

        let on_enter = {
            let shapes = shapes.clone();
            let hover = hover.clone();
            Closure::wrap(Box::new(move |index: u32| {
                let (close, ticket) = hover.borrow_mut().pointer_enter(index as usize);
                if let (Some(open), Some(handle)) = (close, shapes.get()) {
                    travel_map_leaflet_close_popup(handle, open as u32);
                }
                let fire = {
                    let shapes = shapes.clone();
                    let hover = hover.clone();
                    Closure::once_into_js(move || {
                        let opened = hover.borrow_mut().fire(ticket);
                        if let (Some(index), Some(handle)) = (opened, shapes.get()) {
                            travel_map_leaflet_open_popup(handle, index as u32);
                        }
                    })
                };
                let delay_ms = HOVER_OPEN_DELAY.as_millis() as i32;
                if let Err(err) = dom::set_timeout(fire.unchecked_ref(), delay_ms) {
                    dom::log_error(&format!("hover timer failed: {err:?}"));
                }
            }) as Box<dyn FnMut(u32)>)
        };

        let on_exit = {
            let shapes = shapes.clone();
            let hover = hover.clone();
            Closure::wrap(Box::new(move |_index: u32| {
                let close = hover.borrow_mut().pointer_exit();
                if let (Some(open), Some(handle)) = (close, shapes.get()) {
                    travel_map_leaflet_close_popup(handle, open as u32);
                }
            }) as Box<dyn FnMut(u32)>)
        };

        let on_click = Closure::wrap(Box::new(move |index: u32| {
            if let Some(target) = targets.get(index as usize) {
                dom::navigate(target);
            }
        }) as Box<dyn FnMut(u32)>);

        let handle = travel_map_leaflet_add(
            &self.map,
            dom::json_to_js(&collection)?,
            dom::json_to_js(&path_options(&self.style_for(layer)))?,
            popups,
            on_enter.as_ref().unchecked_ref(),
            on_exit.as_ref().unchecked_ref(),
            on_click.as_ref().unchecked_ref(),
        )?;
        let _ = shapes.set(handle.clone());

        Ok(MountedLayer {
            handle,
            _on_enter: on_enter,
            _on_exit: on_exit,
            _on_click: on_click,
        })
    }
}

impl Surface for LeafletSurface {
    fn load(&mut self, layer: LayerKind, features: &[RenderFeature]) {
        if let Some(previous) = self.mounted.remove(&layer) {
            travel_map_leaflet_remove(&self.map, &previous.handle);
        }
        match self.mount_layer(layer, features) {
            Ok(mounted) => {
                self.mounted.insert(layer, mounted);
            }
            Err(err) => dom::log_error(&format!("{layer} layer could not be drawn: {err:?}")),
        }
    }

    fn set_style(&mut self, layer: LayerKind, style: &LayerStyle) {
        self.styles.insert(layer, *style);
        let Some(mounted) = self.mounted.get(&layer) else {
            return;
        };
        let result = dom::json_to_js(&path_options(style))
            .and_then(|options| travel_map_leaflet_set_style(&mounted.handle, options));
        if let Err(err) = result {
            dom::log_error(&format!("{layer} restyle failed: {err:?}"));
        }
    }

    fn set_visible(&mut self, visible: bool) {
        dom::set_active(&self.container, visible);
    }
}

impl FlatSurface for LeafletSurface {
    fn invalidate_size(&mut self) {
        travel_map_leaflet_invalidate(&self.map);
    }

    fn camera(&self) -> FlatCamera {
        let values = travel_map_leaflet_camera(&self.map);
        let at = |i: u32| values.get(i).as_f64();
        match (at(0), at(1), at(2)) {
            (Some(lng), Some(lat), Some(zoom)) => FlatCamera {
                center: GeoPoint::new(lng, lat),
                zoom,
            },
            _ => FlatCamera::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::path_options;
    use layers::layer::LayerKind;
    use layers::symbology::LayerStyle;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn default_country_style_matches_leaflet_options() {
        let options = path_options(&LayerStyle::default_for(LayerKind::CountryFlat));
        assert_eq!(
            options,
            json!({
                "fillColor": "#9000b4",
                "fillOpacity": 0.3,
                "color": "#ffffff",
                "opacity": 1.0,
                "weight": 2.0,
            })
        );
    }
}
