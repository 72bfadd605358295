use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use layers::layer::SurfaceKind;
use runtime::config::MapConfig;
use runtime::controller::{DualViewController, ViewState};
use runtime::error_surface::ErrorSurface;
use runtime::pipeline::{LayerPass, layer_passes, prepare_layer};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;

mod dom;
mod globe;
mod leaflet;
mod settings;
mod transport;

use dom::DomErrorSurface;
use globe::GlobeGlSurface;
use leaflet::LeafletSurface;
use settings::{ElementIds, WebSettings};
use transport::GlooTransport;

/// Shown when the page did not provide a usable configuration object.
pub const CONFIG_ERROR_MESSAGE: &str =
    "Error: Map configuration not loaded. Please refresh the page.";
/// Shown when the flat map could not be created; nothing is mounted.
pub const MAP_UNAVAILABLE_MESSAGE: &str =
    "Error: The map could not be displayed. Please refresh the page.";
/// Shown when only the globe could not be created; the flat map still loads.
pub const GLOBE_UNAVAILABLE_MESSAGE: &str =
    "The 3D globe could not be displayed. The flat map is still available.";

// Guard against mounting twice on the same page (hot reload, duplicate shortcode).
static INITIALIZED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_SET: OnceLock<()> = OnceLock::new();

type Controller = DualViewController<LeafletSurface, Option<GlobeGlSurface>, DomErrorSurface>;

struct MountedMap {
    controller: Rc<RefCell<Controller>>,
    globe_ready: bool,
    toggle: Option<HtmlInputElement>,
    _on_toggle: Option<Closure<dyn FnMut(web_sys::Event)>>,
}

thread_local! {
    static STATE: RefCell<Option<MountedMap>> = const { RefCell::new(None) };
}

/// Runs `f` against the mounted map, if any.
fn with_mounted<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&MountedMap) -> R,
{
    STATE
        .try_with(|state| state.borrow().as_ref().map(f))
        .ok()
        .flatten()
}

fn init_panic_hook() {
    PANIC_HOOK_SET.get_or_init(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = info.to_string();
            web_sys::console::error_1(&JsValue::from_str(&msg));
        }));
    });
}

fn parse_settings(settings: &JsValue) -> Result<(MapConfig, WebSettings), JsValue> {
    let value = dom::js_to_json(settings)?;
    let web = WebSettings::from_value(&value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let config = MapConfig::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok((config, web))
}

/// Passes worth running for the surfaces that actually mounted.
fn passes_to_run(config: &MapConfig, globe_ready: bool) -> Vec<LayerPass> {
    layer_passes(config)
        .into_iter()
        .filter(|pass| globe_ready || pass.layer.surface() == SurfaceKind::Flat)
        .collect()
}

/// Checked means the globe is shown.
fn toggle_checked(view: ViewState) -> bool {
    view == ViewState::Globe
}

/// Mounts both views, starts the layer passes and wires the toggle.
///
/// `settings` is the page-localized configuration object. When it is missing
/// or unreadable the error region shows [`CONFIG_ERROR_MESSAGE`] and nothing
/// else is mounted. A globe that fails to mount is reported and the flat map
/// keeps working on its own.
#[wasm_bindgen]
pub fn mount_travel_map(settings: JsValue) -> Result<(), JsValue> {
    init_panic_hook();
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Err(JsValue::from_str("travel map is already mounted"));
    }

    let (config, web) = match parse_settings(&settings) {
        Ok(parsed) => parsed,
        Err(err) => {
            INITIALIZED.store(false, Ordering::SeqCst);
            dom::log_error(&format!("map configuration rejected: {err:?}"));
            DomErrorSurface::new(&ElementIds::default().error_message)
                .report(CONFIG_ERROR_MESSAGE);
            return Err(err);
        }
    };

    let mounted = mount(config, &web).inspect_err(|_| INITIALIZED.store(false, Ordering::SeqCst))?;
    STATE.with(|state| *state.borrow_mut() = Some(mounted));
    Ok(())
}

fn mount(config: MapConfig, web: &WebSettings) -> Result<MountedMap, JsValue> {
    let mut errors = DomErrorSurface::new(&web.elements.error_message);

    let flat = match dom::element_by_id(&web.elements.flat_map)
        .and_then(|container| LeafletSurface::mount(container, &web.flat))
    {
        Ok(flat) => flat,
        Err(err) => {
            dom::log_error(&format!("flat map unavailable: {err:?}"));
            errors.report(MAP_UNAVAILABLE_MESSAGE);
            return Err(err);
        }
    };

    let globe = match dom::element_by_id(&web.elements.globe)
        .and_then(|container| GlobeGlSurface::mount(container, &web.globe))
    {
        Ok(globe) => Some(globe),
        Err(err) => {
            dom::log_error(&format!("globe unavailable: {err:?}"));
            errors.report(GLOBE_UNAVAILABLE_MESSAGE);
            None
        }
    };
    let globe_ready = globe.is_some();
    let controller = Rc::new(RefCell::new(DualViewController::new(flat, globe, errors)));

    let (toggle, on_toggle) = if globe_ready {
        match wire_toggle(&web.elements.toggle, &controller) {
            Ok((input, closure)) => (Some(input), Some(closure)),
            Err(err) => {
                dom::log_error(&format!("view toggle unavailable: {err:?}"));
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    let config = Rc::new(config);
    for pass in passes_to_run(&config, globe_ready) {
        let controller = controller.clone();
        let config = config.clone();
        spawn_local(async move {
            let outcome = prepare_layer(&GlooTransport, &pass, &config).await;
            if let Some(err) = outcome.as_ref().err().filter(|e| !e.is_no_matches()) {
                dom::log_error(&format!(
                    "{} layer ({}): {err}",
                    pass.layer, pass.dataset.url
                ));
            }
            controller.borrow_mut().apply(pass.layer, outcome);
        });
    }

    Ok(MountedMap {
        controller,
        globe_ready,
        toggle,
        _on_toggle: on_toggle,
    })
}

type ToggleHandler = Closure<dyn FnMut(web_sys::Event)>;

fn wire_toggle(
    id: &str,
    controller: &Rc<RefCell<Controller>>,
) -> Result<(HtmlInputElement, ToggleHandler), JsValue> {
    let input = dom::element_by_id(id)?
        .dyn_into::<HtmlInputElement>()
        .map_err(|_| JsValue::from_str(&format!("#{id} is not an input")))?;

    // Browsers may restore the checkbox state on back navigation.
    controller.borrow_mut().set_globe_active(input.checked());

    let closure = {
        let input = input.clone();
        let controller = controller.clone();
        Closure::wrap(Box::new(move |_e: web_sys::Event| {
            controller.borrow_mut().set_globe_active(input.checked());
        }) as Box<dyn FnMut(web_sys::Event)>)
    };
    input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())?;
    Ok((input, closure))
}

/// Switches views programmatically and keeps the toggle checkbox in step.
/// Returns whether the view changed. The globe cannot be selected if it
/// failed to mount.
#[wasm_bindgen]
pub fn toggle_view(globe: bool) -> Result<bool, JsValue> {
    with_mounted(|mounted| {
        let mut controller = mounted.controller.borrow_mut();
        let changed = controller.set_globe_active(globe && mounted.globe_ready);
        if let Some(input) = &mounted.toggle {
            input.set_checked(toggle_checked(controller.active()));
        }
        changed
    })
    .ok_or_else(|| JsValue::from_str("travel map is not mounted"))
}

/// `"flat"` or `"globe"`; empty before mounting.
#[wasm_bindgen]
pub fn active_view() -> String {
    with_mounted(|mounted| mounted.controller.borrow().active().as_str().to_string())
        .unwrap_or_default()
}
