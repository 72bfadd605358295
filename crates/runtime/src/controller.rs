use layers::layer::{LayerKind, SurfaceKind};
use tracing::{debug, warn};

use crate::error_surface::ErrorSurface;
use crate::pipeline::{PassError, PreparedLayer};
use crate::surface::{FlatSurface, GlobeSurface, Surface};

/// Which surface is currently shown. Exactly one is active.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ViewState {
    #[default]
    Flat,
    Globe,
}

impl ViewState {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewState::Flat => "flat",
            ViewState::Globe => "globe",
        }
    }
}

/// Owns both surfaces and the error region, routes pass outcomes to them and
/// switches which surface is visible.
///
/// Camera state stays inside each surface; nothing here reads or writes it.
#[derive(Debug)]
pub struct DualViewController<F, G, E> {
    flat: F,
    globe: G,
    errors: E,
    active: ViewState,
}

impl<F, G, E> DualViewController<F, G, E>
where
    F: FlatSurface,
    G: GlobeSurface,
    E: ErrorSurface,
{
    /// Starts with the flat map active.
    pub fn new(mut flat: F, mut globe: G, errors: E) -> Self {
        flat.set_visible(true);
        globe.set_visible(false);
        Self {
            flat,
            globe,
            errors,
            active: ViewState::Flat,
        }
    }

    pub fn active(&self) -> ViewState {
        self.active
    }

    /// Handles the toggle signal.
    ///
    /// Returning to the flat map forces it to recompute its size, since its
    /// container may have been resized while hidden. A signal matching the
    /// current state does nothing. Returns whether the view changed.
    pub fn set_globe_active(&mut self, globe: bool) -> bool {
        let target = if globe { ViewState::Globe } else { ViewState::Flat };
        if target == self.active {
            return false;
        }
        match target {
            ViewState::Globe => {
                self.flat.set_visible(false);
                self.globe.set_visible(true);
            }
            ViewState::Flat => {
                self.globe.set_visible(false);
                self.flat.set_visible(true);
                self.flat.invalidate_size();
            }
        }
        self.active = target;
        debug!(view = ?target, "view switched");
        true
    }

    pub fn toggle(&mut self) -> ViewState {
        self.set_globe_active(self.active == ViewState::Flat);
        self.active
    }

    /// Delivers the outcome of one layer pass.
    ///
    /// Success styles and loads the owning surface; failure reports a message
    /// for that layer and leaves every surface untouched.
    pub fn apply(&mut self, layer: LayerKind, outcome: Result<PreparedLayer, PassError>) {
        match outcome {
            Ok(prepared) => {
                let surface: &mut dyn Surface = match layer.surface() {
                    SurfaceKind::Flat => &mut self.flat,
                    SurfaceKind::Globe => &mut self.globe,
                };
                surface.set_style(layer, &prepared.style);
                surface.load(layer, &prepared.features);
                debug!(%layer, features = prepared.features.len(), "layer rendered");
            }
            Err(err) => {
                warn!(%layer, error = %err, "layer pass produced no data");
                self.errors.report(err.user_message(layer));
            }
        }
    }

    pub fn flat(&self) -> &F {
        &self.flat
    }

    pub fn flat_mut(&mut self) -> &mut F {
        &mut self.flat
    }

    pub fn globe(&self) -> &G {
        &self.globe
    }

    pub fn globe_mut(&mut self) -> &mut G {
        &mut self.globe
    }

    pub fn errors(&self) -> &E {
        &self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::{DualViewController, ViewState};
    use crate::error_surface::MessageRegion;
    use crate::pipeline::{PassError, layer_passes, prepare_layer};
    use crate::surface::{FlatSurface, GlobeSurface, PointOfView};
    use crate::testing::{
        COUNTRIES_URL, RecordingFlat, RecordingGlobe, STATES_URL, config, countries_body,
        states_body,
    };
    use layers::layer::LayerKind;
    use pretty_assertions::assert_eq;
    use streaming::transport::{HttpResponse, MemoryTransport, TransportError};

    type Controller = DualViewController<RecordingFlat, RecordingGlobe, MessageRegion>;

    fn controller() -> Controller {
        DualViewController::new(
            RecordingFlat::default(),
            RecordingGlobe::default(),
            MessageRegion::new(),
        )
    }

    fn run_all(c: &mut Controller, t: &MemoryTransport, allow: &[&str]) {
        let cfg = config(allow);
        for pass in layer_passes(&cfg) {
            let outcome = pollster::block_on(prepare_layer(t, &pass, &cfg));
            c.apply(pass.layer, outcome);
        }
    }

    #[test]
    fn starts_on_the_flat_map() {
        let c = controller();
        assert_eq!(c.active(), ViewState::Flat);
        assert!(c.flat().log.visible);
        assert!(!c.globe().log.visible);
        assert_eq!(c.flat().invalidations, 0);
    }

    #[test]
    fn round_trip_recomputes_flat_layout_exactly_once() {
        let mut c = controller();
        assert_eq!(c.toggle(), ViewState::Globe);
        assert!(!c.flat().log.visible);
        assert!(c.globe().log.visible);
        assert_eq!(c.flat().invalidations, 0);

        assert_eq!(c.toggle(), ViewState::Flat);
        assert!(c.flat().log.visible);
        assert!(!c.globe().log.visible);
        assert_eq!(c.flat().invalidations, 1);
    }

    #[test]
    fn repeated_signal_is_a_no_op() {
        let mut c = controller();
        let calls = c.flat().log.visibility_calls;
        assert!(!c.set_globe_active(false));
        assert_eq!(c.flat().log.visibility_calls, calls);
        assert_eq!(c.flat().invalidations, 0);

        assert!(c.set_globe_active(true));
        let globe_calls = c.globe().log.visibility_calls;
        assert!(!c.set_globe_active(true));
        assert_eq!(c.globe().log.visibility_calls, globe_calls);
        assert_eq!(c.active(), ViewState::Globe);
    }

    #[test]
    fn cameras_survive_toggling() {
        let mut c = controller();
        c.flat_mut().pan_to(12.5, 41.9, 6.0);
        let pov = PointOfView {
            lat: -33.9,
            lng: 151.2,
            altitude: 1.2,
        };
        c.globe_mut().pov = pov;
        let flat_before = c.flat().camera();

        c.toggle();
        c.toggle();
        c.toggle();

        assert_eq!(c.flat().camera(), flat_before);
        assert_eq!(c.globe().point_of_view(), pov);
    }

    #[test]
    fn allow_listed_country_renders_on_both_surfaces() {
        let t = MemoryTransport::new()
            .with_response(COUNTRIES_URL, HttpResponse::ok(countries_body()))
            .with_response(STATES_URL, HttpResponse::ok(states_body()));
        let mut c = controller();
        run_all(&mut c, &t, &["France"]);

        let france = vec!["https://example.org/wp/location/france".to_string()];
        assert_eq!(c.flat().log.targets.get(&LayerKind::CountryFlat), Some(&france));
        assert_eq!(c.globe().log.targets.get(&LayerKind::CountryGlobe), Some(&france));
        assert!(c.flat().log.styles.contains_key(&LayerKind::CountryFlat));
        // France is not a US state.
        assert_eq!(c.errors().text(), "No matching US states found in GeoJSON.");
        assert!(!c.flat().log.targets.contains_key(&LayerKind::StateFlat));
    }

    #[test]
    fn failed_dataset_does_not_block_the_others() {
        let t = MemoryTransport::new()
            .with_response(COUNTRIES_URL, HttpResponse::ok(countries_body()))
            .with_response(STATES_URL, HttpResponse::new(404, "Not Found"));
        let mut c = controller();
        run_all(&mut c, &t, &["France", "Germany", "Texas"]);

        assert!(c.errors().is_visible());
        assert_eq!(
            c.errors().text(),
            "Failed to load US states map data. Please try refreshing."
        );
        assert_eq!(c.flat().log.targets[&LayerKind::CountryFlat].len(), 2);
        assert_eq!(c.globe().log.targets[&LayerKind::CountryGlobe].len(), 2);
        assert!(!c.flat().log.targets.contains_key(&LayerKind::StateFlat));
    }

    #[test]
    fn unmatched_allow_list_reports_a_notice_not_a_failure() {
        let t = MemoryTransport::new()
            .with_response(COUNTRIES_URL, HttpResponse::ok(countries_body()))
            .with_response(STATES_URL, HttpResponse::ok(states_body()));
        let mut c = controller();
        run_all(&mut c, &t, &["Atlantis"]);

        // Globe pass runs last, so its notice is the one left showing.
        assert_eq!(c.errors().text(), "No matching countries found for globe.");
        assert!(c.flat().log.targets.is_empty());
        assert!(c.globe().log.targets.is_empty());
    }

    #[test]
    fn passes_apply_in_any_order_and_repeat_safely() {
        let t = MemoryTransport::new()
            .with_response(COUNTRIES_URL, HttpResponse::ok(countries_body()))
            .with_failure(STATES_URL, TransportError::network("offline"));
        let cfg = config(&["Germany"]);
        let mut c = controller();
        let mut passes = layer_passes(&cfg);
        passes.reverse();
        for pass in passes.iter().chain(passes.iter()) {
            let outcome = pollster::block_on(prepare_layer(&t, pass, &cfg));
            c.apply(pass.layer, outcome);
        }
        assert_eq!(
            c.flat().log.targets[&LayerKind::CountryFlat],
            vec!["https://example.org/wp/location/germany".to_string()]
        );
        assert_eq!(t.hits(COUNTRIES_URL), 4);
        assert_eq!(t.hits(STATES_URL), 2);
    }

    #[test]
    fn failure_leaves_surfaces_untouched() {
        let mut c = controller();
        c.apply(LayerKind::CountryGlobe, Err(PassError::NoMatches));
        assert!(c.globe().log.targets.is_empty());
        assert!(c.globe().log.styles.is_empty());
        assert_eq!(c.active(), ViewState::Flat);
    }

    #[test]
    fn missing_globe_leaves_the_flat_map_working() {
        let t = MemoryTransport::new()
            .with_response(COUNTRIES_URL, HttpResponse::ok(countries_body()))
            .with_response(STATES_URL, HttpResponse::ok(states_body()));
        let cfg = config(&["France", "Texas"]);
        let mut c = DualViewController::new(
            RecordingFlat::default(),
            None::<RecordingGlobe>,
            MessageRegion::new(),
        );
        for pass in layer_passes(&cfg) {
            let outcome = pollster::block_on(prepare_layer(&t, &pass, &cfg));
            c.apply(pass.layer, outcome);
        }
        assert_eq!(c.flat().log.targets.len(), 2);
        assert!(!c.errors().is_visible());
        assert_eq!(c.globe().point_of_view(), PointOfView::default());

        assert!(c.set_globe_active(true));
        assert!(c.set_globe_active(false));
        assert!(c.flat().log.visible);
        assert_eq!(c.flat().invalidations, 1);
    }
}
