use formats::feature_collection::{FeatureCollection, FormatError};
use layers::filter::filter_locations;
use layers::interaction::bind_feature;
use layers::layer::LayerKind;
use layers::symbology::{LayerStyle, resolve_style};
use streaming::dataset::{DatasetId, DatasetSpec};
use streaming::loader::{LoadError, load_dataset};
use streaming::transport::{Transport, TransportError};
use tracing::{debug, warn};

use crate::config::MapConfig;
use crate::surface::RenderFeature;

/// Why a layer pass produced nothing to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassError {
    Transport(TransportError),
    Format(FormatError),
    /// Soft outcome: the dataset loaded but no allow-listed location matched.
    NoMatches,
}

impl PassError {
    /// Text shown in the error region for a failure of `layer`.
    pub fn user_message(&self, layer: LayerKind) -> &'static str {
        match (self, layer) {
            (PassError::NoMatches, LayerKind::CountryFlat) => {
                "No matching countries found in GeoJSON."
            }
            (PassError::NoMatches, LayerKind::StateFlat) => "No matching US states found in GeoJSON.",
            (PassError::NoMatches, LayerKind::CountryGlobe) => {
                "No matching countries found for globe."
            }
            (_, LayerKind::CountryFlat) => {
                "Failed to load country map data. Please try refreshing."
            }
            (_, LayerKind::StateFlat) => {
                "Failed to load US states map data. Please try refreshing."
            }
            (_, LayerKind::CountryGlobe) => "Failed to load globe data. Please try refreshing.",
        }
    }

    pub fn is_no_matches(&self) -> bool {
        matches!(self, PassError::NoMatches)
    }
}

impl std::fmt::Display for PassError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PassError::Transport(e) => write!(f, "{e}"),
            PassError::Format(e) => write!(f, "{e}"),
            PassError::NoMatches => write!(f, "no allow-listed locations in dataset"),
        }
    }
}

impl std::error::Error for PassError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PassError::Transport(e) => Some(e),
            PassError::Format(e) => Some(e),
            PassError::NoMatches => None,
        }
    }
}

impl From<LoadError> for PassError {
    fn from(e: LoadError) -> Self {
        match e {
            LoadError::Transport(e) => PassError::Transport(e),
            LoadError::Format(e) => PassError::Format(e),
        }
    }
}

/// One fetch-to-render run: a layer kind and the dataset feeding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerPass {
    pub layer: LayerKind,
    pub dataset: DatasetSpec,
}

pub fn dataset_for(layer: LayerKind) -> DatasetId {
    match layer {
        LayerKind::CountryFlat | LayerKind::CountryGlobe => DatasetId::Countries,
        LayerKind::StateFlat => DatasetId::UsStates,
    }
}

/// The three independent passes, one per layer kind.
pub fn layer_passes(config: &MapConfig) -> Vec<LayerPass> {
    LayerKind::ALL
        .into_iter()
        .map(|layer| LayerPass {
            layer,
            dataset: config.dataset(dataset_for(layer)),
        })
        .collect()
}

/// A pass ready to hand to its surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedLayer {
    pub layer: LayerKind,
    pub style: LayerStyle,
    pub features: Vec<RenderFeature>,
}

/// Filter, style and bind an already loaded collection. Synchronous and pure.
pub fn prepare_features(
    layer: LayerKind,
    collection: &FeatureCollection,
    name_field: &str,
    config: &MapConfig,
) -> Result<PreparedLayer, PassError> {
    let matched = filter_locations(collection, &config.allow_list, name_field)
        .into_matched()
        .ok_or(PassError::NoMatches)?;
    let nav = config.navigation();
    let features = matched
        .features
        .into_iter()
        .map(|feature| {
            let binding = bind_feature(&feature, name_field, &nav);
            RenderFeature { feature, binding }
        })
        .collect();
    Ok(PreparedLayer {
        layer,
        style: resolve_style(layer, &config.styles),
        features,
    })
}

/// Runs one pass up to the render call. The fetch is the only await point.
pub async fn prepare_layer<T: Transport>(
    transport: &T,
    pass: &LayerPass,
    config: &MapConfig,
) -> Result<PreparedLayer, PassError> {
    let collection = load_dataset(transport, &pass.dataset)
        .await
        .inspect_err(|e| {
            warn!(layer = %pass.layer, dataset = %pass.dataset.id, error = %e, "dataset load failed");
        })?;
    let prepared = prepare_features(pass.layer, &collection, &pass.dataset.name_field, config);
    match &prepared {
        Ok(p) => debug!(
            layer = %pass.layer,
            loaded = collection.len(),
            kept = p.features.len(),
            "layer prepared"
        ),
        Err(_) => warn!(
            layer = %pass.layer,
            loaded = collection.len(),
            "no allow-listed locations in dataset"
        ),
    }
    prepared
}

#[cfg(test)]
mod tests {
    use super::{PassError, dataset_for, layer_passes, prepare_features, prepare_layer};
    use crate::testing::{config, countries_body};
    use formats::feature_collection::{FeatureCollection, FormatError};
    use layers::layer::LayerKind;
    use layers::symbology::LayerStyle;
    use pretty_assertions::assert_eq;
    use streaming::dataset::DatasetId;
    use streaming::transport::{HttpResponse, MemoryTransport};

    #[test]
    fn passes_cover_every_layer_with_its_dataset() {
        let passes = layer_passes(&config(&[]));
        let pairs: Vec<_> = passes.iter().map(|p| (p.layer, p.dataset.id)).collect();
        assert_eq!(
            pairs,
            vec![
                (LayerKind::CountryFlat, DatasetId::Countries),
                (LayerKind::StateFlat, DatasetId::UsStates),
                (LayerKind::CountryGlobe, DatasetId::Countries),
            ]
        );
        assert_eq!(passes[1].dataset.name_field, "NAME");
        assert_eq!(dataset_for(LayerKind::CountryGlobe), DatasetId::Countries);
    }

    #[test]
    fn allow_listed_feature_is_bound_to_its_page() {
        let cfg = config(&["France"]);
        let fc = FeatureCollection::from_geojson_str(&countries_body()).expect("parse");
        let prepared = prepare_features(LayerKind::CountryFlat, &fc, "name", &cfg).expect("prepared");
        assert_eq!(prepared.features.len(), 1);
        let only = &prepared.features[0];
        assert_eq!(only.feature.property_str("name"), Some("France"));
        assert_eq!(only.binding.target, "https://example.org/wp/location/france");
        assert_eq!(prepared.style, LayerStyle::default_for(LayerKind::CountryFlat));
    }

    #[test]
    fn prepare_layer_maps_failures() {
        let cfg = config(&["France"]);
        let passes = layer_passes(&cfg);
        let t = MemoryTransport::new()
            .with_response("mem://countries", HttpResponse::ok(r#"{"type":"x"}"#));

        let err = pollster::block_on(prepare_layer(&t, &passes[0], &cfg)).expect_err("format");
        assert_eq!(err, PassError::Format(FormatError::MissingFeatures));

        let err = pollster::block_on(prepare_layer(&t, &passes[1], &cfg)).expect_err("404");
        assert!(matches!(err, PassError::Transport(ref e) if e.status == Some(404)));
        assert_eq!(
            err.user_message(LayerKind::StateFlat),
            "Failed to load US states map data. Please try refreshing."
        );
    }

    #[test]
    fn unmatched_allow_list_is_a_soft_outcome() {
        let cfg = config(&["Atlantis"]);
        let t = MemoryTransport::new()
            .with_response("mem://countries", HttpResponse::ok(countries_body()));
        let pass = &layer_passes(&cfg)[2];
        let err = pollster::block_on(prepare_layer(&t, pass, &cfg)).expect_err("no match");
        assert!(err.is_no_matches());
        assert_eq!(
            err.user_message(pass.layer),
            "No matching countries found for globe."
        );
    }
}
