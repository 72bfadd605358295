use layers::filter::AllowList;
use layers::interaction::NavigationBase;
use layers::symbology::{StyleSettings, or_default};
use serde::Deserialize;
use serde_json::Value;
use streaming::dataset::{DatasetId, DatasetSpec};

pub const DEFAULT_PERMALINK_BASE: &str = "/wp/location/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Json(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Json(msg) => write!(f, "invalid map configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Dataset endpoint overrides. Missing entries use the built-in URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatasetEndpoints {
    pub countries: Option<String>,
    pub us_states: Option<String>,
}

/// The settings store persists locations either as a list or as one
/// comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LocationsValue {
    List(Vec<String>),
    Csv(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawMapConfig {
    base_url: String,
    displayed_locations: Option<LocationsValue>,
    permalink_base: Option<String>,
    #[serde(deserialize_with = "or_default")]
    styles: StyleSettings,
    datasets: DatasetEndpoints,
}

/// Everything the pipeline reads, fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Site origin, used verbatim as the navigation prefix.
    pub base_url: String,
    pub allow_list: AllowList,
    /// Always begins and ends with `/`.
    pub permalink_base: String,
    pub styles: StyleSettings,
    pub datasets: DatasetEndpoints,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            allow_list: AllowList::default_locations(),
            permalink_base: DEFAULT_PERMALINK_BASE.to_string(),
            styles: StyleSettings::default(),
            datasets: DatasetEndpoints::default(),
        }
    }
}

impl MapConfig {
    pub fn from_json(payload: &str) -> Result<Self, ConfigError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| ConfigError::Json(e.to_string()))?;
        Self::from_value(value)
    }

    /// Builds a configuration from the page-localized settings object.
    ///
    /// An absent location list means "never configured" and selects the
    /// default travel list; an explicitly empty one stays empty.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let raw: RawMapConfig =
            serde_json::from_value(value).map_err(|e| ConfigError::Json(e.to_string()))?;
        let allow_list = match raw.displayed_locations {
            None => AllowList::default_locations(),
            Some(LocationsValue::Csv(csv)) => AllowList::from_csv(&csv),
            Some(LocationsValue::List(names)) => AllowList::new(
                names
                    .iter()
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty()),
            ),
        };
        let permalink_base = raw
            .permalink_base
            .as_deref()
            .map(normalize_permalink_base)
            .unwrap_or_else(|| DEFAULT_PERMALINK_BASE.to_string());
        Ok(Self {
            base_url: raw.base_url,
            allow_list,
            permalink_base,
            styles: raw.styles,
            datasets: raw.datasets,
        })
    }

    pub fn navigation(&self) -> NavigationBase {
        NavigationBase::new(self.base_url.clone(), self.permalink_base.clone())
    }

    pub fn dataset(&self, id: DatasetId) -> DatasetSpec {
        let url = match id {
            DatasetId::Countries => self.datasets.countries.as_deref(),
            DatasetId::UsStates => self.datasets.us_states.as_deref(),
        };
        match url {
            Some(url) => DatasetSpec::new(id, url),
            None => DatasetSpec::with_default_url(id),
        }
    }
}

/// Strips surrounding whitespace and slashes, then wraps the path in `/`.
pub fn normalize_permalink_base(raw: &str) -> String {
    let inner = raw.trim().trim_matches('/');
    if inner.is_empty() {
        "/".to_string()
    } else {
        format!("/{inner}/")
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_PERMALINK_BASE, MapConfig, normalize_permalink_base};
    use layers::filter::AllowList;
    use layers::layer::LayerKind;
    use layers::symbology::{LayerStyle, resolve_style};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use streaming::dataset::{DatasetId, US_STATES_URL};

    #[test]
    fn permalink_base_is_wrapped_in_slashes() {
        assert_eq!(normalize_permalink_base("wp/location"), "/wp/location/");
        assert_eq!(normalize_permalink_base("/travel/"), "/travel/");
        assert_eq!(normalize_permalink_base(" //trips// "), "/trips/");
        assert_eq!(normalize_permalink_base(""), "/");
    }

    #[test]
    fn parses_localized_settings() {
        let cfg = MapConfig::from_value(json!({
            "baseUrl": "https://example.org",
            "displayedLocations": ["France", " Texas ", ""],
            "permalinkBase": "travel",
            "styles": { "countryFlat": { "fillColor": "#123456" } },
            "datasets": { "countries": "http://localhost/world.json" }
        }))
        .expect("config");
        assert_eq!(cfg.base_url, "https://example.org");
        assert_eq!(cfg.allow_list, AllowList::new(["France", "Texas"]));
        assert_eq!(cfg.permalink_base, "/travel/");
        assert_eq!(
            cfg.dataset(DatasetId::Countries).url,
            "http://localhost/world.json"
        );
        assert_eq!(cfg.dataset(DatasetId::UsStates).url, US_STATES_URL);
        assert_eq!(
            cfg.navigation().target_for_slug("france"),
            "https://example.org/travel/france"
        );
    }

    #[test]
    fn csv_locations_are_accepted() {
        let cfg = MapConfig::from_value(json!({ "displayedLocations": "Japan, Laos" }))
            .expect("config");
        assert_eq!(cfg.allow_list.names(), &["Japan", "Laos"]);
    }

    #[test]
    fn missing_list_uses_defaults_but_empty_list_stays_empty() {
        let unset = MapConfig::from_value(json!({})).expect("config");
        assert_eq!(unset.allow_list, AllowList::default_locations());
        assert_eq!(unset.permalink_base, DEFAULT_PERMALINK_BASE);

        let empty = MapConfig::from_value(json!({ "displayedLocations": [] })).expect("config");
        assert!(empty.allow_list.is_empty());
    }

    #[test]
    fn misshapen_styles_fall_back_to_defaults() {
        for styles in [json!(null), json!("none"), json!(7), json!({ "countryFlat": "red" })] {
            let cfg = MapConfig::from_value(json!({
                "displayedLocations": ["France"],
                "styles": styles.clone()
            }))
            .expect("config");
            assert_eq!(cfg.allow_list.names(), &["France"]);
            for kind in LayerKind::ALL {
                assert_eq!(
                    resolve_style(kind, &cfg.styles),
                    LayerStyle::default_for(kind),
                    "{styles}"
                );
            }
        }

        let mixed = MapConfig::from_value(json!({
            "styles": { "stateFlat": [1, 2], "countryGlobe": { "fillOpacity": 0.9 } }
        }))
        .expect("config");
        assert_eq!(
            resolve_style(LayerKind::StateFlat, &mixed.styles),
            LayerStyle::default_for(LayerKind::StateFlat)
        );
        assert_eq!(
            resolve_style(LayerKind::CountryGlobe, &mixed.styles).fill_opacity,
            0.9
        );
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(MapConfig::from_json("{not json").is_err());
        assert!(MapConfig::from_json(r#"{"baseUrl": 3}"#).is_err());
    }
}
