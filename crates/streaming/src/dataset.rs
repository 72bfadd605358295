/// Remote boundary datasets the map knows how to draw.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatasetId {
    Countries,
    UsStates,
}

pub const COUNTRIES_URL: &str =
    "https://raw.githubusercontent.com/TonyCicero/Map-Widget/refs/heads/main/world.geo.json";
pub const US_STATES_URL: &str =
    "https://raw.githubusercontent.com/TonyCicero/Map-Widget/refs/heads/main/us_states.geo.json";

impl DatasetId {
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetId::Countries => "countries",
            DatasetId::UsStates => "us-states",
        }
    }

    /// Human-readable name used in error messages.
    pub fn description(self) -> &'static str {
        match self {
            DatasetId::Countries => "countries",
            DatasetId::UsStates => "US states",
        }
    }

    pub fn default_url(self) -> &'static str {
        match self {
            DatasetId::Countries => COUNTRIES_URL,
            DatasetId::UsStates => US_STATES_URL,
        }
    }

    /// Property holding the display name. The two upstream files disagree on
    /// the key, so each dataset declares its own.
    pub fn name_field(self) -> &'static str {
        match self {
            DatasetId::Countries => "name",
            DatasetId::UsStates => "NAME",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "countries" | "country" | "world" => Some(DatasetId::Countries),
            "us-states" | "us_states" | "states" | "state" => Some(DatasetId::UsStates),
            _ => None,
        }
    }
}

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where to fetch a dataset and how to read its features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSpec {
    pub id: DatasetId,
    pub url: String,
    pub name_field: String,
}

impl DatasetSpec {
    pub fn new(id: DatasetId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            name_field: id.name_field().to_string(),
        }
    }

    pub fn with_default_url(id: DatasetId) -> Self {
        Self::new(id, id.default_url())
    }
}
