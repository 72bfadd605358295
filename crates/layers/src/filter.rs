use std::collections::HashSet;

use formats::feature_collection::{Feature, FeatureCollection};
use formats::validate::is_valid;

/// Default locations shown when the settings store has never been written.
pub const DEFAULT_LOCATIONS: [&str; 31] = [
    "California",
    "Florida",
    "Maryland",
    "Massachusetts",
    "New York",
    "Nevada",
    "Pennsylvania",
    "Virginia",
    "Albania",
    "Austria",
    "Belgium",
    "Cambodia",
    "Canada",
    "Czech Republic",
    "Denmark",
    "Dominican Republic",
    "France",
    "Germany",
    "Greece",
    "Ireland",
    "Japan",
    "Laos",
    "Netherlands",
    "Poland",
    "Slovakia",
    "Sweden",
    "Switzerland",
    "Thailand",
    "United Kingdom",
    "United States of America",
    "Vietnam",
];

/// Ordered set of location names permitted to render.
///
/// Membership is an exact, case-sensitive string match. Duplicates are dropped
/// with the first occurrence keeping its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    names: Vec<String>,
    index: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = Self::default();
        for name in names {
            let name = name.into();
            if out.index.insert(name.clone()) {
                out.names.push(name);
            }
        }
        out
    }

    /// Parses the comma-separated form the settings store persists.
    ///
    /// Entries are trimmed and empty entries dropped.
    pub fn from_csv(csv: &str) -> Self {
        Self::new(csv.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    pub fn default_locations() -> Self {
        Self::new(DEFAULT_LOCATIONS)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Result of reducing one dataset to the allow-listed locations.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    Matched(FeatureCollection),
    /// Nothing survived. Not a fault; callers surface it as a notice.
    NoMatches,
}

impl FilterOutcome {
    pub fn into_matched(self) -> Option<FeatureCollection> {
        match self {
            FilterOutcome::Matched(fc) => Some(fc),
            FilterOutcome::NoMatches => None,
        }
    }
}

/// Whether a single feature survives filtering.
pub fn keeps_feature(feature: &Feature, allow_list: &AllowList, name_field: &str) -> bool {
    is_valid(feature.geometry.as_ref())
        && feature
            .property_str(name_field)
            .is_some_and(|name| allow_list.contains(name))
}

/// Keeps features with a valid geometry whose `name_field` property is
/// allow-listed, preserving input order.
pub fn filter_locations(
    collection: &FeatureCollection,
    allow_list: &AllowList,
    name_field: &str,
) -> FilterOutcome {
    let features: Vec<Feature> = collection
        .features
        .iter()
        .filter(|f| keeps_feature(f, allow_list, name_field))
        .cloned()
        .collect();
    if features.is_empty() {
        FilterOutcome::NoMatches
    } else {
        FilterOutcome::Matched(FeatureCollection::new(features))
    }
}
