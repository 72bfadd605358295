use formats::feature_collection::{FeatureCollection, FormatError};
use tracing::debug;

use crate::dataset::DatasetSpec;
use crate::transport::{Transport, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    Transport(TransportError),
    Format(FormatError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Transport(e) => write!(f, "transport error: {e}"),
            LoadError::Format(e) => write!(f, "format error: {e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Transport(e) => Some(e),
            LoadError::Format(e) => Some(e),
        }
    }
}

impl From<TransportError> for LoadError {
    fn from(e: TransportError) -> Self {
        LoadError::Transport(e)
    }
}

impl From<FormatError> for LoadError {
    fn from(e: FormatError) -> Self {
        LoadError::Format(e)
    }
}

/// Fetches and decodes one dataset with a single request.
pub async fn load_dataset<T: Transport>(
    transport: &T,
    dataset: &DatasetSpec,
) -> Result<FeatureCollection, LoadError> {
    debug!(dataset = %dataset.id, url = %dataset.url, "fetching dataset");
    let resp = transport.get(&dataset.url).await?;
    if !resp.is_success() {
        return Err(TransportError::status(
            resp.status,
            format!("Failed to load {} GeoJSON", dataset.id.description()),
        )
        .into());
    }
    let collection = FeatureCollection::from_geojson_slice(&resp.body)?;
    debug!(
        dataset = %dataset.id,
        features = collection.len(),
        "dataset decoded"
    );
    Ok(collection)
}
