pub mod filter;
pub mod interaction;
pub mod layer;
pub mod symbology;

pub use filter::{AllowList, FilterOutcome, filter_locations};
pub use interaction::{FeatureBinding, NavigationBase, bind_feature, slugify};
pub use layer::*;
pub use symbology::{Color, LayerStyle, StyleSettings, resolve_style};
