pub mod feature_collection;
pub mod validate;

pub use feature_collection::*;
pub use validate::*;
