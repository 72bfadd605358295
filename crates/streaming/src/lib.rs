pub mod dataset;
pub mod loader;
pub mod transport;

pub use dataset::*;
pub use loader::*;
pub use transport::*;
