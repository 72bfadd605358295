pub mod config;
pub mod controller;
pub mod error_surface;
pub mod pipeline;
pub mod surface;

#[cfg(test)]
mod testing;

pub use config::*;
pub use controller::*;
pub use error_surface::*;
pub use pipeline::*;
pub use surface::*;
