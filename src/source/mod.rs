pub mod error;
pub mod grid_locator;
pub mod gridded;
pub mod loader;
pub mod measurement_source;
pub mod reduction;
