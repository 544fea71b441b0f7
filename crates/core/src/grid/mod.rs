//! Raster grid storage and georeferencing

pub mod environment;
pub mod fire_map;
pub mod raster;

// Re-export main types
pub use environment::Environment;
pub use fire_map::FireMap;
pub use raster::RasterLayer;
