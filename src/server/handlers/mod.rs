pub mod assistant;
pub mod charts;
pub mod dashboard;
pub mod health;
pub mod projections;
pub mod raster;
pub mod reference;
