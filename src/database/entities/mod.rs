pub mod animal_projections;
pub mod bioenergy_projections;
pub mod crop_projections;
pub mod land_cover_projections;
pub mod projection;
pub mod regions;

pub use projection::{NewProjection, ProjectionColumns, ProjectionRow};
