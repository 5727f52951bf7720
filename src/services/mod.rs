pub mod ingest_service;
pub mod projection_service;

pub use ingest_service::*;
pub use projection_service::*;
