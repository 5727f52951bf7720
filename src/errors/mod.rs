//! Error types for the dashboard.
//!
//! - **ApiError**: request validation, rendering and store failures
//!   surfaced through the HTTP API
//! - **IngestError**: fatal failures of the CSV ingestion job
//!
//! Rows that cannot be mapped during ingestion are not errors; they are
//! counted in the ingestion summary instead.

pub mod api;
pub mod ingest;

pub use api::ApiError;
pub use ingest::IngestError;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for ingestion
pub type IngestResult<T> = Result<T, IngestError>;
