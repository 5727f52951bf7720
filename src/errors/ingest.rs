//! Fatal ingestion errors. Any of these rolls back the whole load.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("CSV file not found: {0}")]
    FileNotFound(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_names_the_path() {
        let err = IngestError::FileNotFound("missing.csv".to_string());
        assert_eq!(err.to_string(), "CSV file not found: missing.csv");
    }
}
