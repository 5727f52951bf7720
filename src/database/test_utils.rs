use sea_orm::DatabaseConnection;
use tempfile::NamedTempFile;

use super::connection::{establish_connection, setup_database};

/// Migrated SQLite database in a temporary file. Keep the file handle alive
/// for as long as the connection is used.
pub async fn setup_test_db() -> (DatabaseConnection, NamedTempFile) {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());

    let db = establish_connection(&db_url)
        .await
        .expect("Failed to connect to test database");
    setup_database(&db).await.expect("Failed to run migrations");

    (db, temp_file)
}
