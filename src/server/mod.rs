pub mod app;
pub mod handlers;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

use crate::config::AppConfig;
use crate::database::{connection::*, migrations::Migrator};
use anyhow::Result;
use sea_orm_migration::prelude::*;
use tracing::info;

pub async fn start_server(config: &AppConfig, port: u16, cors_origin: Option<&str>) -> Result<()> {
    let database_url = get_database_url(Some(&config.database_path));
    let db = establish_connection(&database_url).await?;

    Migrator::up(&db, None).await?;
    info!("Database migrations completed");

    let app = app::create_app(db, config, cors_origin).await?;

    log_routes(config);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes(config: &AppConfig) {
    info!("Endpoints:");
    info!("  /                           - Dashboard");
    info!("  /health                     - Health check");
    info!("  /docs                       - Swagger UI documentation");
    info!("  /api/regions/, /api/modules/, /api/projections/ - JSON query API");
    info!("  /api/charts/*               - Chart fragments");
    info!("  /api/ask-ai/                - Assistant (POST)");
    info!("  /raster/*                   - Tile relay to {}", config.tiles.titiler_url);
    if config.chat.api_key.is_none() {
        info!("GOOGLE_API_KEY is not set, the assistant will answer with an error");
    }
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}
