use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{assistant, charts, dashboard, health, projections, raster, reference};
use crate::catalog::{Catalog, CodeLabel, ModuleInfo};
use crate::chat::{ChatService, GeminiAgent, ModelClient};
use crate::config::AppConfig;
use crate::raster::TileRelay;
use crate::render::Renderer;
use crate::services::{ProjectionRecord, ProjectionService, RegionSummary};

#[derive(OpenApi)]
#[openapi(
    paths(
        reference::list_regions,
        reference::list_modules,
        projections::list_projections,
    ),
    components(schemas(
        reference::RegionsResponse,
        reference::ModulesResponse,
        projections::ProjectionsResponse,
        projections::ErrorResponse,
        ProjectionRecord,
        RegionSummary,
        ModuleInfo,
        CodeLabel,
    )),
    tags((name = "projections", description = "GLOBIOM projection queries"))
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub projections: ProjectionService,
    pub renderer: Renderer,
    pub chat: Arc<ChatService>,
    pub tiles: Arc<TileRelay>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &AppConfig) -> Result<Self> {
        let projections = ProjectionService::new(db, Arc::new(Catalog::standard()));
        let agent = GeminiAgent::new(&config.chat, projections.clone());
        Self::build(projections, config, Arc::new(agent))
    }

    /// Builds the state around an explicit model client.
    pub fn with_model(
        db: DatabaseConnection,
        config: &AppConfig,
        client: Arc<dyn ModelClient>,
    ) -> Result<Self> {
        let projections = ProjectionService::new(db, Arc::new(Catalog::standard()));
        Self::build(projections, config, client)
    }

    fn build(
        projections: ProjectionService,
        config: &AppConfig,
        client: Arc<dyn ModelClient>,
    ) -> Result<Self> {
        let renderer = Renderer::new().context("failed to register templates")?;
        let chat = ChatService::new(client);
        let tiles = TileRelay::new(config.tiles.clone())?;

        Ok(Self {
            projections,
            renderer,
            chat: Arc::new(chat),
            tiles: Arc::new(tiles),
        })
    }
}

pub async fn create_app(
    db: DatabaseConnection,
    config: &AppConfig,
    cors_origin: Option<&str>,
) -> Result<Router> {
    let state = AppState::new(db, config)?;
    create_router(state, cors_origin)
}

pub fn create_router(state: AppState, cors_origin: Option<&str>) -> Result<Router> {
    let cors = match cors_origin {
        Some(origin) if origin != "*" => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<axum::http::HeaderValue>()
                    .with_context(|| format!("invalid CORS origin {}", origin))?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        _ => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        .route("/", get(dashboard::index))
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
        .nest("/raster", raster_routes())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state);

    Ok(app)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/regions/", get(reference::list_regions))
        .route("/modules/", get(reference::list_modules))
        .route("/projections/", get(projections::list_projections))
        .route("/charts/", get(charts::get_charts))
        .route("/charts/timeseries", get(charts::timeseries_chart))
        .route("/charts/pie", get(charts::pie_chart))
        .route("/ask-ai/", post(assistant::ask_ai))
}

fn raster_routes() -> Router<AppState> {
    Router::new()
        .route("/tiles/:z/:x/:y", get(raster::tile))
        .route("/tiles/:z/:x/:y/", get(raster::tile))
        .route("/info/", get(raster::info))
        .route("/tilejson.json", get(raster::tilejson))
}
