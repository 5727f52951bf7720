use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tracing::warn;

use crate::raster::{Passthrough, TileCoord};
use crate::server::app::AppState;

const TILE_ERROR: &str = "Error fetching tile";
const INFO_ERROR: &str = "Error fetching info";

pub async fn tile(
    State(state): State<AppState>,
    Path((z, x, y)): Path<(String, String, String)>,
) -> Response {
    let Some(coord) = TileCoord::parse(&z, &x, &y) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match state.tiles.tile(coord).await {
        Ok(upstream) => passthrough(upstream),
        Err(err) => {
            warn!("Tile relay failed for {}/{}/{}: {:#}", z, x, y, err);
            (StatusCode::INTERNAL_SERVER_ERROR, TILE_ERROR).into_response()
        }
    }
}

pub async fn info(State(state): State<AppState>) -> Response {
    match state.tiles.info().await {
        Ok(upstream) => passthrough(upstream),
        Err(err) => {
            warn!("Raster info relay failed: {:#}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, INFO_ERROR).into_response()
        }
    }
}

pub async fn tilejson(State(state): State<AppState>) -> Response {
    match state.tiles.tilejson().await {
        Ok(descriptor) => Json(descriptor).into_response(),
        Err(err) => {
            warn!("Tile descriptor relay failed: {:#}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, TILE_ERROR).into_response()
        }
    }
}

fn passthrough(upstream: Passthrough) -> Response {
    ([(header::CONTENT_TYPE, upstream.content_type)], upstream.body).into_response()
}
