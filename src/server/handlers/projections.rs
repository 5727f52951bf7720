use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::ApiResult;
use crate::server::app::AppState;
use crate::services::{ProjectionParams, ProjectionRecord};

#[derive(Serialize, ToSchema)]
pub struct ProjectionsResponse {
    pub projections: Vec<ProjectionRecord>,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[utoipa::path(
    get,
    path = "/api/projections/",
    params(ProjectionParams),
    responses(
        (status = 200, description = "Matching projection records", body = ProjectionsResponse),
        (status = 400, description = "Missing or invalid filter", body = ErrorResponse)
    )
)]
pub async fn list_projections(
    State(state): State<AppState>,
    Query(params): Query<ProjectionParams>,
) -> ApiResult<Json<ProjectionsResponse>> {
    let query = state.projections.validate(&params).await?;
    let projections = state.projections.list(&query).await?;
    Ok(Json(ProjectionsResponse { projections }))
}
