use axum::{extract::State, response::Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::ModuleInfo;
use crate::errors::ApiResult;
use crate::server::app::AppState;
use crate::services::RegionSummary;

#[derive(Serialize, ToSchema)]
pub struct RegionsResponse {
    pub regions: Vec<RegionSummary>,
}

#[derive(Serialize, ToSchema)]
pub struct ModulesResponse {
    pub modules: Vec<ModuleInfo>,
}

#[utoipa::path(
    get,
    path = "/api/regions/",
    responses(
        (status = 200, description = "All regions ordered by code", body = RegionsResponse)
    )
)]
pub async fn list_regions(State(state): State<AppState>) -> ApiResult<Json<RegionsResponse>> {
    let regions = state.projections.regions().await?;
    Ok(Json(RegionsResponse { regions }))
}

#[utoipa::path(
    get,
    path = "/api/modules/",
    responses(
        (status = 200, description = "Modules with their item and variable codes", body = ModulesResponse)
    )
)]
pub async fn list_modules(State(state): State<AppState>) -> Json<ModulesResponse> {
    Json(ModulesResponse {
        modules: state.projections.catalog().module_infos(),
    })
}
