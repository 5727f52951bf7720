use axum::{extract::State, response::Html};

use crate::errors::ApiResult;
use crate::server::app::AppState;

/// Landing page with the headline totals.
pub async fn index(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let stats = state.projections.headline_stats().await?;
    let modules = state.projections.catalog().module_infos();
    let regions = state.projections.regions().await?;
    Ok(Html(state.renderer.dashboard(&stats, &modules, &regions)?))
}
