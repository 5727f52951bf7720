use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::errors::ApiError;
use crate::render::charts::{breakdown_figure, describe, timeseries_figure};
use crate::server::app::AppState;
use crate::services::{ProjectionParams, ProjectionQuery};

type ChartResult = Result<Html<String>, ChartError>;

/// Chart endpoints answer invalid filters with a plain-text 400.
pub struct ChartError(ApiError);

impl From<ApiError> for ChartError {
    fn from(err: ApiError) -> Self {
        ChartError(err)
    }
}

impl From<sea_orm::DbErr> for ChartError {
    fn from(err: sea_orm::DbErr) -> Self {
        ChartError(err.into())
    }
}

impl IntoResponse for ChartError {
    fn into_response(self) -> Response {
        match self.0 {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            other => other.into_response(),
        }
    }
}

pub async fn get_charts(
    State(state): State<AppState>,
    Query(params): Query<ProjectionParams>,
) -> ChartResult {
    let query = state.projections.validate(&params).await?;
    let timeseries = render_timeseries(&state, &query, &params).await?;
    let breakdown = render_breakdown(&state, &query, &params).await?;
    Ok(Html(state.renderer.charts(&timeseries, &breakdown)?))
}

pub async fn timeseries_chart(
    State(state): State<AppState>,
    Query(params): Query<ProjectionParams>,
) -> ChartResult {
    let query = state.projections.validate(&params).await?;
    Ok(Html(render_timeseries(&state, &query, &params).await?))
}

pub async fn pie_chart(
    State(state): State<AppState>,
    Query(params): Query<ProjectionParams>,
) -> ChartResult {
    let query = state.projections.validate(&params).await?;
    Ok(Html(render_breakdown(&state, &query, &params).await?))
}

async fn render_timeseries(
    state: &AppState,
    query: &ProjectionQuery,
    params: &ProjectionParams,
) -> Result<String, ChartError> {
    let totals = state.projections.sum_by_year(query).await?;
    let title = describe(state.projections.catalog(), query, region_code(params));
    let figure = timeseries_figure(&title, &totals);
    Ok(state.renderer.chart(figure.as_ref())?)
}

async fn render_breakdown(
    state: &AppState,
    query: &ProjectionQuery,
    params: &ProjectionParams,
) -> Result<String, ChartError> {
    let totals = state.projections.sum_by_item(query).await?;
    let catalog = state.projections.catalog();
    let title = format!("{} by item", describe(catalog, query, region_code(params)));
    let figure = breakdown_figure(catalog, query, &title, &totals);
    Ok(state.renderer.chart(figure.as_ref())?)
}

fn region_code(params: &ProjectionParams) -> Option<&str> {
    params
        .region
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
}
