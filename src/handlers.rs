use crate::controller::{recompute_cards, recompute_views, Controller, DashboardView, ViewUpdate};
use crate::dataset::LatestSnapshot;
use crate::errors::AppError;
use crate::models::{FilterQuery, FilterState};
use crate::state::AppState;
use crate::summary::{build_site_breakdown, SiteBreakdown, SummaryCards};
use crate::ui::render_index;
use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Html<String>, AppError> {
    let filter = FilterState::try_from(query)?;
    let view = Controller::new(&state.ctx).apply(filter);
    let page = render_index(&filter, &view).map_err(AppError::internal)?;
    Ok(Html(page))
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn get_views(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<ViewUpdate>, AppError> {
    let filter = FilterState::try_from(query)?;
    Ok(Json(recompute_views(&state.ctx, &filter)))
}

pub async fn post_cards(
    State(state): State<AppState>,
    Json(snapshot): Json<LatestSnapshot>,
) -> Json<SummaryCards> {
    Json(recompute_cards(&snapshot, &state.ctx.totals))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<DashboardView>, AppError> {
    let filter = FilterState::try_from(query)?;
    Ok(Json(Controller::new(&state.ctx).apply(filter)))
}

pub async fn get_breakdown(State(state): State<AppState>) -> Json<SiteBreakdown> {
    Json(build_site_breakdown(&state.ctx.dataset.latest_snapshot()))
}
