//! Route handlers for the listing, detail and company pages.

use crate::api::models::{Company, Game};
use crate::core::catalog::PageResult;
use crate::core::query::{FilterSet, RawFilters};
use crate::error::AppError;
use crate::http::AppState;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    status: &'static str,
}

/// `GET /` — landing/status probe.
pub async fn root_handler() -> Json<ServiceStatus> {
    Json(ServiceStatus { status: "ok" })
}

/// `GET /games` — search or filtered browse listing.
///
/// Invalid parameters come back as 400, upstream trouble as 502; both via
/// the [`AppError`] response mapping.
pub async fn games_handler(
    State(state): State<Arc<AppState>>,
    Query(raw): Query<RawFilters>,
) -> Result<Json<PageResult>, AppError> {
    let filters = FilterSet::validate(raw, state.default_page_size)?;
    let page = state.catalog.fetch_page(&filters).await?;
    Ok(Json(page))
}

/// `GET /games/{slug}/{id}` — detail lookup. Failure sends the browser
/// back to the listing instead of an error page.
pub async fn game_detail_handler(
    State(state): State<Arc<AppState>>,
    Path((slug, id)): Path<(String, u64)>,
) -> Result<Json<Game>, Redirect> {
    match state.catalog.fetch_game(&slug, id).await {
        Ok(game) => Ok(Json(game)),
        Err(err) => {
            tracing::error!(error = %err, slug, id, "game detail fetch failed");
            Err(Redirect::to("/games"))
        }
    }
}

/// `GET /companies/{slug}` — related-entity lookup, same fallback as the
/// detail page.
pub async fn company_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Company>, Redirect> {
    match state.catalog.fetch_company(&slug).await {
        Ok(company) => Ok(Json(company)),
        Err(err) => {
            tracing::error!(error = %err, slug, "company fetch failed");
            Err(Redirect::to("/games"))
        }
    }
}

/// Any unmatched route lands on the root.
pub async fn fallback_handler() -> Redirect {
    Redirect::to("/")
}
