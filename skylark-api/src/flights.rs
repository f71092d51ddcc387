use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use skylark_core::search::{FlightSearchResult, SearchQuery};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    origin: String,
    destination: String,
    date: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/flights/search", get(search_flights))
}

/// GET /v1/flights/search?origin=BOM&destination=DEL&date=2026-02-06
async fn search_flights(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<FlightSearchResult>>, AppError> {
    let query = SearchQuery::parse(&params.origin, &params.destination, &params.date)?;
    let results = state.search.search(&query).await?;
    Ok(Json(results))
}
