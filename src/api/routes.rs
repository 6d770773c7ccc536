use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::{
    config::AppConfig,
    query::{self, FilterMeta, QueryReport, SuggestionList, REGISTRY},
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/query/parse", post(parse_query))
        .route("/query/suggest", post(suggest))
        .route("/query/filters", get(list_filters))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParseQueryBody {
    pub query: String,
}

async fn parse_query(
    State(state): State<AppState>,
    Json(body): Json<ParseQueryBody>,
) -> Json<QueryReport> {
    let report = query::analyze(&body.query, &state.config.parse_options());
    if let Some(err) = &report.error {
        tracing::debug!(code = %err.code, syntax = err.code.is_syntax(), "query not valid");
    }
    Json(report)
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestBody {
    pub query: String,
    /// Character offset; defaults to the end of the query
    pub cursor: Option<usize>,
}

async fn suggest(
    State(state): State<AppState>,
    Json(body): Json<SuggestBody>,
) -> Json<SuggestionList> {
    let cursor = body.cursor.unwrap_or_else(|| body.query.chars().count());
    let mut suggestions = query::generate_suggestions(&body.query, cursor);
    suggestions.truncate(state.config.max_suggestions);
    Json(suggestions.into())
}

async fn list_filters() -> Json<&'static [FilterMeta]> {
    Json(REGISTRY.filters())
}
