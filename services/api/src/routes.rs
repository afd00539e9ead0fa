use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use tailor_market::error::AppError;
use tailor_market::marketplace::tailors::{
    tailor_router, FilterEngine, RankedTailor, RankingEngine, ReviewRepository,
    SentimentClassifier, SortMode, TailorFilter, TailorMarketplaceService, TailorRecord,
    TailorRepository,
};

/// Stateless ranking request: the caller supplies the batch.
#[derive(Debug, Deserialize)]
pub(crate) struct RankRequest {
    pub(crate) tailors: Vec<TailorRecord>,
    #[serde(default)]
    pub(crate) sort: SortMode,
    #[serde(default)]
    pub(crate) search: Option<String>,
    #[serde(default)]
    pub(crate) tags: BTreeSet<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RankResponse {
    pub(crate) sort: SortMode,
    pub(crate) received: usize,
    pub(crate) global_average: f64,
    pub(crate) tailors: Vec<RankedTailor>,
}

pub(crate) fn with_marketplace_routes<T, R, S>(
    service: Arc<TailorMarketplaceService<T, R, S>>,
) -> axum::Router
where
    T: TailorRepository + 'static,
    R: ReviewRepository + 'static,
    S: SentimentClassifier + 'static,
{
    tailor_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/tailors/rank", axum::routing::post(rank_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn rank_endpoint(
    Json(payload): Json<RankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    let RankRequest {
        tailors,
        sort,
        search,
        tags,
    } = payload;

    let received = tailors.len();
    let filter = TailorFilter {
        search_query: search,
        required_tags: tags,
    };
    let visible = FilterEngine::new().filter(tailors, &filter);
    let ranking = RankingEngine::new();
    let global_average = ranking.global_average(&visible);
    let ranked = ranking.rank(visible, sort);

    Ok(Json(RankResponse {
        sort,
        received,
        global_average,
        tailors: ranked,
    }))
}
