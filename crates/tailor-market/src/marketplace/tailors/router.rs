use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ReviewSubmission, SortMode, TailorId, UserId};
use super::listing::ListingQuery;
use super::repository::{ReviewRepository, SentimentClassifier, TailorRepository};
use super::service::{DirectoryError, ReviewServiceError, TailorMarketplaceService};

/// Router builder exposing the directory listing and review intake endpoints.
pub fn tailor_router<T, R, S>(service: Arc<TailorMarketplaceService<T, R, S>>) -> Router
where
    T: TailorRepository + 'static,
    R: ReviewRepository + 'static,
    S: SentimentClassifier + 'static,
{
    Router::new()
        .route("/api/v1/tailors", get(listing_handler::<T, R, S>))
        .route(
            "/api/v1/tailors/:tailor_id/reviews",
            post(review_handler::<T, R, S>),
        )
        .with_state(service)
}

/// Query string of the listing endpoint. `tags` is a comma separated list.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListingParams {
    #[serde(default)]
    pub(crate) search: Option<String>,
    #[serde(default)]
    pub(crate) tags: Option<String>,
    #[serde(default)]
    pub(crate) sort: Option<String>,
    #[serde(default)]
    pub(crate) page: Option<usize>,
    #[serde(default)]
    pub(crate) per_page: Option<usize>,
}

impl ListingParams {
    fn into_query(self) -> Result<ListingQuery, String> {
        let sort = match self.sort.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw.parse::<SortMode>()?,
            _ => SortMode::default(),
        };

        let tags = self
            .tags
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();

        Ok(ListingQuery {
            search: self.search,
            tags,
            sort,
            page: self.page,
            per_page: self.per_page,
        })
    }
}

/// Review body; the tailor comes from the path.
#[derive(Debug, Deserialize)]
pub(crate) struct ReviewBody {
    pub(crate) user_id: String,
    pub(crate) stars: u8,
    #[serde(default)]
    pub(crate) message: String,
}

pub(crate) async fn listing_handler<T, R, S>(
    State(service): State<Arc<TailorMarketplaceService<T, R, S>>>,
    Query(params): Query<ListingParams>,
) -> Response
where
    T: TailorRepository + 'static,
    R: ReviewRepository + 'static,
    S: SentimentClassifier + 'static,
{
    let query = match params.into_query() {
        Ok(query) => query,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
        }
    };

    match service.list(&query) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(DirectoryError::Repository(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn review_handler<T, R, S>(
    State(service): State<Arc<TailorMarketplaceService<T, R, S>>>,
    Path(tailor_id): Path<String>,
    Json(body): Json<ReviewBody>,
) -> Response
where
    T: TailorRepository + 'static,
    R: ReviewRepository + 'static,
    S: SentimentClassifier + 'static,
{
    let submission = ReviewSubmission {
        tailor_id: TailorId(tailor_id),
        user_id: UserId(body.user_id),
        stars: body.stars,
        message: body.message,
    };

    match service.submit_review(submission) {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(error) => {
            let status = match &error {
                ReviewServiceError::DuplicateReview { .. } => StatusCode::CONFLICT,
                ReviewServiceError::TailorNotFound(_) => StatusCode::NOT_FOUND,
                ReviewServiceError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ReviewServiceError::Classifier(_) => StatusCode::SERVICE_UNAVAILABLE,
                ReviewServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let payload = json!({
                "error": error.to_string(),
            });
            (status, Json(payload)).into_response()
        }
    }
}
