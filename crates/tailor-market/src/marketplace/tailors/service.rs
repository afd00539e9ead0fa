use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::accumulator::{validate_stars, RatingAccumulator, RatingError, ReviewEvent};
use super::domain::{ReviewId, ReviewRecord, ReviewSubmission, TailorId, TailorRecord, UserId};
use super::filter::FilterEngine;
use super::listing::{ListingPage, ListingQuery};
use super::ranking::RankingEngine;
use super::repository::{
    RepositoryError, ReviewRepository, SentimentClassifier, SentimentError, TailorRepository,
};
use crate::config::ListingConfig;

/// Service composing the tailor store, review store, sentiment classifier, and rating pipeline.
pub struct TailorMarketplaceService<T, R, S> {
    tailors: Arc<T>,
    reviews: Arc<R>,
    classifier: Arc<S>,
    listing: ListingConfig,
    accumulator: RatingAccumulator,
    filter: FilterEngine,
    ranking: RankingEngine,
}

static REVIEW_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_review_id() -> ReviewId {
    let id = REVIEW_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReviewId(format!("rev-{id:06}"))
}

impl<T, R, S> TailorMarketplaceService<T, R, S>
where
    T: TailorRepository + 'static,
    R: ReviewRepository + 'static,
    S: SentimentClassifier + 'static,
{
    pub fn new(
        tailors: Arc<T>,
        reviews: Arc<R>,
        classifier: Arc<S>,
        listing: ListingConfig,
    ) -> Self {
        Self {
            tailors,
            reviews,
            classifier,
            listing,
            accumulator: RatingAccumulator::new(),
            filter: FilterEngine::new(),
            ranking: RankingEngine::new(),
        }
    }

    /// Filter, rank, and paginate the current tailor snapshot.
    pub fn list(&self, query: &ListingQuery) -> Result<ListingPage, DirectoryError> {
        let snapshot = self.tailors.snapshot()?;
        let available = snapshot.len();

        let visible = self.filter.filter(snapshot, &query.filter());
        let ranked = self.ranking.rank(visible, query.sort);

        let page = query.page.unwrap_or(1);
        let per_page = query.per_page.unwrap_or(self.listing.page_size);
        let listing = ListingPage::paginate(ranked, query.sort, page, per_page);

        debug!(
            available,
            matched = listing.total,
            sort = query.sort.label(),
            page = listing.page,
            "tailor listing computed"
        );

        Ok(listing)
    }

    /// Record a review and fold its rating into the tailor's running totals.
    ///
    /// The review row and the tailor totals are written together under the tailor store's
    /// write step. If the totals cannot be persisted the review row is removed again, so a
    /// failed submission can be retried.
    pub fn submit_review(
        &self,
        submission: ReviewSubmission,
    ) -> Result<ReviewReceipt, ReviewServiceError> {
        let ReviewSubmission {
            tailor_id,
            user_id,
            stars,
            message,
        } = submission;

        validate_stars(stars)?;

        if self.reviews.exists(&tailor_id, &user_id)? {
            warn!(%tailor_id, %user_id, "duplicate review rejected");
            return Err(ReviewServiceError::DuplicateReview { tailor_id, user_id });
        }

        if self.tailors.fetch(&tailor_id)?.is_none() {
            return Err(ReviewServiceError::TailorNotFound(tailor_id));
        }

        let sentiment_score = self.classifier.score(&message)?;
        let event = ReviewEvent::new(stars, sentiment_score)?;

        let mut stored: Option<ReviewRecord> = None;
        let record_review = |tailor: &TailorRecord| -> Result<TailorRecord, ReviewServiceError> {
            let updated = self.accumulator.apply_event(tailor, &event);
            let review = ReviewRecord {
                review_id: next_review_id(),
                tailor_id: tailor_id.clone(),
                user_id: user_id.clone(),
                stars,
                message,
                sentiment_score: event.sentiment_score(),
                submitted_at: Utc::now(),
            };

            match self.reviews.insert(review) {
                Ok(review) => {
                    stored = Some(review);
                    Ok(updated)
                }
                Err(RepositoryError::Conflict) => Err(ReviewServiceError::DuplicateReview {
                    tailor_id: tailor_id.clone(),
                    user_id: user_id.clone(),
                }),
                Err(other) => Err(ReviewServiceError::Repository(other)),
            }
        };
        let outcome = self.tailors.modify(&tailor_id, record_review);

        let updated = match outcome {
            Ok(Some(updated)) => updated,
            Ok(None) => return Err(ReviewServiceError::TailorNotFound(tailor_id)),
            Err(error) => {
                if let Some(review) = stored {
                    self.discard(&review);
                }
                return Err(error);
            }
        };
        let Some(review) = stored else {
            return Err(RepositoryError::Unavailable(
                "tailor store skipped the review write".to_string(),
            )
            .into());
        };

        info!(
            %tailor_id,
            review_id = %review.review_id.0,
            stars,
            sentiment = event.sentiment_score(),
            rating_weight = updated.rating_weight,
            "review recorded"
        );

        Ok(ReviewReceipt {
            review,
            tailor: updated,
        })
    }

    fn discard(&self, review: &ReviewRecord) {
        match self.reviews.remove(&review.review_id) {
            Ok(()) => warn!(
                tailor_id = %review.tailor_id,
                review_id = %review.review_id.0,
                "tailor totals not persisted; review withdrawn"
            ),
            Err(error) => warn!(
                tailor_id = %review.tailor_id,
                review_id = %review.review_id.0,
                %error,
                "tailor totals not persisted and review could not be withdrawn"
            ),
        }
    }

    /// Fetch a tailor document regardless of visibility.
    pub fn get(&self, tailor_id: &TailorId) -> Result<TailorRecord, DirectoryError> {
        let record = self
            .tailors
            .fetch(tailor_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }
}

/// Stored review plus the tailor totals after accumulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewReceipt {
    pub review: ReviewRecord,
    pub tailor: TailorRecord,
}

/// Error raised by the listing side of the service.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Distinguishable outcomes of a failed review submission.
#[derive(Debug, thiserror::Error)]
pub enum ReviewServiceError {
    #[error("user {user_id} has already reviewed tailor {tailor_id}")]
    DuplicateReview { tailor_id: TailorId, user_id: UserId },
    #[error("tailor {0} not found")]
    TailorNotFound(TailorId),
    #[error(transparent)]
    InvalidInput(#[from] RatingError),
    #[error(transparent)]
    Classifier(#[from] SentimentError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
