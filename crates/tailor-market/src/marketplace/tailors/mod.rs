//! Tailor directory: rating accumulation, visibility and search filtering, Bayesian ranking,
//! and the review intake workflow that feeds them.
//!
//! The rating pipeline (`RatingAccumulator`, `FilterEngine`, `RankingEngine`) is pure. Storage and
//! sentiment scoring sit behind the traits in [`repository`] so the service can be driven by
//! in-memory adapters in tests and by real backends in production.

pub mod accumulator;
pub mod domain;
pub mod filter;
pub mod listing;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use accumulator::{RatingAccumulator, RatingError, ReviewEvent};
pub use domain::{
    ReviewId, ReviewRecord, ReviewSubmission, SortMode, TailorId, TailorRecord, TailorStatus,
    UserId, MAX_STARS, MIN_REVIEWS, WEIGHT_PER_REVIEW,
};
pub use filter::{FilterEngine, TailorFilter};
pub use listing::{ListingPage, ListingQuery, StarBreakdown, TailorCard};
pub use ranking::{RankedTailor, RankingEngine};
pub use repository::{
    RepositoryError, ReviewRepository, SentimentClassifier, SentimentError, TailorRepository,
};
pub use router::tailor_router;
pub use service::{DirectoryError, ReviewReceipt, ReviewServiceError, TailorMarketplaceService};
