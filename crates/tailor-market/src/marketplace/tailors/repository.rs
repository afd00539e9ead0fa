use super::domain::{ReviewId, ReviewRecord, TailorId, TailorRecord, UserId};

/// Read/write access to tailor documents so the service can be exercised in isolation.
pub trait TailorRepository: Send + Sync {
    fn fetch(&self, id: &TailorId) -> Result<Option<TailorRecord>, RepositoryError>;

    /// Read-modify-write of one tailor as a single step.
    ///
    /// `change` sees the current stored record and its result is persisted before any other
    /// writer for the same tailor can read. An error from `change` leaves the record untouched.
    /// Returns `Ok(None)` without calling `change` when the tailor does not exist.
    fn modify<F, E>(&self, id: &TailorId, change: F) -> Result<Option<TailorRecord>, E>
    where
        F: FnOnce(&TailorRecord) -> Result<TailorRecord, E>,
        E: From<RepositoryError>;

    /// Every stored tailor, visible or not. Filtering happens downstream.
    fn snapshot(&self) -> Result<Vec<TailorRecord>, RepositoryError>;
}

/// Review storage. `insert` must reject a second review for the same (tailor, user) pair.
pub trait ReviewRepository: Send + Sync {
    fn exists(&self, tailor_id: &TailorId, user_id: &UserId) -> Result<bool, RepositoryError>;
    fn insert(&self, review: ReviewRecord) -> Result<ReviewRecord, RepositoryError>;
    /// Drops a stored review. Removing an unknown id is not an error.
    fn remove(&self, review_id: &ReviewId) -> Result<(), RepositoryError>;
}

/// Text sentiment scoring backed by an external classifier.
pub trait SentimentClassifier: Send + Sync {
    /// Polarity of `text`, nominally in `[-1, 1]`.
    fn score(&self, text: &str) -> Result<f64, SentimentError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Classifier failure.
#[derive(Debug, thiserror::Error)]
pub enum SentimentError {
    #[error("sentiment classifier unavailable: {0}")]
    Unavailable(String),
    #[error("sentiment classifier returned an unusable response: {0}")]
    InvalidResponse(String),
}
