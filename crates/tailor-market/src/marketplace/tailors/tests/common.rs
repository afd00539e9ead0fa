use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Barrier, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::config::ListingConfig;
use crate::marketplace::tailors::domain::{
    ReviewId, ReviewRecord, TailorId, TailorRecord, TailorStatus, UserId,
};
use crate::marketplace::tailors::repository::{
    RepositoryError, ReviewRepository, SentimentClassifier, SentimentError, TailorRepository,
};
use crate::marketplace::tailors::{tailor_router, TailorMarketplaceService};

pub(super) const EPSILON: f64 = 1e-9;

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn created(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Visible tailor with the given totals.
pub(super) fn tailor(id: &str, rating_sum: f64, rating_weight: f64) -> TailorRecord {
    TailorRecord {
        id: TailorId(id.to_string()),
        business_name: format!("Tailor {id}"),
        location: Some("Karachi".to_string()),
        specialities: Vec::new(),
        status: TailorStatus::Active,
        approved: true,
        rating_sum,
        rating_weight,
        created_at: None,
    }
}

pub(super) fn storefront(
    id: &str,
    business_name: &str,
    location: Option<&str>,
    specialities: &[&str],
) -> TailorRecord {
    let mut record = tailor(id, 0.0, 0.0);
    record.business_name = business_name.to_string();
    record.location = location.map(str::to_string);
    record.specialities = specialities.iter().map(|tag| tag.to_string()).collect();
    record
}

pub(super) fn directory() -> Vec<TailorRecord> {
    let mut hidden_pending = storefront("t-5", "Pending Pleats", Some("Karachi"), &["Alterations"]);
    hidden_pending.status = TailorStatus::Pending;

    let mut hidden_unapproved = storefront(
        "t-6",
        "Unapproved Ateliers",
        Some("Lahore"),
        &["Men Specialist", "Alterations"],
    );
    hidden_unapproved.approved = false;

    vec![
        storefront(
            "t-1",
            "Royal Stitch",
            Some("Lahore"),
            &["Men Specialist", "Custom Tailoring"],
        ),
        storefront(
            "t-2",
            "Little Threads",
            Some("Islamabad"),
            &["Kids Specialist", "Alterations"],
        ),
        storefront(
            "t-3",
            "Bridal Lane",
            None,
            &["Women Specialist", "Custom Tailoring", "Alterations"],
        ),
        storefront(
            "t-4",
            "Quick Fix",
            Some("lahore cantt"),
            &["Men Specialist", "Alterations"],
        ),
        hidden_pending,
        hidden_unapproved,
    ]
}

pub(super) fn ids<'a>(records: impl IntoIterator<Item = &'a TailorRecord>) -> Vec<String> {
    records.into_iter().map(|record| record.id.0.clone()).collect()
}

#[derive(Default, Clone)]
pub(super) struct MemoryTailors {
    pub(super) records: Arc<Mutex<BTreeMap<TailorId, TailorRecord>>>,
}

impl MemoryTailors {
    pub(super) fn with(records: Vec<TailorRecord>) -> Self {
        let store = Self::default();
        {
            let mut guard = store.records.lock().expect("tailor mutex poisoned");
            for record in records {
                guard.insert(record.id.clone(), record);
            }
        }
        store
    }

    pub(super) fn get(&self, id: &str) -> TailorRecord {
        self.records
            .lock()
            .expect("tailor mutex poisoned")
            .get(&TailorId(id.to_string()))
            .cloned()
            .expect("tailor present")
    }
}

impl TailorRepository for MemoryTailors {
    fn fetch(&self, id: &TailorId) -> Result<Option<TailorRecord>, RepositoryError> {
        let guard = self.records.lock().expect("tailor mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn modify<F, E>(&self, id: &TailorId, change: F) -> Result<Option<TailorRecord>, E>
    where
        F: FnOnce(&TailorRecord) -> Result<TailorRecord, E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.records.lock().expect("tailor mutex poisoned");
        let Some(current) = guard.get(id) else {
            return Ok(None);
        };
        let updated = change(current)?;
        guard.insert(id.clone(), updated.clone());
        Ok(Some(updated))
    }

    fn snapshot(&self) -> Result<Vec<TailorRecord>, RepositoryError> {
        let guard = self.records.lock().expect("tailor mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryReviews {
    pub(super) reviews: Arc<Mutex<HashMap<(TailorId, UserId), ReviewRecord>>>,
}

impl MemoryReviews {
    pub(super) fn count(&self) -> usize {
        self.reviews.lock().expect("review mutex poisoned").len()
    }
}

impl ReviewRepository for MemoryReviews {
    fn exists(&self, tailor_id: &TailorId, user_id: &UserId) -> Result<bool, RepositoryError> {
        let guard = self.reviews.lock().expect("review mutex poisoned");
        Ok(guard.contains_key(&(tailor_id.clone(), user_id.clone())))
    }

    fn insert(&self, review: ReviewRecord) -> Result<ReviewRecord, RepositoryError> {
        let mut guard = self.reviews.lock().expect("review mutex poisoned");
        let key = (review.tailor_id.clone(), review.user_id.clone());
        if guard.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(key, review.clone());
        Ok(review)
    }

    fn remove(&self, review_id: &ReviewId) -> Result<(), RepositoryError> {
        let mut guard = self.reviews.lock().expect("review mutex poisoned");
        guard.retain(|_, review| &review.review_id != review_id);
        Ok(())
    }
}

/// Reports "no prior review" but refuses every insert, mimicking a concurrent duplicate.
pub(super) struct RacingReviews;

impl ReviewRepository for RacingReviews {
    fn exists(&self, _tailor_id: &TailorId, _user_id: &UserId) -> Result<bool, RepositoryError> {
        Ok(false)
    }

    fn insert(&self, _review: ReviewRecord) -> Result<ReviewRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn remove(&self, _review_id: &ReviewId) -> Result<(), RepositoryError> {
        Ok(())
    }
}

pub(super) struct UnavailableTailors;

impl TailorRepository for UnavailableTailors {
    fn fetch(&self, _id: &TailorId) -> Result<Option<TailorRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("datastore offline".to_string()))
    }

    fn modify<F, E>(&self, _id: &TailorId, _change: F) -> Result<Option<TailorRecord>, E>
    where
        F: FnOnce(&TailorRecord) -> Result<TailorRecord, E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("datastore offline".to_string()).into())
    }

    fn snapshot(&self) -> Result<Vec<TailorRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("datastore offline".to_string()))
    }
}

/// Reads succeed but every write is lost after `change` has run, like a dropped commit.
pub(super) struct RejectingWrites(pub(super) TailorRecord);

impl TailorRepository for RejectingWrites {
    fn fetch(&self, id: &TailorId) -> Result<Option<TailorRecord>, RepositoryError> {
        Ok((self.0.id == *id).then(|| self.0.clone()))
    }

    fn modify<F, E>(&self, id: &TailorId, change: F) -> Result<Option<TailorRecord>, E>
    where
        F: FnOnce(&TailorRecord) -> Result<TailorRecord, E>,
        E: From<RepositoryError>,
    {
        if self.0.id != *id {
            return Ok(None);
        }
        change(&self.0)?;
        Err(RepositoryError::Unavailable("commit rejected".to_string()).into())
    }

    fn snapshot(&self) -> Result<Vec<TailorRecord>, RepositoryError> {
        Ok(vec![self.0.clone()])
    }
}

pub(super) struct FixedSentiment(pub(super) f64);

impl SentimentClassifier for FixedSentiment {
    fn score(&self, _text: &str) -> Result<f64, SentimentError> {
        Ok(self.0)
    }
}

pub(super) struct OfflineSentiment;

impl SentimentClassifier for OfflineSentiment {
    fn score(&self, _text: &str) -> Result<f64, SentimentError> {
        Err(SentimentError::Unavailable("connection refused".to_string()))
    }
}

/// Holds every caller at the classifier until `parties` submissions have all arrived.
pub(super) struct GatedSentiment {
    gate: Barrier,
    score: f64,
}

impl GatedSentiment {
    pub(super) fn new(parties: usize, score: f64) -> Self {
        Self {
            gate: Barrier::new(parties),
            score,
        }
    }
}

impl SentimentClassifier for GatedSentiment {
    fn score(&self, _text: &str) -> Result<f64, SentimentError> {
        self.gate.wait();
        Ok(self.score)
    }
}

pub(super) type MemoryService = TailorMarketplaceService<MemoryTailors, MemoryReviews, FixedSentiment>;

pub(super) fn build_service(
    records: Vec<TailorRecord>,
    sentiment: f64,
) -> (MemoryService, Arc<MemoryTailors>, Arc<MemoryReviews>) {
    let tailors = Arc::new(MemoryTailors::with(records));
    let reviews = Arc::new(MemoryReviews::default());
    let service = TailorMarketplaceService::new(
        tailors.clone(),
        reviews.clone(),
        Arc::new(FixedSentiment(sentiment)),
        ListingConfig::default(),
    );
    (service, tailors, reviews)
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    tailor_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
