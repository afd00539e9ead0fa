use chrono::{DateTime, TimeZone, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tailor_market::error::AppError;
use tailor_market::marketplace::tailors::{
    RepositoryError, ReviewId, ReviewRecord, ReviewRepository, SentimentClassifier,
    SentimentError, TailorId, TailorRecord, TailorRepository, TailorStatus, UserId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryTailorRepository {
    records: Arc<Mutex<BTreeMap<TailorId, TailorRecord>>>,
}

impl InMemoryTailorRepository {
    pub(crate) fn seeded(records: Vec<TailorRecord>) -> Self {
        let repository = Self::default();
        {
            let mut guard = repository.records.lock().expect("repository mutex poisoned");
            for record in records {
                guard.insert(record.id.clone(), record);
            }
        }
        repository
    }
}

impl TailorRepository for InMemoryTailorRepository {
    fn fetch(&self, id: &TailorId) -> Result<Option<TailorRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn modify<F, E>(&self, id: &TailorId, change: F) -> Result<Option<TailorRecord>, E>
    where
        F: FnOnce(&TailorRecord) -> Result<TailorRecord, E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let Some(current) = guard.get(id) else {
            return Ok(None);
        };
        let updated = change(current)?;
        guard.insert(id.clone(), updated.clone());
        Ok(Some(updated))
    }

    fn snapshot(&self) -> Result<Vec<TailorRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReviewRepository {
    reviews: Arc<Mutex<Vec<ReviewRecord>>>,
}

impl InMemoryReviewRepository {
    pub(crate) fn reviews(&self) -> Vec<ReviewRecord> {
        self.reviews.lock().expect("review mutex poisoned").clone()
    }
}

impl ReviewRepository for InMemoryReviewRepository {
    fn exists(&self, tailor_id: &TailorId, user_id: &UserId) -> Result<bool, RepositoryError> {
        let guard = self.reviews.lock().expect("review mutex poisoned");
        Ok(guard
            .iter()
            .any(|review| &review.tailor_id == tailor_id && &review.user_id == user_id))
    }

    fn insert(&self, review: ReviewRecord) -> Result<ReviewRecord, RepositoryError> {
        let mut guard = self.reviews.lock().expect("review mutex poisoned");
        if guard
            .iter()
            .any(|stored| stored.tailor_id == review.tailor_id && stored.user_id == review.user_id)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.push(review.clone());
        Ok(review)
    }

    fn remove(&self, review_id: &ReviewId) -> Result<(), RepositoryError> {
        let mut guard = self.reviews.lock().expect("review mutex poisoned");
        guard.retain(|review| &review.review_id != review_id);
        Ok(())
    }
}

/// Word-list polarity scorer standing in for the hosted sentiment API during local runs.
pub(crate) struct LexiconSentimentClassifier {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
}

impl Default for LexiconSentimentClassifier {
    fn default() -> Self {
        Self {
            positive: [
                "great", "excellent", "perfect", "amazing", "love", "lovely", "quick", "neat",
                "recommend", "beautiful", "friendly", "good",
            ]
            .into_iter()
            .collect(),
            negative: [
                "poor", "bad", "late", "rude", "loose", "tight", "terrible", "awful", "delay",
                "ruined", "disappointed", "expensive",
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl SentimentClassifier for LexiconSentimentClassifier {
    fn score(&self, text: &str) -> Result<f64, SentimentError> {
        let (mut positive, mut negative) = (0u32, 0u32);
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
        {
            let word = word.to_lowercase();
            if self.positive.contains(word.as_str()) {
                positive += 1;
            } else if self.negative.contains(word.as_str()) {
                negative += 1;
            }
        }

        let hits = positive + negative;
        if hits == 0 {
            return Ok(0.0);
        }
        Ok((f64::from(positive) - f64::from(negative)) / f64::from(hits))
    }
}

pub(crate) fn load_tailors(path: &Path) -> Result<Vec<TailorRecord>, AppError> {
    let raw = fs::read_to_string(path)?;
    let records = serde_json::from_str(&raw)?;
    Ok(records)
}

fn sample_timestamp(month: u32, day: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2024, month, day, 10, 0, 0).single()
}

fn sample_tailor(
    id: &str,
    business_name: &str,
    location: &str,
    specialities: &[&str],
    rating_sum: f64,
    reviews: u32,
    created: (u32, u32),
) -> TailorRecord {
    let mut record = TailorRecord::new(id, business_name);
    record.location = Some(location.to_string());
    record.specialities = specialities.iter().map(|tag| tag.to_string()).collect();
    record.status = TailorStatus::Active;
    record.approved = true;
    record.rating_sum = rating_sum;
    record.rating_weight = f64::from(reviews) * 6.0;
    record.created_at = sample_timestamp(created.0, created.1);
    record
}

/// Small directory used by `demo` and `serve --sample-data`.
pub(crate) fn sample_tailors() -> Vec<TailorRecord> {
    let mut pending = sample_tailor(
        "tailor-006",
        "Needle Point Studio",
        "Karachi",
        &["Alterations"],
        0.0,
        0,
        (9, 1),
    );
    pending.status = TailorStatus::Pending;
    pending.approved = false;

    vec![
        sample_tailor(
            "tailor-001",
            "Royal Stitch House",
            "Lahore",
            &["Men Specialist", "Custom Tailoring"],
            98.4,
            18,
            (1, 14),
        ),
        sample_tailor(
            "tailor-002",
            "Bridal Lane Couture",
            "Islamabad",
            &["Women Specialist", "Custom Tailoring"],
            11.6,
            2,
            (6, 2),
        ),
        sample_tailor(
            "tailor-003",
            "Little Threads",
            "Lahore Cantt",
            &["Kids Specialist", "Alterations"],
            31.5,
            7,
            (3, 21),
        ),
        sample_tailor(
            "tailor-004",
            "Quick Fix Alterations",
            "Karachi",
            &["Alterations", "Men Specialist"],
            40.2,
            11,
            (8, 9),
        ),
        sample_tailor(
            "tailor-005",
            "Fresh Fold",
            "Rawalpindi",
            &["Other"],
            0.0,
            0,
            (10, 5),
        ),
        pending,
    ]
}
