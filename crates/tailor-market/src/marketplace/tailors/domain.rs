use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Weight units added to `rating_weight` per review. Each review contributes at most
/// `5 stars + 1 sentiment = 6` rating units, so `rating_weight / 6` recovers the review count.
pub const WEIGHT_PER_REVIEW: f64 = 6.0;

/// Smoothing strength of the Bayesian score, expressed as a number of pseudo-reviews.
pub const MIN_REVIEWS: f64 = 10.0;

/// Top of the display star scale.
pub const MAX_STARS: u8 = 5;

/// Identifier wrapper for tailor businesses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TailorId(pub String);

impl fmt::Display for TailorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for marketplace customers leaving reviews.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for stored reviews.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewId(pub String);

/// Lifecycle status of a tailor's storefront as recorded by the datastore.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TailorStatus {
    Active,
    #[default]
    Pending,
    Inactive,
    Other(String),
}

impl TailorStatus {
    pub fn label(&self) -> &str {
        match self {
            TailorStatus::Active => "active",
            TailorStatus::Pending => "pending",
            TailorStatus::Inactive => "inactive",
            TailorStatus::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for TailorStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "active" => TailorStatus::Active,
            "pending" => TailorStatus::Pending,
            "inactive" => TailorStatus::Inactive,
            _ => TailorStatus::Other(value),
        }
    }
}

impl From<TailorStatus> for String {
    fn from(value: TailorStatus) -> Self {
        value.label().to_string()
    }
}

/// Snapshot of a tailor document as read from the datastore.
///
/// Datastore field names are accepted as aliases so exported documents decode unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailorRecord {
    pub id: TailorId,
    #[serde(default, alias = "businessName")]
    pub business_name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub specialities: Vec<String>,
    #[serde(default)]
    pub status: TailorStatus,
    #[serde(default)]
    pub approved: bool,
    #[serde(default, alias = "rating")]
    pub rating_sum: f64,
    #[serde(default, alias = "total_rating")]
    pub rating_weight: f64,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl TailorRecord {
    /// Fresh, unreviewed storefront.
    pub fn new(id: impl Into<String>, business_name: impl Into<String>) -> Self {
        Self {
            id: TailorId(id.into()),
            business_name: business_name.into(),
            location: None,
            specialities: Vec::new(),
            status: TailorStatus::Pending,
            approved: false,
            rating_sum: 0.0,
            rating_weight: 0.0,
            created_at: None,
        }
    }

    /// Only active and approved storefronts may be listed.
    pub fn is_visible(&self) -> bool {
        self.status == TailorStatus::Active && self.approved
    }

    pub fn has_speciality(&self, tag: &str) -> bool {
        self.specialities.iter().any(|speciality| speciality == tag)
    }
}

/// Review payload submitted by a customer for a tailor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSubmission {
    pub tailor_id: TailorId,
    pub user_id: UserId,
    pub stars: u8,
    #[serde(default)]
    pub message: String,
}

/// Stored review together with the sentiment score that was folded into the tailor totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub review_id: ReviewId,
    pub tailor_id: TailorId,
    pub user_id: UserId,
    pub stars: u8,
    pub message: String,
    pub sentiment_score: f64,
    pub submitted_at: DateTime<Utc>,
}

/// Order requested by the listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    TopRated,
    MostReviews,
    Newest,
}

impl SortMode {
    pub const fn label(self) -> &'static str {
        match self {
            SortMode::TopRated => "Top Rated",
            SortMode::MostReviews => "Most Reviews",
            SortMode::Newest => "Newest",
        }
    }
}

impl std::str::FromStr for SortMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "toprated" => Ok(SortMode::TopRated),
            "mostreviews" => Ok(SortMode::MostReviews),
            "newest" => Ok(SortMode::Newest),
            _ => Err(format!(
                "unknown sort mode '{value}' (expected top_rated, most_reviews, or newest)"
            )),
        }
    }
}
