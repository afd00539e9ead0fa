use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{SortMode, TailorId, MAX_STARS};
use super::filter::TailorFilter;
use super::ranking::RankedTailor;

/// Listing request as issued by the directory page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub sort: SortMode,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

impl ListingQuery {
    pub fn filter(&self) -> TailorFilter {
        TailorFilter {
            search_query: self.search.clone(),
            required_tags: self.tags.clone(),
        }
    }
}

/// One page of ranked tailors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPage {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
    pub sort: SortMode,
    pub tailors: Vec<TailorCard>,
}

impl ListingPage {
    /// Slice a ranked list. Page numbers start at 1; page 0 is read as page 1.
    pub fn paginate(
        ranked: Vec<RankedTailor>,
        sort: SortMode,
        page: usize,
        per_page: usize,
    ) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let total = ranked.len();
        let total_pages = total.div_ceil(per_page);

        let tailors = ranked
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .map(TailorCard::from)
            .collect();

        Self {
            page,
            per_page,
            total,
            total_pages,
            sort,
            tailors,
        }
    }
}

/// Card-sized projection of a ranked tailor for listing responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TailorCard {
    pub id: TailorId,
    pub business_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub specialities: Vec<String>,
    pub normalized_rating: f64,
    pub rating_label: String,
    pub stars: StarBreakdown,
    pub number_of_reviews: f64,
    pub bayesian_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<RankedTailor> for TailorCard {
    fn from(ranked: RankedTailor) -> Self {
        let RankedTailor {
            record,
            normalized_rating,
            number_of_reviews,
            bayesian_score,
        } = ranked;

        Self {
            id: record.id,
            business_name: record.business_name,
            location: record.location,
            specialities: record.specialities,
            normalized_rating,
            rating_label: format!("{normalized_rating:.1}"),
            stars: StarBreakdown::from_rating(normalized_rating),
            number_of_reviews,
            bayesian_score,
            created_at: record.created_at,
        }
    }
}

/// Full, half, and empty star icons for a five-star row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StarBreakdown {
    pub full: u8,
    pub half: bool,
    pub empty: u8,
}

impl StarBreakdown {
    pub fn from_rating(rating: f64) -> Self {
        let max = f64::from(MAX_STARS);
        let rating = if rating.is_finite() {
            rating.clamp(0.0, max)
        } else {
            0.0
        };

        let full = rating.floor() as u8;
        let half = full < MAX_STARS && rating.fract() >= 0.5;
        let empty = MAX_STARS - full - u8::from(half);

        Self { full, half, empty }
    }
}
