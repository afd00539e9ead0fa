use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain::TailorRecord;

/// User-selected narrowing applied to the directory before ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailorFilter {
    #[serde(default)]
    pub search_query: Option<String>,
    #[serde(default)]
    pub required_tags: BTreeSet<String>,
}

impl TailorFilter {
    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.required_tags.insert(tag.into());
        self
    }

    /// Lowercased query, or `None` when the query is absent or blank. Surrounding whitespace
    /// in a non-blank query is part of the match.
    fn needle(&self) -> Option<String> {
        self.search_query
            .as_deref()
            .filter(|query| !query.trim().is_empty())
            .map(str::to_lowercase)
    }
}

/// Applies the visibility gate followed by search and speciality filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine;

impl FilterEngine {
    pub fn new() -> Self {
        Self
    }

    /// Keeps input order. Hidden storefronts are dropped regardless of the filter.
    pub fn filter(&self, records: Vec<TailorRecord>, filter: &TailorFilter) -> Vec<TailorRecord> {
        let needle = filter.needle();

        records
            .into_iter()
            .filter(TailorRecord::is_visible)
            .filter(|record| match &needle {
                Some(needle) => matches_search(record, needle),
                None => true,
            })
            .filter(|record| {
                filter
                    .required_tags
                    .iter()
                    .all(|tag| record.has_speciality(tag))
            })
            .collect()
    }
}

fn matches_search(record: &TailorRecord, needle: &str) -> bool {
    record.business_name.to_lowercase().contains(needle)
        || record
            .location
            .as_deref()
            .map(|location| location.to_lowercase().contains(needle))
            .unwrap_or(false)
}
