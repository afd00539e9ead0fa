mod order;
mod rules;

use serde::{Deserialize, Serialize};

use super::domain::{SortMode, TailorRecord};

/// Stateless ranker. Derived metrics are recomputed on every call and never stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingEngine;

impl RankingEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn rank(&self, records: Vec<TailorRecord>, mode: SortMode) -> Vec<RankedTailor> {
        let global_average = rules::global_average(&records);

        let mut ranked: Vec<RankedTailor> = records
            .into_iter()
            .map(|record| {
                let signals = rules::signals(&record);
                RankedTailor {
                    normalized_rating: rules::normalized_rating(&signals),
                    number_of_reviews: signals.number_of_reviews,
                    bayesian_score: rules::bayesian_score(&signals, global_average),
                    record,
                }
            })
            .collect();

        order::sort(&mut ranked, mode);
        ranked
    }

    /// Batch mean of raw rating sums, as used by the Bayesian prior.
    pub fn global_average(&self, records: &[TailorRecord]) -> f64 {
        rules::global_average(records)
    }
}

/// A tailor snapshot with the display metrics derived for one ranking pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTailor {
    #[serde(flatten)]
    pub record: TailorRecord,
    pub normalized_rating: f64,
    pub number_of_reviews: f64,
    pub bayesian_score: f64,
}
