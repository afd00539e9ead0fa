use super::super::domain::{TailorRecord, MIN_REVIEWS, WEIGHT_PER_REVIEW};

/// Per-record inputs after defensive clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RatingSignals {
    /// Raw rating sum, clamped at zero. Zero when the record has no reviews.
    pub rating: f64,
    /// Divisor for the star display; never below one review's worth of weight.
    pub effective_weight: f64,
    pub number_of_reviews: f64,
}

pub(crate) fn signals(record: &TailorRecord) -> RatingSignals {
    let weight = finite_or_zero(record.rating_weight);
    if weight <= 0.0 {
        return RatingSignals {
            rating: 0.0,
            effective_weight: WEIGHT_PER_REVIEW,
            number_of_reviews: 0.0,
        };
    }

    RatingSignals {
        rating: finite_or_zero(record.rating_sum).max(0.0),
        effective_weight: weight,
        number_of_reviews: weight / WEIGHT_PER_REVIEW,
    }
}

/// Unweighted mean of the raw rating sums in the batch. Unreviewed records count as zero.
pub(crate) fn global_average(records: &[TailorRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }

    let total: f64 = records.iter().map(raw_sum).sum();
    total / records.len() as f64
}

pub(crate) fn normalized_rating(signals: &RatingSignals) -> f64 {
    signals.rating / signals.effective_weight * 5.0
}

/// Smoothing happens in raw-sum space: thinly reviewed tailors drift toward the batch average.
pub(crate) fn bayesian_score(signals: &RatingSignals, global_average: f64) -> f64 {
    (signals.rating * signals.number_of_reviews + global_average * MIN_REVIEWS)
        / (signals.number_of_reviews + MIN_REVIEWS)
}

fn raw_sum(record: &TailorRecord) -> f64 {
    if finite_or_zero(record.rating_weight) <= 0.0 {
        0.0
    } else {
        finite_or_zero(record.rating_sum)
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
