use std::cmp::Ordering;

use super::super::domain::SortMode;
use super::RankedTailor;

/// Stable in-place ordering; equal keys keep their filter-stage order.
pub(crate) fn sort(tailors: &mut [RankedTailor], mode: SortMode) {
    match mode {
        SortMode::TopRated => tailors.sort_by(top_rated),
        SortMode::MostReviews => {
            tailors.sort_by(|a, b| b.number_of_reviews.total_cmp(&a.number_of_reviews))
        }
        SortMode::Newest => tailors.sort_by(newest),
    }
}

fn top_rated(a: &RankedTailor, b: &RankedTailor) -> Ordering {
    b.bayesian_score
        .total_cmp(&a.bayesian_score)
        .then_with(|| b.normalized_rating.total_cmp(&a.normalized_rating))
}

// Records without a creation date go last.
fn newest(a: &RankedTailor, b: &RankedTailor) -> Ordering {
    match (a.record.created_at, b.record.created_at) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
