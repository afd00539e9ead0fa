use super::domain::{TailorRecord, MAX_STARS, WEIGHT_PER_REVIEW};

/// Rejection raised before a review touches the running totals.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatingError {
    #[error("invalid review input: {0}")]
    InvalidInput(String),
}

/// Validated review contribution ready to be folded into a tailor's totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewEvent {
    stars: u8,
    sentiment_score: f64,
}

impl ReviewEvent {
    /// Validate the star count and normalize the classifier score into `[-1, 1]`.
    pub fn new(stars: u8, sentiment_score: f64) -> Result<Self, RatingError> {
        validate_stars(stars)?;
        if !sentiment_score.is_finite() {
            return Err(RatingError::InvalidInput(format!(
                "sentiment score must be finite, got {sentiment_score}"
            )));
        }

        Ok(Self {
            stars,
            sentiment_score: sentiment_score.clamp(-1.0, 1.0),
        })
    }

    pub fn stars(&self) -> u8 {
        self.stars
    }

    pub fn sentiment_score(&self) -> f64 {
        self.sentiment_score
    }

    /// Rating units this review adds to `rating_sum`.
    pub fn contribution(&self) -> f64 {
        f64::from(self.stars) + self.sentiment_score
    }
}

pub fn validate_stars(stars: u8) -> Result<(), RatingError> {
    if (1..=MAX_STARS).contains(&stars) {
        Ok(())
    } else {
        Err(RatingError::InvalidInput(format!(
            "stars must be between 1 and {MAX_STARS}, got {stars}"
        )))
    }
}

/// Folds review events into tailor snapshots without mutating the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatingAccumulator;

impl RatingAccumulator {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(
        &self,
        record: &TailorRecord,
        stars: u8,
        sentiment_score: f64,
    ) -> Result<TailorRecord, RatingError> {
        let event = ReviewEvent::new(stars, sentiment_score)?;
        Ok(self.apply_event(record, &event))
    }

    pub fn apply_event(&self, record: &TailorRecord, event: &ReviewEvent) -> TailorRecord {
        let mut updated = record.clone();
        updated.rating_sum += event.contribution();
        updated.rating_weight += WEIGHT_PER_REVIEW;
        updated
    }
}
