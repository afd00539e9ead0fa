use super::common::*;
use crate::config::ListingConfig;
use crate::marketplace::tailors::domain::{ReviewSubmission, SortMode, TailorId, UserId};
use crate::marketplace::tailors::listing::ListingQuery;
use crate::marketplace::tailors::repository::{RepositoryError, SentimentError};
use crate::marketplace::tailors::{
    DirectoryError, RatingError, ReviewServiceError, TailorMarketplaceService,
};
use std::sync::Arc;

fn review(tailor: &str, user: &str, stars: u8) -> ReviewSubmission {
    ReviewSubmission {
        tailor_id: TailorId(tailor.to_string()),
        user_id: UserId(user.to_string()),
        stars,
        message: "Great fit and quick turnaround".to_string(),
    }
}

#[test]
fn submit_review_accumulates_and_persists() {
    let (service, tailors, reviews) = build_service(vec![tailor("t-1", 0.0, 0.0)], 0.2);

    let receipt = service
        .submit_review(review("t-1", "u-1", 5))
        .expect("review accepted");

    assert_close(receipt.tailor.rating_sum, 5.2);
    assert_close(receipt.tailor.rating_weight, 6.0);
    assert_close(receipt.review.sentiment_score, 0.2);
    assert!(receipt.review.review_id.0.starts_with("rev-"));

    let stored = tailors.get("t-1");
    assert_close(stored.rating_sum, 5.2);
    assert_eq!(reviews.count(), 1);
}

#[test]
fn duplicate_review_is_rejected_without_touching_totals() {
    let (service, tailors, reviews) = build_service(vec![tailor("t-1", 0.0, 0.0)], 0.5);
    service
        .submit_review(review("t-1", "u-1", 4))
        .expect("first review accepted");

    match service.submit_review(review("t-1", "u-1", 1)) {
        Err(ReviewServiceError::DuplicateReview { tailor_id, user_id }) => {
            assert_eq!(tailor_id.0, "t-1");
            assert_eq!(user_id.0, "u-1");
        }
        other => panic!("expected duplicate review, got {other:?}"),
    }

    assert_close(tailors.get("t-1").rating_weight, 6.0);
    assert_eq!(reviews.count(), 1);
}

#[test]
fn same_user_may_review_different_tailors() {
    let (service, _, reviews) =
        build_service(vec![tailor("t-1", 0.0, 0.0), tailor("t-2", 0.0, 0.0)], 0.0);

    service.submit_review(review("t-1", "u-1", 4)).expect("first");
    service.submit_review(review("t-2", "u-1", 3)).expect("second");

    assert_eq!(reviews.count(), 2);
}

#[test]
fn concurrent_duplicate_surfaces_as_duplicate_review() {
    let tailors = Arc::new(MemoryTailors::with(vec![tailor("t-1", 0.0, 0.0)]));
    let service = TailorMarketplaceService::new(
        tailors.clone(),
        Arc::new(RacingReviews),
        Arc::new(FixedSentiment(0.0)),
        ListingConfig::default(),
    );

    assert!(matches!(
        service.submit_review(review("t-1", "u-1", 5)),
        Err(ReviewServiceError::DuplicateReview { .. })
    ));
    assert_eq!(tailors.get("t-1").rating_weight, 0.0);
}

#[test]
fn invalid_stars_are_rejected_before_storage() {
    let (service, tailors, reviews) = build_service(vec![tailor("t-1", 0.0, 0.0)], 0.0);

    assert!(matches!(
        service.submit_review(review("t-1", "u-1", 0)),
        Err(ReviewServiceError::InvalidInput(RatingError::InvalidInput(_)))
    ));
    assert_eq!(reviews.count(), 0);
    assert_eq!(tailors.get("t-1").rating_weight, 0.0);
}

#[test]
fn non_finite_sentiment_is_invalid_input() {
    let (service, _, reviews) = build_service(vec![tailor("t-1", 0.0, 0.0)], f64::NAN);

    assert!(matches!(
        service.submit_review(review("t-1", "u-1", 3)),
        Err(ReviewServiceError::InvalidInput(_))
    ));
    assert_eq!(reviews.count(), 0);
}

#[test]
fn unknown_tailor_is_reported() {
    let (service, _, reviews) = build_service(Vec::new(), 0.0);

    match service.submit_review(review("ghost", "u-1", 5)) {
        Err(ReviewServiceError::TailorNotFound(id)) => assert_eq!(id.0, "ghost"),
        other => panic!("expected tailor not found, got {other:?}"),
    }
    assert_eq!(reviews.count(), 0);
}

#[test]
fn classifier_outage_leaves_no_partial_writes() {
    let tailors = Arc::new(MemoryTailors::with(vec![tailor("t-1", 0.0, 0.0)]));
    let reviews = Arc::new(MemoryReviews::default());
    let service = TailorMarketplaceService::new(
        tailors.clone(),
        reviews.clone(),
        Arc::new(OfflineSentiment),
        ListingConfig::default(),
    );

    assert!(matches!(
        service.submit_review(review("t-1", "u-1", 5)),
        Err(ReviewServiceError::Classifier(SentimentError::Unavailable(_)))
    ));
    assert_eq!(reviews.count(), 0);
    assert_eq!(tailors.get("t-1").rating_weight, 0.0);
}

#[test]
fn failed_totals_write_withdraws_the_review_and_allows_retry() {
    let reviews = Arc::new(MemoryReviews::default());
    let service = TailorMarketplaceService::new(
        Arc::new(RejectingWrites(tailor("t-1", 0.0, 0.0))),
        reviews.clone(),
        Arc::new(FixedSentiment(0.0)),
        ListingConfig::default(),
    );

    assert!(matches!(
        service.submit_review(review("t-1", "u-1", 5)),
        Err(ReviewServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
    assert_eq!(reviews.count(), 0);

    match service.submit_review(review("t-1", "u-1", 5)) {
        Err(ReviewServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("retry should reach the store again, got {other:?}"),
    }
    assert_eq!(reviews.count(), 0);
}

#[test]
fn concurrent_reviews_for_one_tailor_both_count() {
    let tailors = Arc::new(MemoryTailors::with(vec![tailor("t-1", 0.0, 0.0)]));
    let reviews = Arc::new(MemoryReviews::default());
    let service = TailorMarketplaceService::new(
        tailors.clone(),
        reviews.clone(),
        Arc::new(GatedSentiment::new(2, 0.0)),
        ListingConfig::default(),
    );

    std::thread::scope(|scope| {
        let handles: Vec<_> = ["u-1", "u-2"]
            .into_iter()
            .map(|user| {
                let service = &service;
                scope.spawn(move || service.submit_review(review("t-1", user, 5)))
            })
            .collect();
        for handle in handles {
            handle
                .join()
                .expect("submitter thread")
                .expect("review accepted");
        }
    });

    let stored = tailors.get("t-1");
    assert_eq!(reviews.count(), 2);
    assert_close(stored.rating_weight, 12.0);
    assert_close(stored.rating_sum, 10.0);
}

#[test]
fn list_filters_ranks_and_paginates() {
    let mut records = directory();
    records[0].rating_sum = 27.0;
    records[0].rating_weight = 30.0;
    records[3].rating_sum = 11.0;
    records[3].rating_weight = 12.0;
    let (service, _, _) = build_service(records, 0.0);

    let query = ListingQuery {
        search: Some("lahore".to_string()),
        tags: ["Men Specialist".to_string()].into_iter().collect(),
        sort: SortMode::TopRated,
        page: None,
        per_page: None,
    };
    let page = service.list(&query).expect("listing");

    assert_eq!(page.total, 2);
    assert_eq!(page.per_page, 60);
    let ids: Vec<_> = page.tailors.iter().map(|card| card.id.0.as_str()).collect();
    assert_eq!(ids, vec!["t-1", "t-4"]);
}

#[test]
fn list_reflects_new_reviews() {
    let (service, _, _) =
        build_service(vec![tailor("t-1", 0.0, 0.0), tailor("t-2", 0.0, 0.0)], 0.4);

    service.submit_review(review("t-2", "u-1", 5)).expect("review");
    let page = service
        .list(&ListingQuery::default())
        .expect("listing");

    assert_eq!(page.tailors[0].id.0, "t-2");
    assert_eq!(page.tailors[0].number_of_reviews, 1.0);
    assert_eq!(page.tailors[1].number_of_reviews, 0.0);
}

#[test]
fn list_propagates_repository_failures() {
    let service = TailorMarketplaceService::new(
        Arc::new(UnavailableTailors),
        Arc::new(MemoryReviews::default()),
        Arc::new(FixedSentiment(0.0)),
        ListingConfig::default(),
    );

    match service.list(&ListingQuery::default()) {
        Err(DirectoryError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected unavailable repository, got {other:?}"),
    }
}

#[test]
fn get_returns_hidden_records_and_reports_missing() {
    let (service, _, _) = build_service(directory(), 0.0);

    let hidden = service
        .get(&TailorId("t-6".to_string()))
        .expect("hidden record is still fetchable");
    assert!(!hidden.approved);

    assert!(matches!(
        service.get(&TailorId("missing".to_string())),
        Err(DirectoryError::Repository(RepositoryError::NotFound))
    ));
}
