use crate::infra::{
    load_tailors, sample_tailors, InMemoryReviewRepository, InMemoryTailorRepository,
    LexiconSentimentClassifier,
};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tailor_market::config::ListingConfig;
use tailor_market::error::AppError;
use tailor_market::marketplace::tailors::{
    FilterEngine, ListingPage, ListingQuery, RankingEngine, ReviewServiceError, ReviewSubmission,
    SortMode, StarBreakdown, TailorCard, TailorFilter, TailorId, TailorMarketplaceService, UserId,
};

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// JSON array of tailor documents
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Sort mode: top_rated, most_reviews, or newest
    #[arg(long, default_value = "top_rated")]
    pub(crate) sort: SortMode,
    /// Case-insensitive search over business name and location
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Required speciality (repeat for several; all must match)
    #[arg(long = "tag")]
    pub(crate) tags: Vec<String>,
    /// Page to print (starting at 1)
    #[arg(long, default_value_t = 1)]
    pub(crate) page: usize,
    /// Tailors per page
    #[arg(long, default_value_t = tailor_market::config::DEFAULT_LISTING_PAGE_SIZE)]
    pub(crate) per_page: usize,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Sort mode used for the listing output
    #[arg(long, default_value = "top_rated")]
    pub(crate) sort: SortMode,
    /// Skip the review submission portion of the demo
    #[arg(long)]
    pub(crate) skip_reviews: bool,
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        input,
        sort,
        search,
        tags,
        page,
        per_page,
    } = args;

    let records = load_tailors(&input)?;
    let received = records.len();
    let filter = TailorFilter {
        search_query: search,
        required_tags: tags.into_iter().collect(),
    };

    let visible = FilterEngine::new().filter(records, &filter);
    let ranking = RankingEngine::new();
    let global_average = ranking.global_average(&visible);
    let listing = ListingPage::paginate(ranking.rank(visible, sort), sort, page, per_page);

    println!(
        "Ranked {} of {} tailors by {} (batch average {:.2})",
        listing.total,
        received,
        sort.label(),
        global_average
    );
    render_listing(&listing);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { sort, skip_reviews } = args;

    let tailors = Arc::new(InMemoryTailorRepository::seeded(sample_tailors()));
    let reviews = Arc::new(InMemoryReviewRepository::default());
    let service = TailorMarketplaceService::new(
        tailors,
        reviews.clone(),
        Arc::new(LexiconSentimentClassifier::default()),
        ListingConfig::default(),
    );

    let query = ListingQuery {
        sort,
        ..ListingQuery::default()
    };

    println!("Tailor directory demo ({})", sort.label());
    println!("\nListing before reviews");
    render_listing(&service.list(&query)?);

    if skip_reviews {
        return Ok(());
    }

    println!("\nSubmitting reviews");
    let submissions = [
        ("tailor-002", "user-101", 5, "Beautiful bridal work, perfect fit"),
        ("tailor-002", "user-102", 5, "Excellent and friendly, highly recommend"),
        ("tailor-005", "user-101", 4, "Quick and neat alterations"),
        ("tailor-004", "user-103", 2, "Late delivery and loose seams"),
        ("tailor-002", "user-101", 1, "Trying to review twice"),
        ("tailor-404", "user-104", 5, "Unknown storefront"),
    ];

    for (tailor, user, stars, message) in submissions {
        let outcome = service.submit_review(ReviewSubmission {
            tailor_id: TailorId(tailor.to_string()),
            user_id: UserId(user.to_string()),
            stars,
            message: message.to_string(),
        });

        match outcome {
            Ok(receipt) => println!(
                "  - {user} -> {tailor}: {stars} stars, sentiment {:+.2}, totals {:.1}/{}",
                receipt.review.sentiment_score,
                receipt.tailor.rating_sum,
                receipt.tailor.rating_weight
            ),
            Err(ReviewServiceError::DuplicateReview { .. }) => {
                println!("  - {user} -> {tailor}: rejected, already reviewed")
            }
            Err(error) => println!("  - {user} -> {tailor}: rejected, {error}"),
        }
    }
    println!("  {} review(s) stored", reviews.reviews().len());

    println!("\nListing after reviews");
    render_listing(&service.list(&query)?);
    Ok(())
}

fn render_listing(listing: &ListingPage) {
    if listing.tailors.is_empty() {
        println!("  (no tailors match)");
        return;
    }

    println!(
        "  page {}/{} · {} per page · {} match(es)",
        listing.page,
        listing.total_pages.max(1),
        listing.per_page,
        listing.total
    );
    let offset = (listing.page - 1) * listing.per_page;
    for (index, card) in listing.tailors.iter().enumerate() {
        println!("  {}", render_card(offset + index + 1, card));
    }
}

fn render_card(position: usize, card: &TailorCard) -> String {
    format!(
        "{position:>3}. {:<24} {} {} ({:.0} reviews, score {:.2}){}",
        card.business_name,
        render_stars(&card.stars),
        card.rating_label,
        card.number_of_reviews,
        card.bayesian_score,
        card.location
            .as_deref()
            .map(|location| format!(" · {location}"))
            .unwrap_or_default()
    )
}

fn render_stars(stars: &StarBreakdown) -> String {
    let mut row = "★".repeat(usize::from(stars.full));
    if stars.half {
        row.push('½');
    }
    row.push_str(&"☆".repeat(usize::from(stars.empty)));
    row
}
