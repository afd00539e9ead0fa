use crate::cli::ServeArgs;
use crate::infra::{
    load_tailors, sample_tailors, AppState, InMemoryReviewRepository, InMemoryTailorRepository,
    LexiconSentimentClassifier,
};
use crate::routes::with_marketplace_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tailor_market::config::AppConfig;
use tailor_market::error::AppError;
use tailor_market::marketplace::tailors::TailorMarketplaceService;
use tailor_market::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let seed = match args.seed.take() {
        Some(path) => load_tailors(&path)?,
        None if args.sample_data => sample_tailors(),
        None => Vec::new(),
    };
    info!(tailors = seed.len(), "tailor store seeded");

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let tailors = Arc::new(InMemoryTailorRepository::seeded(seed));
    let reviews = Arc::new(InMemoryReviewRepository::default());
    let classifier = Arc::new(LexiconSentimentClassifier::default());
    let marketplace_service = Arc::new(TailorMarketplaceService::new(
        tailors,
        reviews,
        classifier,
        config.listing,
    ));

    let app = with_marketplace_routes(marketplace_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        page_size = config.listing.page_size,
        "tailor directory ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
