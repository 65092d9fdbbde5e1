use crate::cli::ServeArgs;
use crate::infra::{
    seed_branches, AppState, InMemoryAuditRepository, InMemoryBranchRepository,
    InMemoryReviewRepository, LoggingAuditNotifier,
};
use crate::routes::with_quality_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use giraffe_quality::audits::SanitationAuditService;
use giraffe_quality::branches::BranchDirectory;
use giraffe_quality::config::AppConfig;
use giraffe_quality::error::AppError;
use giraffe_quality::reviews::ManagerReviewService;
use giraffe_quality::scoring::WeightTable;
use giraffe_quality::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let weights = Arc::new(WeightTable::manager_review()?);
    let policy = config.scoring.partial_group_policy;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        weights: Arc::clone(&weights),
        policy,
    };

    let directory = Arc::new(BranchDirectory::new(Arc::new(
        InMemoryBranchRepository::default(),
    )));
    match seed_branches(&directory, &config.seed_branches) {
        Ok(created) => info!(created, "branches seeded"),
        Err(err) => warn!(error = %err, "branch seeding failed"),
    }

    let audits = Arc::new(InMemoryAuditRepository::default());
    let review_service = Arc::new(ManagerReviewService::new(
        Arc::new(InMemoryReviewRepository::default()),
        Arc::clone(&audits),
        directory.repository(),
        weights,
        policy,
    ));
    let audit_service = Arc::new(SanitationAuditService::new(
        audits,
        directory.repository(),
        Arc::new(LoggingAuditNotifier::default()),
    ));

    let app = with_quality_routes(directory, review_service, audit_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        policy = policy.label(),
        "quality management service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
