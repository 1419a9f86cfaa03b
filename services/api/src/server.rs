use crate::cli::ServeArgs;
use crate::infra::{demo_engagement, AppState, InMemoryEngagementStore, InMemoryNotifier};
use crate::routes::with_assessment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use client_engagement::config::AppConfig;
use client_engagement::error::AppError;
use client_engagement::telemetry;
use client_engagement::workflows::assessment::AssessmentService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryEngagementStore::seeded([demo_engagement()]));
    let notifier = Arc::new(InMemoryNotifier::default());
    let assessment_service = Arc::new(AssessmentService::new(
        store,
        notifier,
        config.assessment.clone(),
    ));

    let app = with_assessment_routes(assessment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        max_resolution_attempts = config.assessment.max_resolution_attempts,
        "client engagement service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
