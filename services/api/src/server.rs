use crate::cli::ServeArgs;
use crate::infra::{seed_demo_data, AppState, InMemoryCertificationStore};
use crate::notifier::ApiNotifier;
use crate::routes::with_certification_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use certwatch::certifications::CertificationAlertService;
use certwatch::config::AppConfig;
use certwatch::error::AppError;
use certwatch::telemetry;
use chrono::Local;
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

    let store = InMemoryCertificationStore::default();
    if args.demo_data {
        seed_demo_data(&store, Local::now().date_naive());
    }
    let notifier = ApiNotifier::from_config(&config.smtp);
    let service = Arc::new(CertificationAlertService::new(
        Arc::new(store),
        Arc::new(notifier),
    ));

    let app = with_certification_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "certification alert service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
