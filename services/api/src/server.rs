use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAccountStore};
use crate::routes::with_roster_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use mentor_desk::config::AppConfig;
use mentor_desk::error::AppError;
use mentor_desk::telemetry;
use mentor_desk::workflows::roster::{HttpCredentialNotifier, RosterImportService};
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

    let store = Arc::new(InMemoryAccountStore::default());
    let notifier = Arc::new(HttpCredentialNotifier::new(&config.notifier)?);
    let roster_service = Arc::new(RosterImportService::new(store, notifier.clone()));

    let app = with_roster_routes(roster_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        notifier = %notifier.endpoint(),
        "mentor desk console backend ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
