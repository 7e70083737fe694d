use crate::cli::ServeArgs;
use crate::infra::{AdminServices, AppState};
use crate::routes::admin_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use teranga_admin::config::AppConfig;
use teranga_admin::error::AppError;
use teranga_admin::telemetry;
use teranga_admin::workflows::listings::spawn_auto_publish_sweeper;
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let services = AdminServices::in_memory();
    let sweeper = spawn_auto_publish_sweeper(
        Arc::clone(&services.listings),
        config.lifecycle.sweep_interval,
    );

    let app = admin_routes(&services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "teranga admin console ready");

    let served = axum::serve(listener, app).await;
    sweeper.abort();
    served?;
    Ok(())
}
