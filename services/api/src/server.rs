use crate::cli::ServeArgs;
use crate::infra::{AppState, Dataset};
use crate::routes::router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use maintenance_kpi::config::AppConfig;
use maintenance_kpi::error::AppError;
use maintenance_kpi::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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
    if let Some(data) = args.data.take() {
        config.dashboard.data_path = data;
    }

    telemetry::init(&config.telemetry)?;

    let dataset = Dataset::load(
        &config.dashboard.data_path,
        config.dashboard.weekly_capacity_hours,
    )?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        dataset: Arc::new(dataset),
    };

    let app = router()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        data = %config.dashboard.data_path.display(),
        "maintenance KPI dashboard ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
