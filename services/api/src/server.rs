use crate::cli::ServeArgs;
use crate::infra::{prepare, AppState};
use crate::routes::{with_allocation_routes, AllocationService};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use kitty_alloc::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let prepared = prepare(&args.allocation)?;
    let mut server = prepared.app.server.clone();

    if let Some(host) = args.host.take() {
        server.host = host;
    }
    if let Some(port) = args.port.take() {
        server.port = port;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = AllocationService {
        config: Arc::new(prepared.allocation),
        scorer: Arc::from(prepared.strategy.scorer()),
    };

    let app = with_allocation_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        environment = ?prepared.app.environment,
        strategy = %prepared.strategy,
        %addr,
        "kitty allocator ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
