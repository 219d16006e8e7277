use anyhow::Result;
use axum::{middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    config::{Config, ServerConfig},
    error::AppError,
    handlers::{self, AppState},
    metrics, observability,
    signals::setup_signal_handlers,
    storage::{CatalogStore, JsonFileStore},
    tracker,
};

/// Start the catalog server
///
/// 1. Installs the metrics recorder (when enabled)
/// 2. Builds the observability context and span exporters
/// 3. Serves until SIGTERM/SIGINT, draining in-flight requests
/// 4. Flushes spans that are still buffered
pub async fn start_server(config: Config) -> Result<()> {
    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        Some(Arc::new(metrics::init_metrics()?))
    } else {
        None
    };

    let observability = observability::build_context(&config.observability)?;

    let store: Arc<dyn CatalogStore> =
        Arc::new(JsonFileStore::new(config.storage.catalog_path.clone()));
    let state = AppState::new(store, observability.clone());

    let (shutdown_tx, signal_handle) = setup_signal_handlers();
    let mut shutdown_rx = shutdown_tx.subscribe();

    let app = create_router(
        state,
        metrics_handle.map(|handle| (config.metrics.endpoint.as_str(), handle)),
    );

    let addr = listen_addr(&config.server)?;
    info!(
        service = %config.observability.service_name,
        catalog = %config.storage.catalog_path.display(),
        "Starting course catalog on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = shutdown_rx.recv().await;
        info!("Shutdown signal received, draining connections...");
    })
    .await?;

    signal_handle.await?;

    info!("Flushing pending spans...");
    observability.flush().await;
    info!("Server stopped gracefully");

    Ok(())
}

/// Build the application router
///
/// Catalog routes run inside the request tracker; `/health` and the metrics
/// endpoint do not.
pub fn create_router(
    state: AppState,
    metrics_route: Option<(&str, Arc<PrometheusHandle>)>,
) -> Router {
    let app = Router::new()
        .route("/", get(handlers::home::home))
        .route("/catalog", get(handlers::catalog::list_catalog))
        .route(
            "/add_course",
            get(handlers::add_course::show_form).post(handlers::add_course::submit),
        )
        .route("/course/:code", get(handlers::course_details::course_details))
        .route("/manual-trace", get(handlers::diagnostics::manual_trace))
        .route(
            "/auto-instrumented",
            get(handlers::diagnostics::auto_instrumented),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tracker::track_request,
        ))
        // Added after the tracker layer, so not tracked
        .route("/health", get(handlers::health::health_check))
        .with_state(state);

    let app = match metrics_route {
        Some((path, handle)) => app.merge(
            Router::new()
                .route(path, get(handlers::metrics_handler::metrics))
                .with_state(handle),
        ),
        None => app,
    };

    app.layer(TraceLayer::new_for_http())
}

fn listen_addr(server: &ServerConfig) -> Result<SocketAddr, AppError> {
    let ip = match server.host.parse::<IpAddr>() {
        Ok(ip) => ip,
        Err(_) if server.host == "localhost" => IpAddr::V4(Ipv4Addr::LOCALHOST),
        Err(_) => return Err(AppError::InvalidAddress(server.host.clone())),
    };
    Ok(SocketAddr::new(ip, server.port))
}
