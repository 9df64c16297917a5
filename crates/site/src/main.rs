//! Colloquium site server
//!
//! Serves the research community pages as JSON page contexts for the
//! template renderer, plus the admin list endpoint and health probes.

mod handlers;
mod middleware;

use anyhow::Context;
use axum::{http::StatusCode, middleware::from_fn, routing::get, Router};
use colloquium_common::{config::AppConfig, db::DbPool, metrics};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;
    let config = Arc::new(config);

    init_tracing(&config)?;
    info!(
        service = %config.observability.service_name,
        "Starting Colloquium site v{}",
        colloquium_common::VERSION
    );

    init_metrics(&config)?;

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    if config.database.auto_migrate {
        colloquium_common::db::create_schema(db.write()).await?;
    }

    let state = AppState {
        config: config.clone(),
        db,
    };

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // In-flight requests get the configured grace period once a signal arrives
    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    });

    let grace = config.shutdown_timeout();
    tokio::select! {
        result = server.into_future() => result?,
        _ = async {
            if signalled_rx.await.is_ok() {
                tokio::time::sleep(grace).await;
            } else {
                std::future::pending::<()>().await;
            }
        } => warn!(grace_secs = grace.as_secs(), "Shutdown grace period elapsed"),
    }

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.observability.log_level))?;

    let fmt_layer = if config.observability.json_logging {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}

/// Install the Prometheus recorder with its own scrape listener
fn init_metrics(config: &AppConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            metrics::LATENCY_BUCKETS,
        )?
        .install()
        .context("Failed to install Prometheus exporter")?;

    metrics::register_metrics();
    info!(port = config.observability.metrics_port, "Metrics exporter listening");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let timeout =
        TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, state.config.request_timeout());

    let pages = Router::new()
        .route("/", get(handlers::pages::home))
        .route("/events/", get(handlers::pages::events_list))
        .route("/events/{id}/", get(handlers::pages::event_detail))
        .route("/projects/", get(handlers::pages::projects_list))
        .route("/projects/{id}/", get(handlers::pages::project_detail))
        .route("/researchers/", get(handlers::pages::researchers_list))
        .route("/researchers/{id}/", get(handlers::pages::researcher_detail))
        .route("/references/", get(handlers::pages::references_list))
        .route("/posts/", get(handlers::pages::posts_list))
        .route("/posts/{slug}/", get(handlers::pages::post_detail))
        .route("/acc2025/", get(handlers::pages::acc2025));

    let admin = Router::new()
        .route("/admin/", get(handlers::admin::capabilities))
        .route("/admin/{entity}/", get(handlers::admin::list));

    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .merge(pages)
        .merge(admin)
        .route_layer(from_fn(middleware::track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(timeout)
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
