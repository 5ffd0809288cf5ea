use anyhow::{anyhow, Context};
use axum::http::HeaderValue;
use dashboard_api::{api_routes, config, db, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::load_config().context("failed to load configuration")?;
    config::init_tracing(app_config.log_level(), app_config.log_json);

    info!(
        environment = %app_config.environment,
        "Starting dashboard API"
    );

    let pool = db::establish_connection_from_app_config(&app_config)
        .await
        .context("failed to connect to the database")?;

    if app_config.auto_migrate {
        db::run_migrations(&pool)
            .await
            .context("database migration failed")?;
    }

    let cors = build_cors_layer(&app_config)?;
    let addr = format!("{}:{}", app_config.host, app_config.port);
    let state = Arc::new(AppState::new(app_config, pool));

    let app = api_routes(Arc::clone(&state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(30)))
        .layer(cors);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped, closing database pool");
    match Arc::try_unwrap(state).ok().and_then(|s| Arc::try_unwrap(s.db).ok()) {
        Some(pool) => {
            if let Err(e) = db::close_pool(pool).await {
                error!("failed to close database pool: {}", e);
            }
        }
        None => warn!("database pool still referenced at shutdown, skipping close"),
    }

    Ok(())
}

/// Explicitly configured origins win; otherwise permissive CORS is allowed
/// only in development or when opted into.
fn build_cors_layer(cfg: &config::AppConfig) -> anyhow::Result<CorsLayer> {
    if let Some(raw) = cfg.cors_allowed_origins.as_deref().filter(|s| !s.trim().is_empty()) {
        let origins = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .map_err(|_| anyhow!("invalid CORS origin: {}", origin))
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any));
    }

    if cfg.should_allow_permissive_cors() {
        warn!("CORS is permissive; set APP__CORS_ALLOWED_ORIGINS for deployment");
        return Ok(CorsLayer::permissive());
    }

    Err(anyhow!(
        "no CORS origins configured; set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN"
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
