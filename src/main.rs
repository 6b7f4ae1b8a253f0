//! Duel Back binary entrypoint wiring configuration, storage, content, and the HTTP router.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use duel_back::{
    config::AppConfig,
    dao::{
        content_store::{ContentStore, memory::MemoryContentStore},
        session_store::{FileSessionStore, MemorySessionStore, SessionStore},
    },
    routes,
    services::session_service,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let content_store = build_content_store(&config)?;
    let session_store: Arc<dyn SessionStore> = match &config.session_file {
        Some(path) => {
            info!(path = %path.display(), "using file-backed session slot");
            Arc::new(FileSessionStore::new(path))
        }
        None => Arc::new(MemorySessionStore::new()),
    };

    let app_state = AppState::new(config, content_store, session_store);
    match session_service::restore(&app_state).await {
        Ok(true) => {}
        Ok(false) => info!("no saved session; starting on the setup screen"),
        Err(err) => warn!(error = %err, "failed to read saved session; starting fresh"),
    }

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

#[cfg(feature = "http-content")]
fn build_content_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ContentStore>> {
    use duel_back::dao::content_store::http::{HttpContentConfig, HttpContentStore};

    match &config.content_base_url {
        Some(base_url) => {
            info!(%base_url, "serving content from the HTTP store");
            let store = HttpContentStore::new(HttpContentConfig::new(base_url.clone()))
                .context("building HTTP content store")?;
            Ok(Arc::new(store))
        }
        None => {
            info!("no content base URL configured; serving built-in content only");
            Ok(Arc::new(MemoryContentStore::new()))
        }
    }
}

#[cfg(not(feature = "http-content"))]
fn build_content_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ContentStore>> {
    if config.content_base_url.is_some() {
        warn!("content base URL ignored: built without the `http-content` feature");
    }
    Ok(Arc::new(MemoryContentStore::new()))
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
