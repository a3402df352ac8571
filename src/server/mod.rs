use crate::config::{ConfigStore, Configuration};
use crate::error::Result;
use crate::http::HttpClient;
use crate::jellyfin::JellyfinClient;
use crate::library::classify_libraries;
use crate::models::Library;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::Mutex;
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::info;

mod error;
pub mod routes;
mod views;

pub use error::ApiError;

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: ConfigStore,
    pub http: HttpClient,
    /// Last classification result; rebuilt whenever it is found empty.
    libraries: Arc<Mutex<Vec<Library>>>,
}

impl AppState {
    pub fn new(config: ConfigStore, http: HttpClient) -> Self {
        Self {
            config,
            http,
            libraries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn jellyfin(&self, config: &Configuration) -> JellyfinClient {
        JellyfinClient::new(self.http.clone(), config)
    }

    /// Cached libraries, classifying first when the cache is empty.
    pub async fn libraries(&self, config: &Configuration) -> Result<Vec<Library>> {
        let mut cache = self.libraries.lock().await;
        if cache.is_empty() {
            *cache = self.classify(config).await?;
        }
        Ok(cache.clone())
    }

    /// Rebuilds the cache unconditionally. The previous list survives a failed
    /// folder listing.
    pub async fn refresh_libraries(&self, config: &Configuration) -> Result<Vec<Library>> {
        let mut cache = self.libraries.lock().await;
        *cache = self.classify(config).await?;
        Ok(cache.clone())
    }

    async fn classify(&self, config: &Configuration) -> Result<Vec<Library>> {
        let client = self.jellyfin(config);
        let folders = client.list_media_folders().await?;
        Ok(classify_libraries(&folders, &client).await)
    }
}

/// Create the router with all routes
pub fn create_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let mut app = Router::new()
        .route("/", get(routes::index))
        .route("/setup", get(routes::setup_page).post(routes::setup_submit))
        .route("/setup/server", post(routes::setup_server))
        .route("/setup/user", post(routes::setup_user))
        .route("/random", get(routes::random))
        .route("/health", get(health_check));

    if let Some(dir) = static_dir {
        if !dir.exists() {
            tracing::warn!("Static directory {:?} does not exist", dir);
        }
        app = app.merge(static_files(dir));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Static assets, always revalidated by the browser.
fn static_files(dir: PathBuf) -> Router<AppState> {
    Router::new()
        .nest_service("/static", ServeDir::new(dir))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server
pub async fn start_server(addr: SocketAddr, state: AppState, static_dir: PathBuf) -> anyhow::Result<()> {
    let app = create_router(state, Some(static_dir));

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
