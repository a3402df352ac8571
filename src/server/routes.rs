use super::{views, ApiError, AppState};
use crate::error::{Error, Result};
use crate::models::MovieResponse;
use crate::selector::pick_random;
use axum::{
    extract::{ConnectInfo, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;
use std::net::SocketAddr;
use tracing::{debug, error, info, warn};

const SETUP_PATH: &str = "/setup";

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct ServerForm {
    #[serde(default)]
    pub jellyfin_url: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct UserForm {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
}

/// Any field a `/setup` submission may carry.
#[derive(Debug, Default, Deserialize)]
pub struct SetupForm {
    #[serde(default)]
    pub jellyfin_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SetupRequest {
    Connect(ServerForm),
    SelectUser(UserForm),
}

impl From<SetupForm> for SetupRequest {
    fn from(form: SetupForm) -> Self {
        if form.user_id.trim().is_empty() {
            Self::Connect(ServerForm {
                jellyfin_url: form.jellyfin_url,
                api_key: form.api_key,
            })
        } else {
            Self::SelectUser(UserForm {
                user_id: form.user_id,
                user_name: form.user_name,
            })
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RandomQuery {
    pub library: Option<String>,
}

pub async fn index(State(state): State<AppState>) -> Response {
    let config = match state.config.reload() {
        Ok(config) if config.is_complete() => config,
        Ok(_) => {
            debug!("Setup incomplete, redirecting");
            return Redirect::to(SETUP_PATH).into_response();
        }
        Err(e) => {
            debug!("No usable configuration ({}), redirecting to setup", e);
            return Redirect::to(SETUP_PATH).into_response();
        }
    };

    match state.libraries(&config).await {
        Ok(libraries) => Html(views::index(&config.user_name, &libraries)).into_response(),
        Err(e) => {
            error!("Failed to retrieve libraries: {}", e);
            Redirect::to(SETUP_PATH).into_response()
        }
    }
}

pub async fn setup_page() -> Html<String> {
    Html(views::setup_server())
}

/// Combined setup endpoint; the submitted fields decide the step.
pub async fn setup_submit(State(state): State<AppState>, Form(form): Form<SetupForm>) -> Response {
    match SetupRequest::from(form) {
        SetupRequest::Connect(form) => connect(&state, form).await,
        SetupRequest::SelectUser(form) => select_user(&state, form).await,
    }
}

pub async fn setup_server(State(state): State<AppState>, Form(form): Form<ServerForm>) -> Response {
    connect(&state, form).await
}

pub async fn setup_user(State(state): State<AppState>, Form(form): Form<UserForm>) -> Response {
    select_user(&state, form).await
}

/// Checks the server step fields and returns the trimmed URL.
fn validate_server_form(form: &ServerForm) -> Result<&str> {
    let jellyfin_url = form.jellyfin_url.trim();
    if jellyfin_url.is_empty() || form.api_key.is_empty() {
        return Err(Error::invalid_input("URL and API key required"));
    }

    match url::Url::parse(jellyfin_url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(jellyfin_url),
        _ => Err(Error::invalid_input("Jellyfin URL must be an http(s) address")),
    }
}

async fn connect(state: &AppState, form: ServerForm) -> Response {
    let jellyfin_url = match validate_server_form(&form) {
        Ok(url) => url,
        Err(e) => {
            warn!("Rejected server settings: {}", e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    let config = match state
        .config
        .update(|c| c.set_server(jellyfin_url, &form.api_key))
    {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to save configuration: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error saving config").into_response();
        }
    };
    info!("Jellyfin server set to {}", config.jellyfin_url);

    match state.jellyfin(&config).list_users().await {
        Ok(users) => Html(views::setup_user(&users)).into_response(),
        Err(e) => {
            error!("Failed to list Jellyfin users: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unable to connect to Jellyfin. Please check the URL and API key.",
            )
                .into_response()
        }
    }
}

async fn select_user(state: &AppState, form: UserForm) -> Response {
    if form.user_id.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "User selection required").into_response();
    }

    if !state.config.snapshot().is_server_configured() {
        warn!("User selected before the server was configured");
        return Redirect::to(SETUP_PATH).into_response();
    }

    let config = match state
        .config
        .update(|c| c.set_user(form.user_id.trim(), &form.user_name))
    {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to save configuration: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error saving config").into_response();
        }
    };
    info!("Selected Jellyfin user '{}'", config.user_name);

    if let Err(e) = state.refresh_libraries(&config).await {
        error!("Failed to retrieve libraries: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, "Error retrieving libraries").into_response();
    }

    Redirect::to("/").into_response()
}

pub async fn random(
    State(state): State<AppState>,
    Query(query): Query<RandomQuery>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> std::result::Result<Response, ApiError> {
    let Some(library_id) = query.library.filter(|id| !id.is_empty()) else {
        return Err(Error::invalid_input("Library ID required").into());
    };

    let config = state.config.snapshot();
    if !config.is_complete() {
        return Ok(Redirect::to(SETUP_PATH).into_response());
    }

    let client = state.jellyfin(&config);
    let movies = client.list_movies(&library_id).await?;
    let movie = pick_random(&movies)?;

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    info!(
        movie = %movie.name,
        client_ip = %client_ip(&headers, peer.map(|ConnectInfo(addr)| addr)),
        user_agent,
        "Suggested movie"
    );

    Ok(Json(MovieResponse::new(movie, client.base_url())).into_response())
}

/// First `X-Forwarded-For` hop, else the peer address.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}
