//! HTTP route definitions

use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::app::AppState;
use crate::directory::{DirectoryError, MatchConfig, MatchDirectory};
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;
use crate::ws::protocol::normalize_code;

/// Upper bound on directory request handling
const DIRECTORY_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.client_origins);

    let directory_routes = Router::new()
        .route("/matches", post(create_match_handler))
        .route("/matches/:code", get(lookup_match_handler))
        .layer(TimeoutLayer::new(DIRECTORY_TIMEOUT));

    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .merge(directory_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS for the configured origins, or any origin when none are set
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.is_empty() {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %o, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(allowed)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    active_matches: usize,
    connections: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        active_matches: state.sessions.active_matches(),
        connections: state.sessions.total_connections(),
    })
}

// ============================================================================
// Match directory endpoints
// ============================================================================

#[derive(Deserialize)]
struct CreateMatchRequest {
    #[serde(default, alias = "maxPlayers")]
    max_players: Option<usize>,
}

#[derive(Serialize)]
struct CreateMatchResponse {
    code: String,
    max_players: usize,
}

async fn create_match_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateMatchRequest>,
) -> Result<(StatusCode, Json<CreateMatchResponse>), AppError> {
    let max_players = req
        .max_players
        .unwrap_or(state.config.default_max_players);

    let config = state.directory.create(max_players)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateMatchResponse {
            code: config.code,
            max_players: config.max_players,
        }),
    ))
}

async fn lookup_match_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<MatchConfig>, AppError> {
    let code = normalize_code(&code);
    state
        .directory
        .lookup(&code)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No match with code {code}")))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::InvalidPlayerCount(_) => AppError::BadRequest(err.to_string()),
            DirectoryError::CodeSpaceExhausted => AppError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
