pub mod types;
pub mod config;
pub mod seeding;
pub mod bracket;
pub mod advancement;
pub mod layout;
pub mod connectors;
pub mod interaction;
pub mod controller;
pub mod svg;
pub mod commands;

use types::*;
use config::*;
use commands::*;
use controller::BracketController;
use interaction::InteractionEvent;

use serde::Serialize;
use serde_json::json;
use std::{
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use axum::{
    extract::{rejection::JsonRejection, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const NO_STORE_HEADERS: [(&str, &str); 4] = [
    ("Content-Type", "application/json"),
    ("Cache-Control", "no-store"),
    ("Pragma", "no-cache"),
    ("Expires", "0"),
];

// ── Response helpers ───────────────────────────────────────────────────

fn json_response<T: Serialize>(result: Result<T, String>) -> Response {
    match result {
        Ok(value) => {
            let body = serde_json::to_string(&value).unwrap_or_else(|_| "{}".to_string());
            (NO_STORE_HEADERS, body).into_response()
        }
        Err(message) => error_response(message),
    }
}

fn error_response(message: String) -> Response {
    let status = if is_invariant_error(&message) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(json!({ "error": message }))).into_response()
}

fn rejection_response(rejection: JsonRejection) -> Response {
    error_response(format!("Invalid request body: {}", rejection.body_text()))
}

// ── HTTP handlers ──────────────────────────────────────────────────────

async fn get_state_json(AxumState(state): AxumState<SharedBracketState>) -> Response {
    json_response(bracket_state(&state))
}

async fn get_bracket_svg(AxumState(state): AxumState<SharedBracketState>) -> Response {
    match bracket_svg(&state) {
        Ok(Some(svg)) => (
            [("Content-Type", "image/svg+xml"), ("Cache-Control", "no-store")],
            svg,
        )
            .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, Json(json!({ "error": "No bracket has been generated yet." })))
            .into_response(),
        Err(message) => error_response(message),
    }
}

async fn post_generate(
    AxumState(state): AxumState<SharedBracketState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(request)) => json_response(bracket_generate(request, &state)),
        Err(rejection) => rejection_response(rejection),
    }
}

async fn post_select_winner(
    AxumState(state): AxumState<SharedBracketState>,
    payload: Result<Json<SelectWinnerRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(request)) => json_response(bracket_select_winner(request, &state)),
        Err(rejection) => rejection_response(rejection),
    }
}

async fn post_edit_name(
    AxumState(state): AxumState<SharedBracketState>,
    payload: Result<Json<EditNameRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(request)) => json_response(bracket_edit_name(request, &state)),
        Err(rejection) => rejection_response(rejection),
    }
}

async fn post_reset(AxumState(state): AxumState<SharedBracketState>) -> Response {
    json_response(bracket_reset(&state))
}

async fn post_view_mode(
    AxumState(state): AxumState<SharedBracketState>,
    payload: Result<Json<ViewModeRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(request)) => json_response(bracket_set_view_mode(request, &state)),
        Err(rejection) => rejection_response(rejection),
    }
}

async fn post_interaction(
    AxumState(state): AxumState<SharedBracketState>,
    payload: Result<Json<InteractionEvent>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(event)) => json_response(bracket_interact(event, &state)),
        Err(rejection) => rejection_response(rejection),
    }
}

// ── Server ─────────────────────────────────────────────────────────────

pub fn bracket_router(state: SharedBracketState, static_dir: PathBuf) -> Router {
    Router::new()
        .route("/state.json", get(get_state_json))
        .route("/bracket.svg", get(get_bracket_svg))
        .route("/api/generate", post(post_generate))
        .route("/api/select-winner", post(post_select_winner))
        .route("/api/edit-name", post(post_edit_name))
        .route("/api/reset", post(post_reset))
        .route("/api/view-mode", post(post_view_mode))
        .route("/api/interaction", post(post_interaction))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}

async fn start_bracket_server(state: SharedBracketState, static_dir: PathBuf, addr: &str) -> Result<(), String> {
    let app = bracket_router(state, static_dir);
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!("bracket server failed to bind {addr}: {e}");
        format!("bind {addr}: {e}")
    })?;
    info!("bracket server listening at http://{addr}/");
    axum::serve(listener, app).await.map_err(|e| {
        error!("bracket server error: {e}");
        format!("serve {addr}: {e}")
    })
}

// ── Entry point ────────────────────────────────────────────────────────

pub fn run() -> Result<(), String> {
    load_env_file();

    // Initialize tracing with rolling file output
    let logs_dir = repo_root().join("logs");
    fs::create_dir_all(&logs_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "bracket.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    info!("Tournament bracket server starting");

    let config = load_config_inner()?;
    log_env_warnings(&config);

    let controller = BracketController::new(config.bracket.clone())?;
    let state: SharedBracketState = Arc::new(Mutex::new(controller));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("start tokio runtime: {e}"))?;
    runtime.block_on(start_bracket_server(state, static_dir(&config), &config.bind_addr))
}
