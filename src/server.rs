//! JSON HTTP API.
//!
//! Serves the public submission endpoint and the staff follow-up board.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/intake` | Submit a form payload `{moduleId, data, honeypot?}` |
//! | `GET`  | `/followups` | Board view: pending and completed partitions |
//! | `PATCH`| `/followups/{id}` | Apply an allow-listed follow-up patch |
//! | `POST` | `/followups/purge` | Remove archived follow-ups |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! The submission endpoint answers every failure mode in the form shape:
//! `{ "ok": true, "requestId": "…" }` or
//! `{ "ok": false, "error": "…", "details": ["field: message", …] }` —
//! including unparseable bodies and wrong methods, so the static form page
//! never has to handle a plain-text response. A non-empty honeypot field
//! gets a silent success without processing.
//!
//! Board endpoints use the uniform error body:
//! `{ "error": { "code": "bad_request", "message": "…" } }` with codes
//! `bad_request` (400), `not_found` (404), `internal` (500). Unexpected
//! failures are logged server-side and mapped to `internal` without detail.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted: the intake forms are
//! static pages served from wherever the campaign hosts them.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use uuid::Uuid;

use crate::board;
use crate::config::Config;
use crate::db;
use crate::forms::{self, FormError, Submission};
use crate::intake::process_intake;
use crate::models::{FollowUpStatus, LiveFollowUp};
use crate::store::{ContactStore, FollowUpPatch};
use crate::sync::{self, SyncChannel};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    store: Arc<ContactStore>,
    sync: Arc<dyn SyncChannel>,
}

/// Starts the HTTP server on the configured bind address. Runs until the
/// process is terminated. Expects `fdesk init` to have created the schema.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::open(&config.db.path).await?;
    let store = Arc::new(ContactStore::new(pool, config.defaults.state.clone()));
    let sync = sync::channel_from_config(&config.sync)?;

    let state = AppState { store, sync };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route(
            "/intake",
            post(handle_intake).fallback(handle_intake_bad_method),
        )
        .route("/followups", get(handle_board))
        .route("/followups/{id}", patch(handle_patch))
        .route("/followups/purge", post(handle_purge))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    info!(bind = %config.server.bind, "API server listening");
    println!("API server listening on http://{}", config.server.bind);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response (board endpoints) ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

/// Upstream and storage failures become an opaque 500. The cause is logged
/// here and never sent to the client.
fn internal(err: anyhow::Error) -> AppError {
    error!(error = %err, "request failed");
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: "server error".to_string(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /intake ============

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

impl SubmitResponse {
    fn ok(request_id: String) -> Self {
        Self {
            ok: true,
            request_id: Some(request_id),
            error: None,
            details: None,
        }
    }

    fn err(error: impl Into<String>, details: Option<Vec<String>>) -> Self {
        Self {
            ok: false,
            request_id: None,
            error: Some(error.into()),
            details,
        }
    }
}

async fn handle_intake(
    State(state): State<AppState>,
    submission: Result<Json<Submission>, JsonRejection>,
) -> (StatusCode, Json<SubmitResponse>) {
    let request_id = Uuid::new_v4().to_string();

    // Unparseable bodies still answer in the form shape.
    let Json(submission) = match submission {
        Ok(body) => body,
        Err(rejection) => {
            return (
                rejection.status(),
                Json(SubmitResponse::err(
                    "invalid request body",
                    Some(vec![rejection.body_text()]),
                )),
            );
        }
    };

    // Bots that fill the hidden field get a success and no records.
    if submission.is_spam() {
        return (StatusCode::OK, Json(SubmitResponse::ok(request_id)));
    }

    let request = match forms::build_intake(&submission.module_id, &submission.data, &request_id) {
        Ok(request) => request,
        Err(FormError::UnknownModule(id)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(SubmitResponse::err(
                    format!(
                        "unknown form module: {}. Known modules: {}",
                        id,
                        forms::MODULE_IDS.join(", ")
                    ),
                    None,
                )),
            );
        }
        Err(FormError::Invalid(details)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(SubmitResponse::err("validation failed", Some(details))),
            );
        }
    };

    match process_intake(&state.store, state.sync.clone(), request).await {
        Ok(_) => (StatusCode::OK, Json(SubmitResponse::ok(request_id))),
        Err(err) => {
            error!(error = %err, module = %submission.module_id, "intake failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SubmitResponse::err("server error", None)),
            )
        }
    }
}

async fn handle_intake_bad_method() -> (StatusCode, Json<SubmitResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(SubmitResponse::err("method not allowed: use POST", None)),
    )
}

// ============ GET /followups ============

async fn handle_board(State(state): State<AppState>) -> Result<Json<board::BoardView>, AppError> {
    let view = board::board(&state.store).await.map_err(internal)?;
    Ok(Json(view))
}

// ============ PATCH /followups/{id} ============

/// Wire shape of a follow-up patch. Only these fields are accepted; any
/// other key in the body is rejected by serde, not silently filtered.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PatchBody {
    status: Option<String>,
    notes: Option<String>,
    archived: Option<bool>,
}

async fn handle_patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<PatchBody>, JsonRejection>,
) -> Result<Json<LiveFollowUp>, AppError> {
    let Json(body) = body.map_err(|rejection| bad_request(rejection.body_text()))?;

    let status = match body.status.as_deref() {
        Some(raw) => Some(
            FollowUpStatus::parse(raw)
                .ok_or_else(|| bad_request(format!("unknown status: {}", raw)))?,
        ),
        None => None,
    };

    let patch = FollowUpPatch {
        status,
        notes: body.notes,
        archived: body.archived,
    };

    let updated = board::apply_patch(&state.store, &id, &patch)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(format!("no follow-up with id: {}", id)))?;

    Ok(Json(updated))
}

// ============ POST /followups/purge ============

#[derive(Serialize)]
struct PurgeResponse {
    removed: u64,
}

async fn handle_purge(State(state): State<AppState>) -> Result<Json<PurgeResponse>, AppError> {
    let removed = board::purge_archived(&state.store).await.map_err(internal)?;
    Ok(Json(PurgeResponse { removed }))
}
