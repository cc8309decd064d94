//! REST API handlers.
//!
//! Each handler reads/writes via `HeartbeatRegistry` and returns JSON
//! responses. Point lookups on an unknown client id are 404; aggregate
//! queries always answer, with absence represented as false/empty.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::info;

use pulsegrid_state::{BeatReport, epoch_millis};

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

// ── Ingestion ──────────────────────────────────────────────────

/// POST /api/v1/beats
pub async fn record_beat(
    State(state): State<ApiState>,
    Json(report): Json<BeatReport>,
) -> impl IntoResponse {
    if report.client_id.is_empty() {
        return error_response("client_id must be non-empty", StatusCode::BAD_REQUEST)
            .into_response();
    }

    let client_id = report.client_id.clone();
    state.registry.record_report(report);
    ApiResponse::ok(serde_json::json!({ "client_id": client_id })).into_response()
}

// ── Clients ────────────────────────────────────────────────────

/// GET /api/v1/clients
pub async fn list_clients(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.registry.list_all())
}

/// GET /api/v1/clients/:id
pub async fn get_client(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.registry.get_report(&id) {
        Ok(report) => ApiResponse::ok(report).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::NOT_FOUND).into_response(),
    }
}

/// GET /api/v1/clients/:id/status
pub async fn get_client_status(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.registry.get_status(&id) {
        Ok(status) => ApiResponse::ok(status).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::NOT_FOUND).into_response(),
    }
}

/// DELETE /api/v1/clients/:id
///
/// Idempotent: evicting an absent client is still a 200.
pub async fn delete_client(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let existed = state.registry.delete_client(&id);
    ApiResponse::ok(serde_json::json!({ "existed": existed }))
}

// ── Fleet ──────────────────────────────────────────────────────

/// Fleet-wide health summary.
#[derive(serde::Serialize)]
pub struct FleetSummary {
    pub total: usize,
    pub any_error: bool,
    pub any_dead: bool,
    pub dead_clients: Vec<String>,
}

/// GET /api/v1/fleet
pub async fn fleet_summary(State(state): State<ApiState>) -> impl IntoResponse {
    let now = epoch_millis();
    let mut dead_clients = state.registry.dead_clients(now);
    dead_clients.sort();

    ApiResponse::ok(FleetSummary {
        total: state.registry.len(),
        any_error: state.registry.any_error(),
        any_dead: !dead_clients.is_empty(),
        dead_clients,
    })
}

/// POST /api/v1/fleet/reset
pub async fn reset_fleet(State(state): State<ApiState>) -> impl IntoResponse {
    state.registry.reset_all();
    info!("registry reset via API");
    ApiResponse::ok("reset")
}
