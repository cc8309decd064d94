//! pulsegrid-api: REST API for the PulseGrid registry.
//!
//! Provides axum route handlers for beat ingestion and per-client and
//! fleet-wide health queries.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/api/v1/beats` | Record a beat report |
//! | GET | `/api/v1/clients` | List the latest report per client |
//! | GET | `/api/v1/clients/{id}` | Latest report for one client |
//! | GET | `/api/v1/clients/{id}/status` | Latest status for one client |
//! | DELETE | `/api/v1/clients/{id}` | Evict a client (idempotent) |
//! | GET | `/api/v1/fleet` | Fleet summary incl. any_error/any_dead |
//! | POST | `/api/v1/fleet/reset` | Clear the registry |

pub mod handlers;

use axum::Router;
use axum::routing::{get, post};
use pulsegrid_state::HeartbeatRegistry;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub registry: HeartbeatRegistry,
}

/// Build the complete API router.
pub fn build_router(registry: HeartbeatRegistry) -> Router {
    let state = ApiState { registry };

    let api_routes = Router::new()
        .route("/beats", post(handlers::record_beat))
        .route("/clients", get(handlers::list_clients))
        .route(
            "/clients/{id}",
            get(handlers::get_client).delete(handlers::delete_client),
        )
        .route("/clients/{id}/status", get(handlers::get_client_status))
        .route("/fleet", get(handlers::fleet_summary))
        .route("/fleet/reset", post(handlers::reset_fleet))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}
