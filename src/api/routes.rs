//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use crate::api::websocket::ws_handler;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// JSON 404 for unknown routes
async fn fallback_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "application/json")],
        Body::from(r#"{"error":"Not Found"}"#),
    )
        .into_response()
}

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // WebSocket for real-time updates
        .route("/ws", get(ws_handler))
        // Factory
        .route("/api/factory", get(handlers::get_factory))
        // Wallets
        .route(
            "/api/wallets",
            get(handlers::list_wallets).post(handlers::create_wallet),
        )
        .route("/api/wallets/{address}", get(handlers::get_wallet))
        // Proposals
        .route(
            "/api/wallets/{address}/proposals",
            get(handlers::list_proposals),
        )
        .route(
            "/api/wallets/{address}/proposals/quorum",
            post(handlers::propose_quorum),
        )
        .route(
            "/api/wallets/{address}/proposals/transfer",
            post(handlers::propose_transfer),
        )
        .route(
            "/api/wallets/{address}/proposals/{id}",
            get(handlers::get_proposal),
        )
        .route(
            "/api/wallets/{address}/proposals/{id}/approve",
            post(handlers::approve_proposal),
        )
        .route(
            "/api/wallets/{address}/proposals/{id}/execute",
            post(handlers::execute_proposal),
        )
        .fallback(fallback_handler)
        // Add state and middleware
        .with_state(state)
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{HostState, Storage, StorageConfig};

    #[test]
    fn test_router_builds() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(StorageConfig::in_dir(temp_dir.path())).unwrap();

        // Overlapping routes panic at registration
        let _router = create_router(ApiState::new(HostState::default(), storage));
    }
}
