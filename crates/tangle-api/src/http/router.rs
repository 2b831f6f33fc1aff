//! Axum router configuration with middleware.
//!
//! All REST routes are under `/api/v1/` and require a token; `/health` and
//! the `/ws/events` upgrade are open. Middleware: CORS, tracing.

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Chats
        .route(
            "/chats",
            post(handlers::chat::create_chat).get(handlers::chat::list_chats),
        )
        .route("/chats/{id}", get(handlers::chat::get_chat))
        .route("/chats/{id}/view", get(handlers::chat::linear_view))
        .route("/chats/{id}/title", put(handlers::chat::rename_chat))
        // Message graph
        .route(
            "/chats/{id}/messages",
            post(handlers::message::create_root_message),
        )
        .route("/messages/{id}/branch", post(handlers::message::branch_from))
        .route(
            "/messages/{id}/children",
            get(handlers::message::list_children),
        )
        .route("/messages/{id}/path", get(handlers::message::ancestry_path))
        // Collaboration sessions
        .route(
            "/chats/{id}/collab",
            post(handlers::collab::start_session).get(handlers::collab::active_session),
        )
        .route("/collab/{id}", get(handlers::collab::get_session))
        .route("/collab/{id}/join", post(handlers::collab::join_session))
        .route("/collab/{id}/leave", post(handlers::collab::leave_session))
        .route("/collab/{id}/end", post(handlers::collab::end_session));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/ws/events", get(handlers::ws::ws_handler))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
