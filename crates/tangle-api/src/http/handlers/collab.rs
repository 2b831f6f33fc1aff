//! Collaboration session HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/chats/{id}/collab        - Start a session (owner only)
//! - GET  /api/v1/chats/{id}/collab        - The chat's active session
//! - GET  /api/v1/collab/{id}              - Get a session by id
//! - POST /api/v1/collab/{id}/join         - Join an active session
//! - POST /api/v1/collab/{id}/leave        - Leave a session
//! - POST /api/v1/collab/{id}/end          - End a session (owner only)
//!
//! Join and leave are idempotent. End is terminal: an ended session is never
//! resurrected, and joining it returns 404.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;

use tangle_types::collab::CollaborationSession;

use crate::http::error::ApiError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::handlers::chat::parse_uuid;
use crate::http::response::{ApiResponse, RequestMeta};
use crate::state::AppState;

fn session_links(
    resp: ApiResponse<CollaborationSession>,
    session_id: &str,
) -> ApiResponse<CollaborationSession> {
    resp.with_link("self", &format!("/api/v1/collab/{session_id}"))
        .with_link("join", &format!("/api/v1/collab/{session_id}/join"))
        .with_link("end", &format!("/api/v1/collab/{session_id}/end"))
}

/// POST /api/v1/chats/{id}/collab - Start collaborative editing on a chat.
pub async fn start_session(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(chat_id): Path<String>,
) -> Result<Json<ApiResponse<CollaborationSession>>, ApiError> {
    let meta = RequestMeta::start();
    let id = parse_uuid(&chat_id)?;

    let session = state.session_manager.start_session(&id, &user.id).await?;

    let session_id = session.id.to_string();
    Ok(Json(session_links(meta.success(session), &session_id)))
}

/// GET /api/v1/chats/{id}/collab - The chat's active session, 404 if none.
pub async fn active_session(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(chat_id): Path<String>,
) -> Result<Json<ApiResponse<CollaborationSession>>, ApiError> {
    let meta = RequestMeta::start();
    let id = parse_uuid(&chat_id)?;

    let session = state
        .session_manager
        .active_session_for_chat(&id, &user.id)
        .await?;

    let session_id = session.id.to_string();
    Ok(Json(session_links(meta.success(session), &session_id)))
}

/// GET /api/v1/collab/{id} - Get a session (active or ended) by id.
pub async fn get_session(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<CollaborationSession>>, ApiError> {
    let meta = RequestMeta::start();
    let id = parse_uuid(&session_id)?;

    let session = state.session_manager.get_session(&id, &user.id).await?;

    Ok(Json(session_links(meta.success(session), &session_id)))
}

/// POST /api/v1/collab/{id}/join - Join an active session.
pub async fn join_session(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<CollaborationSession>>, ApiError> {
    let meta = RequestMeta::start();
    let id = parse_uuid(&session_id)?;

    let session = state.session_manager.join_session(&id, &user.id).await?;

    Ok(Json(session_links(meta.success(session), &session_id)))
}

/// POST /api/v1/collab/{id}/leave - Leave a session.
pub async fn leave_session(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let meta = RequestMeta::start();
    let id = parse_uuid(&session_id)?;

    state.session_manager.leave_session(&id, &user.id).await?;

    Ok(Json(meta.success(json!({"left": true}))))
}

#[derive(Debug, serde::Deserialize)]
pub struct EndSessionRequest {
    /// The chat the client believes this session belongs to. A mismatch is a
    /// 404, never a cross-chat termination.
    pub chat_id: uuid::Uuid,
}

/// POST /api/v1/collab/{id}/end - End a session. Owner only and terminal;
/// ending an already-ended session is a 404.
pub async fn end_session(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(session_id): Path<String>,
    Json(req): Json<EndSessionRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let meta = RequestMeta::start();
    let id = parse_uuid(&session_id)?;

    state
        .session_manager
        .end_session(&id, &req.chat_id, &user.id)
        .await?;

    let resp = meta
        .success(json!({"ended": true}))
        .with_link("session", &format!("/api/v1/collab/{session_id}"));
    Ok(Json(resp))
}
