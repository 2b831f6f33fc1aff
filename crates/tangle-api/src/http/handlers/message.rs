//! Message graph HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/chats/{id}/messages     - Create the chat's root message
//! - POST /api/v1/messages/{id}/branch    - Branch under an existing message
//! - GET  /api/v1/messages/{id}/children  - Direct children, oldest first
//! - GET  /api/v1/messages/{id}/path      - Root-to-leaf ancestry path
//!
//! Branching is unrestricted: two concurrent posts under the same parent both
//! succeed and become siblings.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use tangle_types::message::{Message, MessageRole};

use crate::http::error::ApiError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::handlers::chat::parse_uuid;
use crate::http::response::{ApiResponse, RequestMeta};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub role: MessageRole,
    pub content: String,
    /// Which model produced an assistant message; ignored for user messages.
    pub model: Option<String>,
}

/// POST /api/v1/chats/{id}/messages - Create the chat's root message.
///
/// Fails with 422 if the chat already has a root.
pub async fn create_root_message(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(chat_id): Path<String>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    let meta = RequestMeta::start();
    let chat_id = parse_uuid(&chat_id)?;

    if req.content.trim().is_empty() {
        return Err(ApiError::Validation("content must not be empty".into()));
    }

    let message = state
        .graph_store
        .create_root_message(&chat_id, &user.id, req.content, req.role, req.model)
        .await?;

    let resp = meta
        .success(message)
        .with_link("chat", &format!("/api/v1/chats/{chat_id}"))
        .with_link("view", &format!("/api/v1/chats/{chat_id}/view"));
    Ok(Json(resp))
}

/// POST /api/v1/messages/{id}/branch - Create a child under this message.
pub async fn branch_from(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(parent_id): Path<String>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    let meta = RequestMeta::start();
    let parent_id = parse_uuid(&parent_id)?;

    if req.content.trim().is_empty() {
        return Err(ApiError::Validation("content must not be empty".into()));
    }

    let message = state
        .graph_store
        .branch_from(&parent_id, &user.id, req.content, req.role, req.model)
        .await?;

    let chat_id = message.chat_id;
    let resp = meta
        .success(message)
        .with_link("parent", &format!("/api/v1/messages/{parent_id}/children"))
        .with_link("view", &format!("/api/v1/chats/{chat_id}/view"));
    Ok(Json(resp))
}

/// GET /api/v1/messages/{id}/children - Direct children of a message.
///
/// More than one entry marks a branch point, rendered as divergent
/// continuations in "mind" mode.
pub async fn list_children(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(message_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Message>>>, ApiError> {
    let meta = RequestMeta::start();
    let id = parse_uuid(&message_id)?;

    let children = state.graph_store.list_children(&id, &user.id).await?;

    let resp = meta
        .success(children)
        .with_link("self", &format!("/api/v1/messages/{id}/children"));
    Ok(Json(resp))
}

/// GET /api/v1/messages/{id}/path - Ancestry path from the root to this
/// message, in conversation order.
pub async fn ancestry_path(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(message_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Message>>>, ApiError> {
    let meta = RequestMeta::start();
    let id = parse_uuid(&message_id)?;

    let path = state.graph_store.ancestry_path(&id, &user.id).await?;

    let resp = meta
        .success(path)
        .with_link("self", &format!("/api/v1/messages/{id}/path"));
    Ok(Json(resp))
}
