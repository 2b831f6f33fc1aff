//! Chat HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/chats            - Create a chat from its first message
//! - GET  /api/v1/chats            - List the caller's chats
//! - GET  /api/v1/chats/{id}       - Get a chat
//! - GET  /api/v1/chats/{id}/view  - Linear projection of the graph
//! - PUT  /api/v1/chats/{id}/title - Rename (owner only)

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tangle_types::chat::{Chat, ChatSummary};
use tangle_types::message::Message;

use crate::http::error::ApiError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::response::{ApiResponse, RequestMeta};
use crate::state::AppState;

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
pub(super) fn parse_uuid(s: &str) -> Result<Uuid, ApiError> {
    s.parse::<Uuid>()
        .map_err(|_| ApiError::Validation(format!("Invalid UUID: {s}")))
}

#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    /// The first user message; also seeds the synthesized title.
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CreateChatResponse {
    pub chat: Chat,
    pub root: Message,
}

/// POST /api/v1/chats - Create a chat from its first user message.
pub async fn create_chat(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateChatRequest>,
) -> Result<Json<ApiResponse<CreateChatResponse>>, ApiError> {
    let meta = RequestMeta::start();

    if req.content.trim().is_empty() {
        return Err(ApiError::Validation("content must not be empty".into()));
    }

    let (chat, root) = state.chat_service.create_chat(&user.id, req.content).await?;

    let self_link = format!("/api/v1/chats/{}", chat.id);
    let resp = meta
        .success(CreateChatResponse { chat, root })
        .with_link("self", &self_link)
        .with_link("view", &format!("{self_link}/view"));
    Ok(Json(resp))
}

/// GET /api/v1/chats - List the caller's chats, newest first.
pub async fn list_chats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<ChatSummary>>>, ApiError> {
    let meta = RequestMeta::start();

    let chats = state.chat_service.list_chats(&user.id).await?;

    let resp = meta.success(chats).with_link("self", "/api/v1/chats");
    Ok(Json(resp))
}

/// GET /api/v1/chats/{id} - Get a chat the caller may access.
pub async fn get_chat(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(chat_id): Path<String>,
) -> Result<Json<ApiResponse<Chat>>, ApiError> {
    let meta = RequestMeta::start();
    let id = parse_uuid(&chat_id)?;

    let chat = state.chat_service.get_chat(&id, &user.id).await?;

    let resp = meta
        .success(chat)
        .with_link("self", &format!("/api/v1/chats/{id}"))
        .with_link("view", &format!("/api/v1/chats/{id}/view"));
    Ok(Json(resp))
}

/// GET /api/v1/chats/{id}/view - The linear "chat" projection: root-to-leaf
/// path ending at the most recently created leaf.
pub async fn linear_view(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(chat_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Message>>>, ApiError> {
    let meta = RequestMeta::start();
    let id = parse_uuid(&chat_id)?;

    let path = state.graph_store.linear_view(&id, &user.id).await?;

    let resp = meta
        .success(path)
        .with_link("self", &format!("/api/v1/chats/{id}/view"))
        .with_link("chat", &format!("/api/v1/chats/{id}"));
    Ok(Json(resp))
}

#[derive(Debug, Deserialize)]
pub struct RenameChatRequest {
    pub title: String,
}

/// PUT /api/v1/chats/{id}/title - Owner-set custom title.
pub async fn rename_chat(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(chat_id): Path<String>,
    Json(req): Json<RenameChatRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let meta = RequestMeta::start();
    let id = parse_uuid(&chat_id)?;

    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("title must not be empty".into()));
    }

    state.chat_service.rename_chat(&id, &user.id, req.title).await?;

    let resp = meta
        .success(serde_json::json!({"renamed": true}))
        .with_link("chat", &format!("/api/v1/chats/{id}"));
    Ok(Json(resp))
}
