//! API token authentication extractor.
//!
//! Extracts and verifies tokens from:
//! - `Authorization: Bearer <token>` header
//! - `X-API-Key: <token>` header
//!
//! Tokens are SHA-256 hashed and resolved against the `api_tokens` table to
//! a user identity. Every protected handler receives the caller as a
//! [`CurrentUser`]; per-call authorization against chats and sessions happens
//! in the core services, not here.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::http::error::ApiError;
use crate::state::AppState;

/// The authenticated caller, resolved from an API token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?;
        let token_hash = hash_token(&token);

        let row: Option<(String, String, String)> =
            sqlx::query_as("SELECT id, user_id, email FROM api_tokens WHERE token_hash = ?")
                .bind(&token_hash)
                .fetch_optional(&state.db_pool.reader)
                .await
                .map_err(|e| ApiError::Internal(format!("Database error: {e}")))?;

        match row {
            Some((token_id, user_id, email)) => {
                // Update last_used_at (best effort, don't fail the request)
                let now = chrono::Utc::now().to_rfc3339();
                let _ = sqlx::query("UPDATE api_tokens SET last_used_at = ? WHERE id = ?")
                    .bind(&now)
                    .bind(&token_id)
                    .execute(&state.db_pool.writer)
                    .await;

                let id = user_id
                    .parse()
                    .map_err(|_| ApiError::Internal("corrupt user id in token record".into()))?;
                Ok(CurrentUser { id, email })
            }
            None => Err(ApiError::Unauthorized(
                "Invalid API token. Provide a valid token via 'Authorization: Bearer <token>' or 'X-API-Key: <token>' header.".to_string(),
            )),
        }
    }
}

/// Extract the token from request headers.
fn extract_token(parts: &Parts) -> Result<String, ApiError> {
    // Try Authorization: Bearer <token>
    if let Some(auth) = parts.headers.get("authorization") {
        let auth_str = auth.to_str().map_err(|_| {
            ApiError::Unauthorized("Invalid Authorization header encoding".to_string())
        })?;
        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.trim().to_string());
        }
    }

    // Try X-API-Key header
    if let Some(token) = parts.headers.get("x-api-key") {
        let token_str = token
            .to_str()
            .map_err(|_| ApiError::Unauthorized("Invalid X-API-Key header encoding".to_string()))?;
        return Ok(token_str.trim().to_string());
    }

    Err(ApiError::Unauthorized(
        "Missing API token. Provide via 'Authorization: Bearer <token>' or 'X-API-Key: <token>' header.".to_string(),
    ))
}

/// Compute SHA-256 hash of a token (lowercase hex).
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{digest:x}")
}

/// Mint a new API token for a user and store its hash.
///
/// Returns the plaintext token; it is shown once and never recoverable from
/// the stored hash.
pub async fn create_token(state: &AppState, email: &str) -> anyhow::Result<String> {
    use rand::RngCore;

    let mut token_bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut token_bytes);
    let plaintext = format!(
        "tangle_{}",
        token_bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>()
    );

    // A second token for a known email belongs to the same user.
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT user_id FROM api_tokens WHERE email = ? LIMIT 1")
            .bind(email)
            .fetch_optional(&state.db_pool.reader)
            .await?;
    let user_id = existing
        .map(|(id,)| id)
        .unwrap_or_else(|| Uuid::now_v7().to_string());

    let token_hash = hash_token(&plaintext);
    let id = Uuid::now_v7().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO api_tokens (id, token_hash, user_id, email, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&token_hash)
    .bind(&user_id)
    .bind(email)
    .bind(&now)
    .execute(&state.db_pool.writer)
    .await?;

    Ok(plaintext)
}
