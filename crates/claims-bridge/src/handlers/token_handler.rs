//! Token issuance handler.

use crate::errors::BridgeError;
use crate::models::{Identity, Principal, TokenResponse};
use crate::routes::AppState;
use axum::{extract::State, Extension, Json};
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /api/v1/auth/token
///
/// Issues a fresh token for the principal the caller's current token resolved
/// to. Name and roles are taken from the repository account, so a renamed
/// account gets a token carrying the new name.
#[instrument(skip_all, name = "bridge.handlers.token")]
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<TokenResponse>, BridgeError> {
    let response = state.hooks.on_generate(&Identity::from(&principal))?;
    Ok(Json(response))
}
