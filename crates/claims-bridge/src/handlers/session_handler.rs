//! Current session handler.

use crate::models::{Principal, SessionResponse};
use axum::{Extension, Json};
use tracing::instrument;

/// Handler for GET /api/v1/session
///
/// Returns the principal bound by the session middleware. Roles come from the
/// repository, not from the token.
///
/// ```json
/// { "user_id": 42, "name": "alice", "roles": ["editor"] }
/// ```
#[instrument(skip_all, name = "bridge.handlers.session")]
pub async fn get_session(Extension(principal): Extension<Principal>) -> Json<SessionResponse> {
    Json(SessionResponse::from(&principal))
}
