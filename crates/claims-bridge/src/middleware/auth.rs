//! Session middleware for protected routes.
//!
//! `require_session` takes the bearer token from the Authorization header,
//! runs it through the auth hooks and binds the resolved principal to the
//! request extensions. Requests that cannot be bound never reach the handler.

use crate::errors::BridgeError;
use crate::hooks::JwtAuthHooks;
use crate::models::Principal;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

/// State for the session middleware.
#[derive(Clone)]
pub struct AuthState {
    pub hooks: Arc<JwtAuthHooks>,
}

fn extract_bearer_token(req: &Request) -> Result<&str, BridgeError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "bridge.middleware.auth", "Missing Authorization header");
            BridgeError::InvalidToken("Missing Authorization header".to_string())
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::debug!(target: "bridge.middleware.auth", "Invalid Authorization header format");
        BridgeError::InvalidToken("Invalid Authorization header format".to_string())
    })
}

/// Bind the token's principal to the request.
///
/// # Response
///
/// - 401 if the header is missing, the token does not verify, or the claims
///   no longer match an account
/// - 500 if the user repository fails
/// - otherwise the next handler runs with the `Principal` in extensions
#[instrument(skip_all, name = "bridge.middleware.session")]
pub async fn require_session(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, BridgeError> {
    let token = extract_bearer_token(&req)?.to_string();

    let principal = state.hooks.authenticate(&token).await?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// Read the principal bound by [`require_session`].
pub trait PrincipalExt {
    /// `None` if the session middleware did not run for this request.
    fn principal(&self) -> Option<&Principal>;
}

impl<B> PrincipalExt for axum::extract::Request<B> {
    fn principal(&self) -> Option<&Principal> {
        self.extensions().get::<Principal>()
    }
}
