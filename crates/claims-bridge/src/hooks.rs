//! Lifecycle hooks binding the claim protocol to the token transport.
//!
//! The transport calls `on_generate` when a token is minted, `on_validate`
//! once a token has decoded, and `on_valid` once validation accepted it.
//! `authenticate` runs the whole chain for one bearer token.

use crate::claims::ClaimSet;
use crate::config::Config;
use crate::crypto::TokenCodec;
use crate::errors::BridgeError;
use crate::models::{Identity, Principal, TokenResponse};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_token_issuance;
use crate::repositories::UserRepository;
use crate::services::{
    ClaimIssuer, ClaimValidator, PrincipalResolver, Resolution, ValidationOutcome,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

pub struct JwtAuthHooks {
    codec: TokenCodec,
    issuer: ClaimIssuer,
    validator: ClaimValidator,
    resolver: PrincipalResolver,
    users: Arc<dyn UserRepository>,
}

impl JwtAuthHooks {
    pub fn new(
        codec: TokenCodec,
        issuer: ClaimIssuer,
        validator: ClaimValidator,
        resolver: PrincipalResolver,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            codec,
            issuer,
            validator,
            resolver,
            users,
        }
    }

    /// Wire every phase from configuration, sharing one claims namespace.
    pub fn from_config(config: &Config, users: Arc<dyn UserRepository>) -> Result<Self, BridgeError> {
        let codec = TokenCodec::from_pkcs8(
            config.signing_key.expose_secret(),
            config.signing_key_id.clone(),
            config.jwt_clock_skew,
        )?;
        let namespace = config.claims_namespace.clone();

        Ok(Self::new(
            codec,
            ClaimIssuer::new(
                namespace.clone(),
                config.realm_base_url.clone(),
                config.token_lifetime,
            ),
            ClaimValidator::new(namespace.clone()),
            PrincipalResolver::new(namespace),
            users,
        ))
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn issuer(&self) -> &ClaimIssuer {
        &self.issuer
    }

    /// Mint a signed token for `identity`, issued now.
    #[instrument(skip_all, name = "bridge.hooks.generate")]
    pub fn on_generate(&self, identity: &Identity) -> Result<TokenResponse, BridgeError> {
        self.generate_at(identity, chrono::Utc::now().timestamp())
    }

    pub(crate) fn generate_at(
        &self,
        identity: &Identity,
        now: i64,
    ) -> Result<TokenResponse, BridgeError> {
        let start = Instant::now();
        let claims = self.issuer.issue(identity, now);

        let access_token = match self.codec.encode(&claims) {
            Ok(token) => token,
            Err(e) => {
                record_token_issuance("error", start.elapsed());
                return Err(e);
            }
        };
        record_token_issuance("success", start.elapsed());

        tracing::debug!(
            target: "bridge.hooks",
            user = %hash_for_correlation(&identity.id.to_string()),
            "Token issued"
        );

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: u64::try_from(self.issuer.lifetime_secs()).unwrap_or(0),
        })
    }

    pub async fn on_validate(&self, claims: &ClaimSet) -> Result<ValidationOutcome, BridgeError> {
        self.validator.validate(claims, self.users.as_ref()).await
    }

    pub async fn on_valid(&self, claims: &ClaimSet) -> Result<Resolution, BridgeError> {
        self.resolver.resolve(claims, self.users.as_ref()).await
    }

    /// Decode, validate and resolve one bearer token.
    ///
    /// Rejections and resolution failures become `Unauthenticated`; the reason
    /// goes to the log, never to the caller's response.
    #[instrument(skip_all, name = "bridge.hooks.authenticate")]
    pub async fn authenticate(&self, token: &str) -> Result<Principal, BridgeError> {
        let claims = self.codec.decode(token)?;

        if let ValidationOutcome::Rejected(reason) = self.on_validate(&claims).await? {
            return Err(BridgeError::Unauthenticated(reason.as_str().to_string()));
        }

        match self.on_valid(&claims).await? {
            Resolution::Bound(principal) => Ok(principal),
            Resolution::Unauthenticated(failure) => {
                tracing::debug!(target: "bridge.hooks", reason = %failure, "Session left unauthenticated");
                Err(BridgeError::Unauthenticated(failure.to_string()))
            }
        }
    }
}
