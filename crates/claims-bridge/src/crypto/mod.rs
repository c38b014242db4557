//! Token transport: signs claim sets into JWTs and verifies them back.
//!
//! Tokens are EdDSA (Ed25519) JWTs whose payload is the nested JSON form of a
//! [`ClaimSet`]. Decoding verifies, in order:
//! - token size (before any parsing)
//! - header `kid` matches the configured key
//! - signature and `exp` (no leeway)
//! - integer `iat` / `exp` present, `iat` not beyond the clock skew tolerance
//!
//! Every failure surfaces as the same generic `InvalidToken` message; the
//! specific cause is only logged at debug level.

use crate::claims::ClaimSet;
use crate::errors::BridgeError;
use base64::{engine::general_purpose, Engine as _};
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ring::{
    rand::SystemRandom,
    signature::{Ed25519KeyPair, KeyPair},
};
use std::fmt;
use std::time::Duration;
use tracing::instrument;

/// Maximum allowed JWT size in bytes (8KB).
///
/// Checked before base64 decoding and signature verification so oversized
/// tokens cost almost nothing to reject.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Default tolerance for `iat` values in the future (5 minutes).
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Upper bound for the configurable clock skew tolerance (10 minutes).
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(600);

const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

fn invalid_token() -> BridgeError {
    BridgeError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string())
}

/// Generate an Ed25519 signing key using the system CSPRNG.
///
/// Returns `(private_key_pkcs8, public_key_base64)`.
#[instrument(skip_all)]
pub fn generate_signing_key() -> Result<(Vec<u8>, String), BridgeError> {
    let rng = SystemRandom::new();

    let pkcs8_bytes = Ed25519KeyPair::generate_pkcs8(&rng)
        .map_err(|e| BridgeError::Crypto(format!("Keypair generation failed: {}", e)))?;

    let key_pair = Ed25519KeyPair::from_pkcs8(pkcs8_bytes.as_ref())
        .map_err(|e| BridgeError::Crypto(format!("Keypair parsing failed: {}", e)))?;

    let public_key_b64 = general_purpose::STANDARD.encode(key_pair.public_key().as_ref());

    Ok((pkcs8_bytes.as_ref().to_vec(), public_key_b64))
}

/// Encodes and decodes bridge tokens with a single Ed25519 key.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    key_id: String,
    clock_skew_secs: i64,
}

/// Key material is never printed.
impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("key_id", &self.key_id)
            .field("keys", &"[REDACTED]")
            .field("clock_skew_secs", &self.clock_skew_secs)
            .finish()
    }
}

impl TokenCodec {
    /// Build a codec from a PKCS#8 Ed25519 private key.
    ///
    /// `clock_skew` is clamped to [`MAX_CLOCK_SKEW`].
    pub fn from_pkcs8(
        private_key_pkcs8: &[u8],
        key_id: impl Into<String>,
        clock_skew: Duration,
    ) -> Result<Self, BridgeError> {
        let key_pair = Ed25519KeyPair::from_pkcs8_maybe_unchecked(private_key_pkcs8)
            .map_err(|e| BridgeError::Crypto(format!("Invalid private key format: {}", e)))?;

        let clock_skew = clock_skew.min(MAX_CLOCK_SKEW);
        // Safe cast: bounded by MAX_CLOCK_SKEW (600 seconds)
        #[allow(clippy::cast_possible_wrap)]
        let clock_skew_secs = clock_skew.as_secs() as i64;

        Ok(Self {
            encoding_key: EncodingKey::from_ed_der(private_key_pkcs8),
            decoding_key: DecodingKey::from_ed_der(key_pair.public_key().as_ref()),
            key_id: key_id.into(),
            clock_skew_secs,
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Sign a claim set into a compact JWT.
    #[instrument(skip_all)]
    pub fn encode(&self, claims: &ClaimSet) -> Result<String, BridgeError> {
        let mut header = Header::new(Algorithm::EdDSA);
        header.typ = Some("JWT".to_string());
        header.kid = Some(self.key_id.clone());

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| BridgeError::Crypto(format!("JWT signing operation failed: {}", e)))
    }

    /// Verify a compact JWT and rebuild its claim set.
    #[instrument(skip_all)]
    pub fn decode(&self, token: &str) -> Result<ClaimSet, BridgeError> {
        self.decode_at(token, chrono::Utc::now().timestamp())
    }

    /// Same as [`decode`](Self::decode) with an explicit `now` for the `iat`
    /// check. `exp` is still checked against the system clock by jsonwebtoken.
    pub(crate) fn decode_at(&self, token: &str, now: i64) -> Result<ClaimSet, BridgeError> {
        if token.len() > MAX_JWT_SIZE_BYTES {
            tracing::debug!(
                target: "bridge.crypto",
                token_size = token.len(),
                max_size = MAX_JWT_SIZE_BYTES,
                "Token rejected: size exceeds maximum allowed"
            );
            return Err(invalid_token());
        }

        let header = decode_header(token).map_err(|e| {
            tracing::debug!(target: "bridge.crypto", error = %e, "Failed to parse JWT header");
            invalid_token()
        })?;

        if header.kid.as_deref() != Some(self.key_id.as_str()) {
            tracing::debug!(target: "bridge.crypto", "Token rejected: unknown key id");
            return Err(invalid_token());
        }

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<ClaimSet>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!(target: "bridge.crypto", error = %e, "Token verification failed");
            invalid_token()
        })?;
        let claims = token_data.claims;

        let (Some(iat), Some(_exp)) = (claims.issued_at(), claims.expires_at()) else {
            tracing::debug!(target: "bridge.crypto", "Token rejected: iat/exp missing or not integers");
            return Err(invalid_token());
        };

        self.check_iat(iat, now)?;

        Ok(claims)
    }

    /// Reject tokens whose `iat` lies more than the clock skew in the future.
    fn check_iat(&self, iat: i64, now: i64) -> Result<(), BridgeError> {
        let max_iat = now.saturating_add(self.clock_skew_secs);

        if iat > max_iat {
            tracing::debug!(
                target: "bridge.crypto",
                iat = iat,
                now = now,
                max_allowed = max_iat,
                clock_skew_secs = self.clock_skew_secs,
                "Token rejected: iat too far in the future"
            );
            return Err(invalid_token());
        }

        Ok(())
    }
}
