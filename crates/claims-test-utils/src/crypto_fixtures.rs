//! Deterministic signing keys for tests.
//!
//! The same seed always yields the same Ed25519 key pair.

use base64::engine::general_purpose;
use base64::Engine;
use ring::signature::{Ed25519KeyPair, KeyPair};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),
}

/// Deterministic Ed25519 key for `seed`.
///
/// Returns `(public_key_base64, private_key_pkcs8)`.
pub fn test_signing_key(seed: u8) -> Result<(String, Vec<u8>), FixtureError> {
    let mut seed_bytes = [0u8; 32];
    for (i, byte) in seed_bytes.iter_mut().enumerate() {
        *byte = seed.wrapping_mul(i as u8 + 1).wrapping_add(i as u8);
    }

    let key_pair = Ed25519KeyPair::from_seed_unchecked(&seed_bytes)
        .map_err(|e| FixtureError::Crypto(format!("Failed to generate test keypair: {:?}", e)))?;

    let public_key_b64 = general_purpose::STANDARD.encode(key_pair.public_key().as_ref());

    Ok((public_key_b64, build_pkcs8_from_seed(&seed_bytes)))
}

/// The `SIGNING_KEY` environment value for `seed`.
pub fn test_signing_key_b64(seed: u8) -> Result<String, FixtureError> {
    let (_, pkcs8) = test_signing_key(seed)?;
    Ok(general_purpose::STANDARD.encode(pkcs8))
}

/// PKCS#8 v1 (RFC 5208) document wrapping a raw Ed25519 seed.
fn build_pkcs8_from_seed(seed: &[u8; 32]) -> Vec<u8> {
    let mut pkcs8 = Vec::with_capacity(48);

    // SEQUENCE, 46 bytes
    pkcs8.extend_from_slice(&[0x30, 0x2e]);
    // version INTEGER 0
    pkcs8.extend_from_slice(&[0x02, 0x01, 0x00]);
    // AlgorithmIdentifier SEQUENCE { OID 1.3.101.112 }
    pkcs8.extend_from_slice(&[0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70]);
    // privateKey OCTET STRING { OCTET STRING seed }
    pkcs8.extend_from_slice(&[0x04, 0x22, 0x04, 0x20]);
    pkcs8.extend_from_slice(seed);

    pkcs8
}
