//! Session binding through `GET /api/v1/session`.
//!
//! Each test mints a token, optionally changes the repository, then checks
//! whether the bridge still binds a principal.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use claims_bridge::crypto::TokenCodec;
use claims_test_utils::{
    test_signing_key, TestBridgeServer, TestClaimsBuilder, TEST_KEY_ID_1, TEST_KEY_ID_2,
    TEST_USER_ALICE, TEST_USER_BOB, TEST_USER_UNKNOWN,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

async fn get_session(
    server: &TestBridgeServer,
    token: &str,
) -> Result<(StatusCode, Value), anyhow::Error> {
    let response = server
        .client()
        .get(format!("{}/api/v1/session", server.url()))
        .bearer_auth(token)
        .send()
        .await?;

    let status = response.status();
    let body = response.json::<Value>().await?;
    Ok((status, body))
}

fn assert_unauthenticated(status: StatusCode, body: &Value) {
    assert_eq!(status, StatusCode::UNAUTHORIZED, "body: {}", body);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
    assert_eq!(
        body["error"]["message"], "The access token is invalid or expired",
        "rejection reason must not reach the client"
    );
}

fn assert_invalid_token(status: StatusCode, body: &Value) {
    assert_eq!(status, StatusCode::UNAUTHORIZED, "body: {}", body);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

// ============================================================================
// Accepted sessions
// ============================================================================

#[tokio::test]
async fn test_session_valid_token_binds_principal() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    let alice = server
        .repo()
        .insert(TEST_USER_ALICE, "alice", &["editor"])
        .await;
    let token = server.token_for(&alice)?;

    let (status, body) = get_session(&server, &token).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "user_id": TEST_USER_ALICE, "name": "alice", "roles": ["editor"] })
    );

    Ok(())
}

#[tokio::test]
async fn test_session_roles_come_from_repository() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    server
        .repo()
        .insert(TEST_USER_ALICE, "alice", &["administrator"])
        .await;

    // Token claims a role the account does not have
    let token = TestClaimsBuilder::new()
        .for_user(TEST_USER_ALICE, "alice")
        .with_roles(&["editor"])
        .sign(server.hooks().codec());

    let (status, body) = get_session(&server, &token).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roles"], json!(["administrator"]));

    Ok(())
}

#[tokio::test]
async fn test_session_string_uid_is_accepted() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;

    let token = TestClaimsBuilder::new()
        .with_string_uid(&TEST_USER_ALICE.to_string())
        .sign(server.hooks().codec());

    let (status, body) = get_session(&server, &token).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], TEST_USER_ALICE);

    Ok(())
}

#[tokio::test]
async fn test_session_url_claim_is_not_compared() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;

    let token = TestClaimsBuilder::new()
        .with_url("https://other-realm.test")
        .sign(server.hooks().codec());

    let (status, body) = get_session(&server, &token).await?;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["name"], "alice");

    Ok(())
}

// ============================================================================
// Rejected by claim validation
// ============================================================================

#[tokio::test]
async fn test_session_non_numeric_uid_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;

    for uid in ["alice", "+100", "0100"] {
        let token = TestClaimsBuilder::new()
            .with_string_uid(uid)
            .sign(server.hooks().codec());

        let (status, body) = get_session(&server, &token).await?;
        assert_unauthenticated(status, &body);
    }
    assert_eq!(server.repo().lookup_count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_session_renamed_account_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    let alice = server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;
    let token = server.token_for(&alice)?;

    server.repo().rename(TEST_USER_ALICE, "alice2").await;

    let (status, body) = get_session(&server, &token).await?;
    assert_unauthenticated(status, &body);

    Ok(())
}

#[tokio::test]
async fn test_session_deleted_account_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    let alice = server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;
    let token = server.token_for(&alice)?;

    server.repo().remove(TEST_USER_ALICE).await;

    let (status, body) = get_session(&server, &token).await?;
    assert_unauthenticated(status, &body);

    Ok(())
}

#[tokio::test]
async fn test_session_unknown_id_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;

    let token = TestClaimsBuilder::new()
        .for_user(TEST_USER_UNKNOWN, "alice")
        .sign(server.hooks().codec());

    let (status, body) = get_session(&server, &token).await?;
    assert_unauthenticated(status, &body);

    Ok(())
}

#[tokio::test]
async fn test_session_other_users_name_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;
    server.repo().insert(TEST_USER_BOB, "bob", &[]).await;

    let token = TestClaimsBuilder::new()
        .for_user(TEST_USER_ALICE, "bob")
        .sign(server.hooks().codec());

    let (status, body) = get_session(&server, &token).await?;
    assert_unauthenticated(status, &body);

    Ok(())
}

#[tokio::test]
async fn test_session_missing_claim_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;

    for claim in ["uid", "name", "roles", "url"] {
        let token = TestClaimsBuilder::new()
            .without(claim)
            .sign(server.hooks().codec());

        let (status, body) = get_session(&server, &token).await?;
        assert_unauthenticated(status, &body);
    }

    Ok(())
}

#[tokio::test]
async fn test_session_wrong_namespace_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;

    let token = TestClaimsBuilder::new()
        .with_namespace("drupal")
        .sign(server.hooks().codec());

    let (status, body) = get_session(&server, &token).await?;
    assert_unauthenticated(status, &body);

    Ok(())
}

// ============================================================================
// Rejected by the token transport
// ============================================================================

#[tokio::test]
async fn test_session_missing_header_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;

    let response = server
        .client()
        .get(format!("{}/api/v1/session", server.url()))
        .send()
        .await?;

    let status = response.status();
    let body = response.json::<Value>().await?;
    assert_invalid_token(status, &body);
    assert_eq!(body["error"]["message"], "Missing Authorization header");

    Ok(())
}

#[tokio::test]
async fn test_session_expired_token_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;

    let token = TestClaimsBuilder::new()
        .issued_at(chrono::Utc::now().timestamp() - 7200)
        .expires_in(-60)
        .sign(server.hooks().codec());

    let (status, body) = get_session(&server, &token).await?;
    assert_invalid_token(status, &body);

    Ok(())
}

#[tokio::test]
async fn test_session_token_from_other_key_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;

    // Same key id, different key material
    let (_, other_pkcs8) = test_signing_key(2)?;
    let other_codec =
        TokenCodec::from_pkcs8(&other_pkcs8, TEST_KEY_ID_1, Duration::from_secs(300))?;
    let token = TestClaimsBuilder::new().sign(&other_codec);

    let (status, body) = get_session(&server, &token).await?;
    assert_invalid_token(status, &body);

    Ok(())
}

#[tokio::test]
async fn test_session_token_with_rotated_key_id_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;

    // Same key material, key id the server was not configured with
    let (_, pkcs8) = test_signing_key(1)?;
    let rotated_codec = TokenCodec::from_pkcs8(&pkcs8, TEST_KEY_ID_2, Duration::from_secs(300))?;
    let token = TestClaimsBuilder::new().sign(&rotated_codec);

    let (status, body) = get_session(&server, &token).await?;
    assert_invalid_token(status, &body);

    Ok(())
}

#[tokio::test]
async fn test_session_tampered_payload_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    let alice = server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;
    server.repo().insert(TEST_USER_BOB, "bob", &[]).await;
    let token = server.token_for(&alice)?;

    // Swap in a payload naming bob, keeping alice's signature
    let forged = TestClaimsBuilder::new().for_user(TEST_USER_BOB, "bob").build();
    let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged)?);
    let mut parts = token.split('.');
    let header = parts.next().unwrap();
    let _payload = parts.next().unwrap();
    let signature = parts.next().unwrap();
    let tampered = format!("{}.{}.{}", header, forged_payload, signature);

    let (status, body) = get_session(&server, &tampered).await?;
    assert_invalid_token(status, &body);

    Ok(())
}
