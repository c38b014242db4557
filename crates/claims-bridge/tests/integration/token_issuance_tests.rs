//! Token issuance through `POST /api/v1/auth/token`.

use claims_bridge::models::TokenResponse;
use claims_test_utils::{
    TestBridgeServer, TokenAssertions, TEST_KEY_ID_1, TEST_REALM_URL, TEST_USER_ALICE,
};
use reqwest::StatusCode;
use serde_json::json;
use std::collections::HashMap;

async fn request_token(
    server: &TestBridgeServer,
    bearer: &str,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(server
        .client()
        .post(format!("{}/api/v1/auth/token", server.url()))
        .bearer_auth(bearer)
        .send()
        .await?)
}

#[tokio::test]
async fn test_token_issuance_returns_namespaced_claims() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    let alice = server
        .repo()
        .insert(TEST_USER_ALICE, "alice", &["editor", "reviewer"])
        .await;
    let bearer = server.token_for(&alice)?;

    let response = request_token(&server, &bearer).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body: TokenResponse = response.json().await?;
    assert_eq!(body.token_type, "Bearer");
    assert_eq!(body.expires_in, 7200);

    body.access_token
        .assert_valid_jwt()
        .assert_signed_by(TEST_KEY_ID_1)
        .assert_expires_in(7200)
        .assert_has_claim("app.uid", TEST_USER_ALICE)
        .assert_has_claim("app.name", "alice")
        .assert_has_claim("app.roles", json!(["editor", "reviewer"]))
        .assert_has_claim("app.url", TEST_REALM_URL)
        .assert_lacks_claim("app.email");

    Ok(())
}

#[tokio::test]
async fn test_token_issuance_new_token_binds_session() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    let alice = server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;
    let bearer = server.token_for(&alice)?;

    let issued: TokenResponse = request_token(&server, &bearer).await?.json().await?;

    let response = server
        .client()
        .get(format!("{}/api/v1/session", server.url()))
        .bearer_auth(&issued.access_token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_token_issuance_empty_roles_serialized_as_empty_list() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    let alice = server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;
    let bearer = server.token_for(&alice)?;

    let body: TokenResponse = request_token(&server, &bearer).await?.json().await?;

    body.access_token
        .assert_has_claim("app.roles", json!([]));

    Ok(())
}

#[tokio::test]
async fn test_token_issuance_stale_session_returns_401() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    let alice = server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;
    let bearer = server.token_for(&alice)?;

    server.repo().rename(TEST_USER_ALICE, "alice2").await;

    let response = request_token(&server, &bearer).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_token_issuance_requires_session() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;

    let response = server
        .client()
        .post(format!("{}/api/v1/auth/token", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_token_issuance_custom_lifetime_and_namespace() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn_with_vars(HashMap::from([
        ("TOKEN_LIFETIME_SECONDS".to_string(), "600".to_string()),
        ("CLAIMS_NAMESPACE".to_string(), "drupal".to_string()),
    ]))
    .await?;
    let alice = server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;
    let bearer = server.token_for(&alice)?;

    let body: TokenResponse = request_token(&server, &bearer).await?.json().await?;

    assert_eq!(body.expires_in, 600);
    body.access_token
        .assert_expires_in(600)
        .assert_has_claim("drupal.uid", TEST_USER_ALICE)
        .assert_has_claim("drupal.name", "alice")
        .assert_lacks_claim("app");

    Ok(())
}
