//! `iat` clock skew tolerance, end to end.

use chrono::Utc;
use claims_test_utils::{TestBridgeServer, TestClaimsBuilder, TEST_USER_ALICE};
use reqwest::StatusCode;
use std::collections::HashMap;

async fn session_status(
    server: &TestBridgeServer,
    token: &str,
) -> Result<StatusCode, anyhow::Error> {
    Ok(server
        .client()
        .get(format!("{}/api/v1/session", server.url()))
        .bearer_auth(token)
        .send()
        .await?
        .status())
}

#[tokio::test]
async fn test_default_clock_skew_accepts_iat_within_tolerance() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;

    let token = TestClaimsBuilder::new()
        .issued_at(Utc::now().timestamp() + 60)
        .sign(server.hooks().codec());

    assert_eq!(session_status(&server, &token).await?, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_default_clock_skew_rejects_iat_beyond_tolerance() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn().await?;
    server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;

    let token = TestClaimsBuilder::new()
        .issued_at(Utc::now().timestamp() + 400)
        .expires_in(3600)
        .sign(server.hooks().codec());

    assert_eq!(
        session_status(&server, &token).await?,
        StatusCode::UNAUTHORIZED
    );

    Ok(())
}

#[tokio::test]
async fn test_custom_clock_skew_rejects_iat_beyond_tolerance() -> Result<(), anyhow::Error> {
    let server = TestBridgeServer::spawn_with_vars(HashMap::from([(
        "JWT_CLOCK_SKEW_SECONDS".to_string(),
        "60".to_string(),
    )]))
    .await?;
    server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;

    // Inside the 300s default, outside the configured 60s
    let token = TestClaimsBuilder::new()
        .issued_at(Utc::now().timestamp() + 120)
        .sign(server.hooks().codec());

    assert_eq!(
        session_status(&server, &token).await?,
        StatusCode::UNAUTHORIZED
    );

    Ok(())
}
