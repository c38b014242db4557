//! Test server harness for E2E testing
//!
//! Spawns the real bridge router over an in-memory user repository.

use crate::crypto_fixtures::test_signing_key_b64;
use crate::test_ids::{TEST_KEY_ID_1, TEST_NAMESPACE, TEST_REALM_URL};
use claims_bridge::config::Config;
use claims_bridge::hooks::JwtAuthHooks;
use claims_bridge::models::{Account, Identity};
use claims_bridge::observability::metrics::init_metrics_recorder;
use claims_bridge::repositories::users::mock::InMemoryUserRepository;
use claims_bridge::routes::{self, AppState};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Running bridge instance for E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_session_e2e() -> Result<()> {
///     let server = TestBridgeServer::spawn().await?;
///     let alice = server.repo().insert(TEST_USER_ALICE, "alice", &[]).await;
///     let token = server.token_for(&alice)?;
///
///     let response = server
///         .client()
///         .get(format!("{}/api/v1/session", server.url()))
///         .bearer_auth(&token)
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestBridgeServer {
    addr: SocketAddr,
    repo: Arc<InMemoryUserRepository>,
    hooks: Arc<JwtAuthHooks>,
    config: Config,
    client: reqwest::Client,
    _handle: JoinHandle<()>,
}

impl TestBridgeServer {
    /// Spawn with the default test configuration.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_vars(HashMap::new()).await
    }

    /// Spawn with extra environment-style overrides, e.g.
    /// `TOKEN_LIFETIME_SECONDS` or `CLAIMS_NAMESPACE`.
    ///
    /// The server will:
    /// - Load configuration through `Config::from_vars`
    /// - Sign with the deterministic key for seed 1
    /// - Bind to a random available port (127.0.0.1:0)
    pub async fn spawn_with_vars(overrides: HashMap<String, String>) -> Result<Self, anyhow::Error> {
        let mut vars = HashMap::from([
            (
                "DATABASE_URL".to_string(),
                "postgresql://unused".to_string(),
            ),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            ("REALM_BASE_URL".to_string(), TEST_REALM_URL.to_string()),
            ("CLAIMS_NAMESPACE".to_string(), TEST_NAMESPACE.to_string()),
            ("SIGNING_KEY".to_string(), test_signing_key_b64(1)?),
            ("SIGNING_KEY_ID".to_string(), TEST_KEY_ID_1.to_string()),
        ]);
        vars.extend(overrides);

        let config = Config::from_vars(&vars)?;

        let repo = Arc::new(InMemoryUserRepository::new());
        let hooks = Arc::new(JwtAuthHooks::from_config(&config, repo.clone())?);

        let state = Arc::new(AppState {
            hooks: hooks.clone(),
        });

        // Only one global recorder per process; later servers get a private one.
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                let recorder = PrometheusBuilder::new().build_recorder();
                recorder.handle()
            }
        };

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind(&config.bind_address)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            repo,
            hooks,
            config,
            client: reqwest::Client::new(),
            _handle: handle,
        })
    }

    /// The repository backing the server. Insert, rename and remove accounts
    /// here to drive validation outcomes.
    pub fn repo(&self) -> &Arc<InMemoryUserRepository> {
        &self.repo
    }

    /// The hooks the server authenticates with; its codec signs tokens the
    /// server accepts.
    pub fn hooks(&self) -> &JwtAuthHooks {
        &self.hooks
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Issue a token for `account` exactly as the bridge would.
    pub fn token_for(&self, account: &Account) -> Result<String, anyhow::Error> {
        let response = self.hooks.on_generate(&Identity::from(account))?;
        Ok(response.access_token)
    }
}

impl Drop for TestBridgeServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
