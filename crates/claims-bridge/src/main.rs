use claims_bridge::config::Config;
use claims_bridge::crypto::generate_signing_key;
use claims_bridge::hooks::JwtAuthHooks;
use claims_bridge::observability::metrics::init_metrics_recorder;
use claims_bridge::repositories::PgUserRepository;
use claims_bridge::routes::{self, AppState};
use base64::{engine::general_purpose, Engine as _};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // `claims-bridge generate-key` prints a fresh SIGNING_KEY and exits
    if std::env::args().nth(1).as_deref() == Some("generate-key") {
        let (pkcs8, public_key) = generate_signing_key()?;
        println!("SIGNING_KEY={}", general_purpose::STANDARD.encode(&pkcs8));
        println!("# public key: {}", public_key);
        return Ok(());
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claims_bridge=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Claims Bridge");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        namespace = config.claims_namespace.as_str(),
        key_id = %config.signing_key_id,
        "Configuration loaded successfully"
    );

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    info!("Connecting to database...");
    let db_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            e
        })?;

    sqlx::migrate!("../../migrations")
        .run(&db_pool)
        .await
        .map_err(|e| {
            error!("Failed to run migrations: {}", e);
            e
        })?;

    info!("Database connection established");

    let users = Arc::new(PgUserRepository::new(db_pool));
    let hooks = JwtAuthHooks::from_config(&config, users).map_err(|e| {
        error!("Failed to initialize auth hooks: {}", e);
        e
    })?;

    let state = Arc::new(AppState {
        hooks: Arc::new(hooks),
    });

    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Claims Bridge listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
