use axum::Router;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keymint::config::Config;
use keymint::db::{create_pool, init_db, queries, AppState};
use keymint::handlers;
use keymint::models::CreateLicense;

#[derive(Parser, Debug)]
#[command(name = "keymint")]
#[command(about = "Self-hosted license key server with device fingerprint binding")]
struct Cli {
    /// Seed the database with a dev license and print its key (dev mode only)
    #[arg(long)]
    seed: bool,
}

/// Create a trial license for local development and print the key.
fn seed_dev_license(state: &AppState) {
    let conn = state.db.get().expect("Failed to get db connection for seeding");

    let input = CreateLicense {
        expires_at: None,
        max_activations: Some(1),
        metadata: Some(serde_json::json!({ "isTrial": true })),
    };
    let license = queries::create_license(&conn, &input).expect("Failed to create dev license");

    tracing::info!("============================================");
    tracing::info!("DEV LICENSE CREATED");
    tracing::info!("Key: {}", license.license_key);
    tracing::info!("============================================");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keymint=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }
    if config.admin_api_key.is_none() {
        tracing::warn!("ADMIN_API_KEY is not set; admin endpoints are disabled");
    }

    // Create the database connection pool and initialize the schema
    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let state = AppState {
        db: db_pool,
        admin_api_key: config.admin_api_key.clone(),
    };

    // Seed a dev license if --seed is passed (only in dev mode)
    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set KEYMINT_ENV=dev)");
        } else {
            seed_dev_license(&state);
        }
    }

    // Build the application router
    let app = Router::new()
        // Public endpoints (no auth)
        .merge(handlers::public::router())
        // Admin API (static key auth)
        .merge(handlers::admin::router(state.clone()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Keymint server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
