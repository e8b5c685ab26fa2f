//! Quadrant authentication server binary.

use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use quadrant_api::config::ApiConfig;
use quadrant_core::auth::password::BcryptHasher;
use quadrant_core::auth::repository::PgUserRepository;
use quadrant_core::clock::SystemClock;

/// CLI arguments for the authentication server.
#[derive(Parser, Debug)]
#[command(name = "quadrant_server", about = "Quadrant authentication server")]
struct Args {
    /// Port to listen on; overrides `BIND_ADDR` when set.
    #[arg(long)]
    port: Option<u16>,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/quadrant"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,quadrant_api=debug,quadrant_core=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    config.database_url = args.database_url.clone();
    if let Some(port) = args.port {
        config.bind_addr = format!("127.0.0.1:{port}");
    }

    info!(database_url = %config.database_url, bind_addr = %config.bind_addr, "starting quadrant_server");

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    info!("running database migrations");
    quadrant_api::migrate(&pool).await?;

    let state = quadrant_api::AppState::new(
        Arc::new(PgUserRepository::new(pool)),
        Arc::new(BcryptHasher),
        Arc::new(SystemClock),
        &config,
    );

    let app = quadrant_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app).await?;

    Ok(())
}
