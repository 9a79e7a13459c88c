//! cardbook server: loads config from the environment (and `.env`), prepares the
//! database when one is configured, and serves the HTTP API.
//!
//! Run from repo root: `cargo run -p cardbook-server`

use cardbook::{app, ensure_database_exists, ensure_tables, AppConfig, AppState};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cardbook=info,cardbook_server=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env()?;
    let state = match &config.database_url {
        Some(database_url) => {
            ensure_database_exists(database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await?;
            ensure_tables(&pool, &config.schema).await?;
            tracing::info!(schema = %config.schema, "using PostgreSQL store");
            AppState::postgres(pool, &config)
        }
        None => AppState::in_memory(&config),
    };
    if config.api_key.is_none() {
        tracing::warn!("no API key configured, /api is open");
    }

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("cardbook listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
