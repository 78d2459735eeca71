use std::net::SocketAddr;

use anyhow::Context;
use tracing::{Level, info};

use coursedesk_server::config::AppConfig;
use coursedesk_server::state::AppState;
use coursedesk_server::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = database::init_db(&config.database)
        .await
        .context("Failed to connect to database")?;
    seed::seed_categories(&db)
        .await
        .context("Failed to seed categories")?;
    seed::ensure_indexes(&db)
        .await
        .context("Failed to create indexes")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let app = build_router(AppState::new(db, config));

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
