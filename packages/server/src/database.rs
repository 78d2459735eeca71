use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::config::DatabaseConfig;

pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.clone());

    // Set connection pool options
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(config.sqlx_logging);
    if let Some(secs) = config.idle_timeout_secs {
        opt.idle_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = config.max_lifetime_secs {
        opt.max_lifetime(Duration::from_secs(secs));
    }

    let db = Database::connect(opt).await?;
    sync_schema(&db).await?;

    Ok(db)
}

/// Create or migrate the tables of every entity under `crate::entity`.
pub async fn sync_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.get_schema_registry("coursedesk_server::entity::*")
        .sync(db)
        .await
}
