//! MySQL connection pool factory for the book catalog.
//!
//! The `books` table is owned outside this program; [`SCHEMA`] documents the
//! shape the repository queries expect and is printed by `book-catalog schema`.

use std::str::FromStr;

use anyhow::Context;
use catalog_kernel::settings::DatabaseSettings;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};

/// Reference DDL for the `books` table.
pub const SCHEMA: &str = r#"CREATE TABLE IF NOT EXISTS books (
    id          BIGINT       NOT NULL AUTO_INCREMENT PRIMARY KEY,
    uuid        CHAR(36)     NOT NULL UNIQUE,
    title       VARCHAR(255) NOT NULL,
    author      VARCHAR(255) NOT NULL,
    year        INT          NULL,
    isbn        VARCHAR(32)  NULL,
    category    VARCHAR(100) NULL,
    status      VARCHAR(50)  NULL,
    created_at  DATETIME(3)  NOT NULL,
    updated_at  DATETIME(3)  NOT NULL
);
"#;

/// Pool options derived from settings, without connecting.
pub fn pool_options(settings: &DatabaseSettings) -> MySqlPoolOptions {
    MySqlPoolOptions::new().max_connections(settings.max_connections)
}

/// Log-safe description of the configured database: user, host, port and
/// database name, never the password or query parameters.
pub fn describe(settings: &DatabaseSettings) -> String {
    match MySqlConnectOptions::from_str(&settings.url) {
        Ok(options) => format!(
            "mysql://{}@{}:{}/{}",
            options.get_username(),
            options.get_host(),
            options.get_port(),
            options.get_database().unwrap_or_default()
        ),
        Err(_) => "<unparseable database url>".to_string(),
    }
}

/// Open the shared connection pool and verify one connection can be acquired.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<MySqlPool> {
    let location = describe(settings);
    tracing::info!(
        target: "catalog-db",
        url = %location,
        max_connections = settings.max_connections,
        "connecting to database"
    );

    let pool = pool_options(settings)
        .connect(&settings.url)
        .await
        .with_context(|| format!("failed to connect to {}", location))?;

    tracing::info!(target: "catalog-db", "database pool ready");
    Ok(pool)
}
