//! SQLite connection and demo data.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Open a pool on `url`, creating the database file if it does not exist.
///
/// In-memory URLs get a single connection so every query sees the same
/// database.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let max_connections = if url.contains(":memory:") {
        1
    } else {
        max_connections.max(1)
    };

    if let Some(parent) = std::path::Path::new(options.get_filename()).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    tracing::info!(url = %url, max_connections, "Database connected");
    Ok(pool)
}

const DEMO_SCHEMA: [&str; 3] = [
    r"CREATE TABLE vip (
        vip_id INTEGER NOT NULL,
        vip_address VARCHAR(100) NOT NULL,
        port INTEGER NOT NULL,
        PRIMARY KEY (vip_id)
    )",
    r"CREATE TABLE load_balancer (
        device_id INTEGER NOT NULL,
        device_name VARCHAR(100) NOT NULL,
        location VARCHAR(100) NOT NULL,
        vip_id INTEGER,
        PRIMARY KEY (device_id),
        FOREIGN KEY (vip_id) REFERENCES vip (vip_id)
    )",
    r"CREATE TABLE vip_member (
        member_id INTEGER NOT NULL,
        vip_id INTEGER NOT NULL,
        member_address VARCHAR(100) NOT NULL,
        port INTEGER NOT NULL,
        PRIMARY KEY (member_id),
        FOREIGN KEY (vip_id) REFERENCES vip (vip_id)
    )",
];

const DEMO_ROWS: [&str; 3] = [
    r"INSERT INTO vip (vip_id, vip_address, port) VALUES
        (1, '10.0.0.1', 80),
        (2, '10.0.0.2', 443),
        (3, '10.0.0.3', 8080)",
    r"INSERT INTO load_balancer (device_id, device_name, location, vip_id) VALUES
        (1, 'lb-prod-1', 'US-East', 1),
        (2, 'lb-prod-2', 'US-West', 2),
        (3, 'lb-prod-3', 'US-East', 3)",
    r"INSERT INTO vip_member (member_id, vip_id, member_address, port) VALUES
        (1, 1, '192.168.1.1', 80),
        (2, 1, '192.168.1.2', 80),
        (3, 2, '192.168.1.3', 443),
        (4, 3, '192.168.1.4', 8080)",
];

/// Create the load-balancer demo tables and fill them with sample rows.
///
/// Runs in one transaction; fails if any of the tables already exists.
pub async fn seed_demo(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for statement in DEMO_SCHEMA.iter().chain(DEMO_ROWS.iter()) {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    tracing::info!(tables = DEMO_SCHEMA.len(), "Demo tables created");
    Ok(())
}

/// Names of all user tables, sorted.
pub async fn table_names(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await
}

/// Drop every user table. Returns the dropped names.
pub async fn drop_all_tables(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    let tables = table_names(pool).await?;

    // Foreign keys are per connection; keep the whole drop on one.
    let mut conn = pool.acquire().await?;
    sqlx::query("PRAGMA foreign_keys = OFF")
        .execute(&mut *conn)
        .await?;
    for table in &tables {
        let statement = format!("DROP TABLE IF EXISTS \"{}\"", table.replace('"', "\"\""));
        sqlx::query(&statement).execute(&mut *conn).await?;
        tracing::info!(table = %table, "Dropped table");
    }
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await?;

    Ok(tables)
}
