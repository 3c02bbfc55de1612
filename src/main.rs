//! Query Chat server
//!
//! Entry point: serves the chat page and `/api/query`, or manages the demo
//! database with the `seed` and `reset` subcommands.

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::unused_async)]

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use query_chat::config::{self, AppConfig, Command};
use query_chat::{db, server, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = AppConfig::load().context("failed to load configuration")?;
    telemetry::init(&config.logging);

    match config.command {
        Command::Serve => {
            let settings = config::load_llm_settings()
                .map_err(|msg| anyhow::anyhow!("Configuration error: {msg}"))?;
            server::start_server(Arc::new(config), settings).await
        }
        Command::Seed => {
            let pool = db::connect(&config.database.url, config.database.max_connections).await?;
            db::seed_demo(&pool)
                .await
                .context("failed to create demo tables")?;
            info!(name: "db.seeded", url = %config.database.url, "Demo database ready");
            Ok(())
        }
        Command::Reset => {
            let pool = db::connect(&config.database.url, config.database.max_connections).await?;
            let dropped = db::drop_all_tables(&pool).await?;
            info!(
                name: "db.reset",
                url = %config.database.url,
                tables = dropped.len(),
                "Database reset"
            );
            Ok(())
        }
    }
}
