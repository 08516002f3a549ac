//! Rollover batch runner.
//!
//! The one executable surface of the crate: connects to the database, seeds
//! any configured templates, runs the monthly rollover pass for the current
//! date, and logs the summary. Intended to be invoked daily by cron or
//! manually by an operator.

use chrono::Utc;
use dotenvy::dotenv;
use pocketbook::config;
use pocketbook::core::rollover;
use pocketbook::errors::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenv().ok();

    let db = config::database::create_connection().await?;
    config::database::create_tables(&db).await?;
    info!("Database initialized.");

    // Template seeding is optional: no config.toml means nothing to seed.
    match config::pockets::load_default_config() {
        Ok(cfg) => {
            let owner_id = std::env::var("POCKETBOOK_OWNER_ID")
                .unwrap_or_else(|_| "default".to_string());
            let created = config::pockets::seed_missing_templates(&db, &owner_id, &cfg).await?;
            if created > 0 {
                info!(created, owner_id, "Seeded missing pocket templates.");
            }
        }
        Err(e) => warn!("No template config loaded: {e}"),
    }

    let today = Utc::now().date_naive();
    let summary = rollover::run_rollover(&db, today).await?;
    info!("{}", rollover::format_rollover_summary(&summary));

    Ok(())
}
