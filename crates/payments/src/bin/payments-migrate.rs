//! Apply pending schema migrations to the configured payments database.
//!
//! Usage: `payments-migrate [config.toml]`
//!
//! Without a config file the defaults apply, with `DB_ADDR` naming the
//! database file.

use anyhow::Context;
use payments::store::migration::CURRENT_VERSION;
use payments::{Config, Repository};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);

    let config = match &config_path {
        Some(path) => Config::load(path).with_context(|| format!("loading {path}"))?,
        None => Config::from_env(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log.filter)),
        )
        .with_target(true)
        .init();

    let Some(path) = config.database.path.as_ref() else {
        error!("no database configured; set database.path or DB_ADDR");
        anyhow::bail!("no database configured");
    };

    info!(path = %path.display(), "migrating payments database");
    let repository = Repository::open(&config.database)
        .with_context(|| format!("opening {}", path.display()))?;

    let version = repository.store().schema_version().await?;
    info!(version, latest = CURRENT_VERSION, "payments database is up to date");
    Ok(())
}
