//! Spawn Sentry — Binary Entrypoint
//! Resolves the home position, wires the map client and Slack transport, and
//! runs either the live polling loop or a snapshot replay.
//!
//! Usage: `spawn-sentry` (live) or `spawn-sentry replay`.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use spawn_sentry::config::Config;
use spawn_sentry::geocode;
use spawn_sentry::lookup::MapClient;
use spawn_sentry::notify::SlackNotifier;
use spawn_sentry::rarity::RarityTable;
use spawn_sentry::scheduler;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spawn_sentry=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when the vars come from the environment.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = Config::from_env().context("reading configuration")?;
    let replay = std::env::args().nth(1).as_deref() == Some("replay");

    let (home, address) = geocode::resolve(&cfg.location_name)
        .await
        .with_context(|| format!("resolving LOCATION_NAME {:?}", cfg.location_name))?;
    info!(%address, lat = home.latitude, lon = home.longitude, "home position resolved");

    let table = RarityTable::load_default().context("loading rarity table")?;
    info!(species = table.len(), "rarity table loaded");

    let notifier = SlackNotifier::new(cfg.slack_webhook_url.clone());

    if replay {
        scheduler::run_replay(&cfg, home, &notifier).await
    } else {
        let client = MapClient::new(
            cfg.map_api_url.clone(),
            cfg.auth_service.clone(),
            cfg.username.clone(),
            cfg.password.clone(),
        );
        scheduler::run_live(client, &cfg, home, &table, &notifier).await
    }
}
