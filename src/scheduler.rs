//! scheduler.rs — one testable `run_cycle` plus the live/replay drivers.
//!
//! A cycle is grid → serialized lookups → aggregate → ledger purge → rank →
//! decide. The drivers own the clock and the sleeps so the cycle itself stays
//! deterministic under test.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::aggregate::aggregate;
use crate::config::{Config, SearchParams};
use crate::decide::{decide, NotificationEvent, NotificationLedger};
use crate::geo::{self, Coordinate, GridError};
use crate::lookup::{LookupError, MapClient, SpawnLookup};
use crate::notify::Notifier;
use crate::rank::rank;
use crate::rarity::RarityTable;
use crate::snapshot;
use crate::spawn::SpawnSet;

/// Working set owned by one run: never shared, never locked.
#[derive(Debug, Default)]
pub struct SearchState {
    pub spawns: SpawnSet,
    pub ledger: NotificationLedger,
}

#[derive(Debug)]
pub struct CycleReport {
    pub cells_searched: usize,
    pub cells_failed: usize,
    pub spawns_live: usize,
    pub events: Vec<NotificationEvent>,
}

#[derive(Debug, Error)]
pub enum CycleError {
    /// Malformed grid parameters; logged at the cycle boundary, never fatal to
    /// the process.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// Credential rejection mid-run; always aborts.
    #[error(transparent)]
    Auth(LookupError),
}

/// One full search pass. A transient failure in a cell means that cell
/// contributes nothing this cycle; the rest of the grid still runs.
pub async fn run_cycle(
    lookup: &dyn SpawnLookup,
    state: &mut SearchState,
    params: &SearchParams,
    home: Coordinate,
    table: &RarityTable,
    rarity_limit: i32,
    distance_limit: f64,
    now: DateTime<Utc>,
) -> Result<CycleReport, CycleError> {
    let cells = geo::grid(home, params.step_size, params.step_limit)?;

    let mut observations = Vec::new();
    let mut cells_failed = 0usize;
    // One outstanding remote call at a time; the map service rate-limits.
    for cell in &cells {
        match lookup.lookup(*cell).await {
            Ok(mut obs) => observations.append(&mut obs),
            Err(e @ LookupError::AuthRejected(_)) => return Err(CycleError::Auth(e)),
            Err(e @ LookupError::Transient { .. }) => {
                warn!(
                    lat = cell.latitude,
                    lon = cell.longitude,
                    error = %e,
                    "cell lookup failed, treating as empty"
                );
                cells_failed += 1;
            }
        }
    }

    let stats = aggregate(&mut state.spawns, observations, table, now);
    state.ledger.retain_present(&state.spawns);

    let ranked = rank(&state.spawns, home);
    let events = decide(
        &ranked,
        home,
        rarity_limit,
        distance_limit,
        &mut state.ledger,
        now,
        false,
    );

    info!(
        cells = cells.len(),
        cells_failed,
        inserted = stats.inserted,
        refreshed = stats.refreshed,
        purged = stats.purged_expired,
        live = state.spawns.len(),
        events = events.len(),
        "search cycle complete"
    );

    Ok(CycleReport {
        cells_searched: cells.len(),
        cells_failed,
        spawns_live: state.spawns.len(),
        events,
    })
}

async fn dispatch(notifier: &dyn Notifier, events: &[NotificationEvent]) {
    for ev in events {
        // A decided event stays decided even if delivery fails.
        if let Err(e) = notifier.send(ev).await {
            warn!(
                identity = %ev.spawn.identity,
                species = %ev.spawn.species_name,
                error = %e,
                "notification delivery failed"
            );
        }
    }
}

/// Live mode: authenticate once, then search/notify/persist/sleep forever.
pub async fn run_live(
    mut client: MapClient,
    cfg: &Config,
    home: Coordinate,
    table: &RarityTable,
    notifier: &dyn Notifier,
) -> Result<()> {
    client.login().await.context("map service login")?;
    info!(
        lat = home.latitude,
        lon = home.longitude,
        "searching starting at home position"
    );

    let mut state = SearchState::default();
    let mut ticker =
        tokio::time::interval(std::time::Duration::from_secs(cfg.search.cycle_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let now = Utc::now();
        match run_cycle(
            &client,
            &mut state,
            &cfg.search,
            home,
            table,
            cfg.rarity_limit,
            cfg.distance_limit,
            now,
        )
        .await
        {
            Ok(report) => {
                dispatch(notifier, &report.events).await;
                // Best-effort persistence; a failed write never stops the loop.
                if let Err(e) =
                    snapshot::save(std::path::Path::new(&cfg.snapshot_path), &state.spawns)
                {
                    warn!(error = %e, "snapshot write failed");
                }
            }
            Err(CycleError::Grid(e)) => {
                error!(error = %e, "cycle skipped: bad grid parameters");
            }
            Err(CycleError::Auth(e)) => {
                return Err(e).context("map service rejected credentials mid-run");
            }
        }
    }
}

/// Replay mode: load the snapshot, re-run the notification pass with the
/// ledger bypassed, and exit. Nothing touches the network except delivery.
pub async fn run_replay(cfg: &Config, home: Coordinate, notifier: &dyn Notifier) -> Result<()> {
    let spawns = snapshot::load(std::path::Path::new(&cfg.snapshot_path))
        .with_context(|| format!("loading snapshot {}", cfg.snapshot_path))?;
    info!(spawns = spawns.len(), path = %cfg.snapshot_path, "replaying snapshot");

    let now = Utc::now();
    let ranked = rank(&spawns, home);
    let mut ledger = NotificationLedger::new();
    let events = decide(
        &ranked,
        home,
        cfg.rarity_limit,
        cfg.distance_limit,
        &mut ledger,
        now,
        true,
    );
    info!(events = events.len(), "replay decision pass complete");
    dispatch(notifier, &events).await;
    Ok(())
}
