//! aggregate.rs — fold per-cell observations into the deduplicated spawn set.
//!
//! Deterministic given its inputs: the only clock is the supplied `now`, so
//! replays and tests never need a live clock.

use chrono::{DateTime, Utc};

use crate::rarity::RarityTable;
use crate::spawn::{RawObservation, Spawn, SpawnSet};

/// Counters for one aggregation pass, for the cycle log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub purged_expired: usize,
    pub dropped_stale: usize,
    pub inserted: usize,
    pub refreshed: usize,
}

/// Merge `observations` into `current`.
///
/// 1) purge entries already past their disappear time;
/// 2) drop observations that arrive expired;
/// 3) attach rarity (unknown species ⇒ 0, kept);
/// 4) upsert by identity — on conflict the later `disappear_time` wins, and the
///    winner's fields win wholesale.
pub fn aggregate(
    current: &mut SpawnSet,
    observations: Vec<RawObservation>,
    table: &RarityTable,
    now: DateTime<Utc>,
) -> AggregateStats {
    let mut stats = AggregateStats::default();

    let before = current.len();
    current.retain(|_, spawn| spawn.disappear_time > now);
    stats.purged_expired = before - current.len();

    for obs in observations {
        if obs.disappear_time <= now {
            stats.dropped_stale += 1;
            continue;
        }
        let rarity = table.rarity_of(obs.species_id);
        let spawn = Spawn::from_observation(obs, rarity);
        match current.get_mut(&spawn.identity) {
            None => {
                current.insert(spawn.identity.clone(), spawn);
                stats.inserted += 1;
            }
            Some(existing) => {
                if spawn.disappear_time > existing.disappear_time {
                    *existing = spawn;
                    stats.refreshed += 1;
                }
            }
        }
    }
    stats
}
