//! decide.rs — threshold gate + at-most-once ledger over the ranked spawns.
//!
//! A decided event is decided, not delivered: transport failures downstream
//! never roll back the ledger insertion.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::geo::{self, Coordinate};
use crate::spawn::{Spawn, SpawnSet};

/// Identities already notified this run. Grows as events are emitted; shrinks
/// only in step with spawn-set expiry, via `retain_present`.
#[derive(Debug, Clone, Default)]
pub struct NotificationLedger {
    notified: HashSet<String>,
}

impl NotificationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.notified.contains(identity)
    }

    pub fn record(&mut self, identity: &str) {
        self.notified.insert(identity.to_string());
    }

    /// Forget identities whose spawn no longer exists. A later spawn at the
    /// same real-world point gets a fresh encounter token, so this never
    /// re-opens a notified spawn.
    pub fn retain_present(&mut self, spawns: &SpawnSet) {
        self.notified.retain(|id| spawns.contains_key(id));
    }

    pub fn len(&self) -> usize {
        self.notified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notified.is_empty()
    }
}

/// One spawn that cleared every gate, ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEvent {
    pub spawn: Spawn,
    pub distance_miles: f64,
    pub time_remaining: Duration,
}

/// Walk `ranked` in order and emit an event per spawn that clears the rarity
/// and distance thresholds (both inclusive) and is not already in the ledger.
///
/// `debug` bypasses the ledger entirely — no check, no insert — so replay can
/// re-inspect formatting without mutating state.
#[allow(clippy::too_many_arguments)]
pub fn decide(
    ranked: &[Spawn],
    home: Coordinate,
    rarity_limit: i32,
    distance_limit: f64,
    ledger: &mut NotificationLedger,
    now: DateTime<Utc>,
    debug: bool,
) -> Vec<NotificationEvent> {
    let mut events = Vec::new();
    for spawn in ranked {
        if !debug && ledger.contains(&spawn.identity) {
            continue;
        }
        if spawn.rarity < rarity_limit {
            continue;
        }
        let distance_miles = geo::distance_miles(home, spawn.position);
        if distance_miles > distance_limit {
            continue;
        }
        tracing::debug!(
            identity = %spawn.identity,
            species = %spawn.species_name,
            rarity = spawn.rarity,
            distance_miles,
            "spawn qualifies for notification"
        );
        events.push(NotificationEvent {
            spawn: spawn.clone(),
            distance_miles,
            time_remaining: spawn.disappear_time - now,
        });
        if !debug {
            ledger.record(&spawn.identity);
        }
    }
    events
}
