//! spawn.rs — fixed-schema records for observed spawns.
//!
//! `identity` is species + spawn-point + encounter token as minted by the map
//! service; two spawns of the same species at different points or times get
//! distinct identities. The core treats it as an opaque key.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// What the lookup adapter hands back, before rarity classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub identity: String,
    pub species_id: u32,
    pub species_name: String,
    pub position: Coordinate,
    pub disappear_time: DateTime<Utc>,
}

/// One observed time-limited entity, with its rarity tier attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spawn {
    pub identity: String,
    pub species_id: u32,
    pub species_name: String,
    pub rarity: i32,
    pub position: Coordinate,
    pub disappear_time: DateTime<Utc>,
}

impl Spawn {
    pub fn from_observation(obs: RawObservation, rarity: i32) -> Self {
        Self {
            identity: obs.identity,
            species_id: obs.species_id,
            species_name: obs.species_name,
            rarity,
            position: obs.position,
            disappear_time: obs.disappear_time,
        }
    }
}

/// Current working set, keyed by identity. BTreeMap keeps iteration and
/// snapshot serialization deterministic.
pub type SpawnSet = BTreeMap<String, Spawn>;
