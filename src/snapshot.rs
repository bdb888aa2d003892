//! snapshot.rs — flat-file JSON persistence of the spawn set.
//!
//! Written best-effort after every live cycle; read once in replay mode. The
//! on-disk shape is an object keyed by identity, with flat latitude/longitude
//! and epoch-millisecond disappear times (the wire precision), mapped through
//! an explicit record type.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Coordinate;
use crate::spawn::{Spawn, SpawnSet};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot encoding at {path}: {source}")]
    Codec {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One spawn as stored on disk.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotRecord {
    identity: String,
    species_id: u32,
    species_name: String,
    rarity: i32,
    latitude: f64,
    longitude: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    disappear_time: DateTime<Utc>,
}

impl From<&Spawn> for SnapshotRecord {
    fn from(s: &Spawn) -> Self {
        Self {
            identity: s.identity.clone(),
            species_id: s.species_id,
            species_name: s.species_name.clone(),
            rarity: s.rarity,
            latitude: s.position.latitude,
            longitude: s.position.longitude,
            disappear_time: s.disappear_time,
        }
    }
}

impl From<SnapshotRecord> for Spawn {
    fn from(r: SnapshotRecord) -> Self {
        Self {
            identity: r.identity,
            species_id: r.species_id,
            species_name: r.species_name,
            rarity: r.rarity,
            position: Coordinate::new(r.latitude, r.longitude),
            disappear_time: r.disappear_time,
        }
    }
}

pub fn save(path: &Path, spawns: &SpawnSet) -> Result<(), SnapshotError> {
    let records: BTreeMap<&str, SnapshotRecord> = spawns
        .iter()
        .map(|(id, s)| (id.as_str(), SnapshotRecord::from(s)))
        .collect();
    let json = serde_json::to_string_pretty(&records).map_err(|source| SnapshotError::Codec {
        path: path.display().to_string(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn load(path: &Path) -> Result<SpawnSet, SnapshotError> {
    let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let records: BTreeMap<String, SnapshotRecord> =
        serde_json::from_str(&content).map_err(|source| SnapshotError::Codec {
            path: path.display().to_string(),
            source,
        })?;
    Ok(records
        .into_iter()
        .map(|(id, r)| (id, Spawn::from(r)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn spawn(identity: &str, species: u32, rarity: i32) -> Spawn {
        Spawn {
            identity: identity.to_string(),
            species_id: species,
            species_name: format!("species-{species}"),
            rarity,
            position: Coordinate::new(40.7128, -74.0060),
            disappear_time: Utc.with_ymd_and_hms(2026, 8, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn snapshot_round_trips() {
        let mut set = SpawnSet::new();
        for (id, species, rarity) in [("a", 149, 9), ("b", 16, 1), ("c", 9999, 0)] {
            set.insert(id.to_string(), spawn(id, species, rarity));
        }

        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("snapshot.json");
        save(&p, &set).unwrap();
        let loaded = load(&p).unwrap();
        assert_eq!(loaded, set);
    }

    #[test]
    fn sub_second_disappear_times_survive_the_round_trip() {
        let mut s = spawn("a", 149, 9);
        s.disappear_time = Utc.timestamp_millis_opt(1_700_000_000_500).unwrap();
        let mut set = SpawnSet::new();
        set.insert("a".into(), s);

        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("snapshot.json");
        save(&p, &set).unwrap();
        let loaded = load(&p).unwrap();
        assert_eq!(loaded, set);
        assert_eq!(
            loaded["a"].disappear_time.timestamp_millis(),
            1_700_000_000_500
        );
    }

    #[test]
    fn disk_shape_is_flat_with_epoch_millis() {
        let mut set = SpawnSet::new();
        set.insert("a".into(), spawn("a", 149, 9));

        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("snapshot.json");
        save(&p, &set).unwrap();

        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&p).unwrap()).unwrap();
        let rec = &v["a"];
        assert_eq!(rec["identity"], "a");
        assert_eq!(rec["species_id"], 149);
        assert_eq!(rec["rarity"], 9);
        assert!(rec["latitude"].is_f64());
        assert!(rec["longitude"].is_f64());
        assert!(rec["disappear_time"].is_i64());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load(Path::new("/nonexistent/snapshot.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }
}
