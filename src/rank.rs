//! rank.rs — total order over the current spawn set for notification priority.

use crate::geo::{self, Coordinate};
use crate::spawn::{Spawn, SpawnSet};

/// Order: rarity descending, great-circle distance from `home` ascending,
/// identity ascending as the deterministic tie-break. Nothing is filtered
/// here; thresholds belong to the decision engine.
pub fn rank(spawns: &SpawnSet, home: Coordinate) -> Vec<Spawn> {
    let mut ordered: Vec<(f64, Spawn)> = spawns
        .values()
        .map(|s| (geo::distance_miles(home, s.position), s.clone()))
        .collect();
    ordered.sort_by(|(da, a), (db, b)| {
        b.rarity
            .cmp(&a.rarity)
            .then(da.total_cmp(db))
            .then_with(|| a.identity.cmp(&b.identity))
    });
    ordered.into_iter().map(|(_, s)| s).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn spawn(identity: &str, rarity: i32, lat: f64, lon: f64) -> Spawn {
        Spawn {
            identity: identity.to_string(),
            species_id: 1,
            species_name: "test".into(),
            rarity,
            position: Coordinate::new(lat, lon),
            disappear_time: Utc::now() + Duration::minutes(10),
        }
    }

    #[test]
    fn rarity_desc_then_distance_asc() {
        let home = Coordinate::new(0.0, 0.0);
        // A: rarity 5, ~2mi out; B: rarity 5, ~1mi out; C: rarity 8, ~10mi out.
        let a = spawn("a", 5, 0.029, 0.0);
        let b = spawn("b", 5, 0.0145, 0.0);
        let c = spawn("c", 8, 0.145, 0.0);

        let mut set = SpawnSet::new();
        for s in [&a, &b, &c] {
            set.insert(s.identity.clone(), s.clone());
        }

        let ranked = rank(&set, home);
        let order: Vec<&str> = ranked.iter().map(|s| s.identity.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn identical_keys_break_ties_by_identity() {
        let home = Coordinate::new(0.0, 0.0);
        let mut set = SpawnSet::new();
        for id in ["z", "m", "a"] {
            set.insert(id.to_string(), spawn(id, 3, 0.01, 0.01));
        }
        let ranked = rank(&set, home);
        let order: Vec<&str> = ranked.iter().map(|s| s.identity.as_str()).collect();
        assert_eq!(order, vec!["a", "m", "z"]);
    }

    #[test]
    fn nothing_is_filtered() {
        let home = Coordinate::new(0.0, 0.0);
        let mut set = SpawnSet::new();
        set.insert("far".into(), spawn("far", 0, 45.0, 90.0));
        assert_eq!(rank(&set, home).len(), 1);
    }
}
