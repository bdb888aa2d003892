//! rarity.rs — externally supplied species→rarity classification table.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const ENV_PATH: &str = "RARITY_TABLE_PATH";
const DEFAULT_PATH: &str = "config/rarity.json";

/// Higher = rarer. Species missing from the table rank lowest but are never
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct RarityTable {
    by_species: HashMap<u32, i32>,
}

impl RarityTable {
    pub fn new(by_species: HashMap<u32, i32>) -> Self {
        Self { by_species }
    }

    pub fn rarity_of(&self, species_id: u32) -> i32 {
        self.by_species.get(&species_id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.by_species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_species.is_empty()
    }

    /// Load from an explicit path. JSON object of `"species_id": rarity`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading rarity table from {}", path.display()))?;
        let raw: HashMap<String, i32> =
            serde_json::from_str(&content).context("parsing rarity table JSON")?;
        let mut by_species = HashMap::with_capacity(raw.len());
        for (k, v) in raw {
            let id: u32 = k
                .parse()
                .with_context(|| format!("non-numeric species id {k:?} in rarity table"))?;
            by_species.insert(id, v);
        }
        Ok(Self { by_species })
    }

    /// Load using env var + fallbacks:
    /// 1) $RARITY_TABLE_PATH
    /// 2) config/rarity.json
    /// 3) empty table (every species rarity 0)
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            return Self::load_from(&PathBuf::from(p));
        }
        let default = PathBuf::from(DEFAULT_PATH);
        if default.exists() {
            return Self::load_from(&default);
        }
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn parses_json_object_and_defaults_to_zero() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("rarity.json");
        fs::write(&p, r#"{"149": 9, "16": 1}"#).unwrap();
        let table = RarityTable::load_from(&p).unwrap();
        assert_eq!(table.rarity_of(149), 9);
        assert_eq!(table.rarity_of(16), 1);
        assert_eq!(table.rarity_of(9999), 0);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn rejects_non_numeric_species_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("rarity.json");
        fs::write(&p, r#"{"dragonite": 9}"#).unwrap();
        assert!(RarityTable::load_from(&p).is_err());
    }

    #[serial_test::serial]
    #[test]
    fn default_is_empty_without_file_or_env() {
        std::env::remove_var(ENV_PATH);
        let old = std::env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        std::env::set_current_dir(tmp.path()).unwrap();

        let table = RarityTable::load_default().unwrap();
        assert!(table.is_empty());

        std::env::set_current_dir(&old).unwrap();
    }
}
