use anyhow::{Context, Result};
use runbook_game::{DataLoader, MemoryScoreStore, ScenarioCatalog, ScenarioData, Simulator};

const RUNBOOKS_JSON: &str = include_str!("../../../runbook-web/static/assets/data/runbooks.json");

/// Loads the scenario asset shipped with the web build.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedDataLoader;

impl DataLoader for EmbeddedDataLoader {
    type Error = serde_json::Error;

    fn load_scenario_data(&self) -> Result<ScenarioData, Self::Error> {
        ScenarioData::from_json(RUNBOOKS_JSON)
    }
}

pub fn load_catalog() -> Result<ScenarioCatalog> {
    Simulator::new(EmbeddedDataLoader, MemoryScoreStore::default())
        .load_catalog()
        .context("loading embedded runbook catalog")
}

#[cfg(test)]
mod tests {
    use super::*;
    use runbook_game::ScenarioKey;

    #[test]
    fn embedded_catalog_covers_every_key() {
        let catalog = load_catalog().unwrap();
        let keys: Vec<_> = catalog.keys().collect();
        assert_eq!(keys, ScenarioKey::ALL.to_vec());
    }
}
