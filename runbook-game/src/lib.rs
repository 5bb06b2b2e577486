//! Runbook Simulator Engine
//!
//! Platform-agnostic core logic for the incident-response runbook simulator.
//! This crate provides the scenario model, catalog validation, the scoring
//! state machine and the score persistence boundary, without UI or
//! platform-specific dependencies.

pub mod catalog;
pub mod constants;
pub mod data;
pub mod engine;
pub mod outcome;
pub mod rank;
pub mod score;

// Re-export commonly used types
pub use catalog::{CatalogError, ScenarioCatalog, validate_scenarios};
pub use data::{Action, Scenario, ScenarioData, ScenarioKey, Step, UnknownScenarioKey};
pub use engine::{
    ActionReport, EngineError, EngineSnapshot, PendingTransition, RunbookEngine, TransitionToken,
};
pub use outcome::{Outcome, apply_delta};
pub use rank::Rank;
pub use score::{MemoryScoreStore, ScoreStore, parse_stored_score};

use std::rc::Rc;

/// Trait for abstracting scenario data loading
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the raw scenario data from the platform-specific source
    ///
    /// # Errors
    ///
    /// Returns an error if the scenario data cannot be loaded or parsed.
    fn load_scenario_data(&self) -> Result<ScenarioData, Self::Error>;
}

/// Entry point tying a data source to a score store
pub struct Simulator<L, S>
where
    L: DataLoader,
    S: ScoreStore + Clone,
{
    data_loader: L,
    store: S,
}

impl<L, S> Simulator<L, S>
where
    L: DataLoader,
    S: ScoreStore + Clone,
{
    /// Create a simulator with the provided data loader and score store
    pub const fn new(data_loader: L, store: S) -> Self {
        Self { data_loader, store }
    }

    /// Load and validate the scenario catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be loaded or violates catalog
    /// invariants.
    pub fn load_catalog(&self) -> Result<ScenarioCatalog, anyhow::Error> {
        let data = self.data_loader.load_scenario_data()?;
        Ok(ScenarioCatalog::from_data(data)?)
    }

    /// Start a fresh session on the catalog's first scenario
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn create_engine(&self) -> Result<RunbookEngine<S>, anyhow::Error> {
        let catalog = Rc::new(self.load_catalog()?);
        Ok(self.engine_for(catalog))
    }

    /// Start a session on an already loaded catalog
    #[must_use]
    pub fn engine_for(&self, catalog: Rc<ScenarioCatalog>) -> RunbookEngine<S> {
        RunbookEngine::new(catalog, self.store.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    const FIXTURE: &str = r#"{
        "scenarios": [
            {
                "key": "aws-cost",
                "title": "Cost",
                "subtitle": "Bill climbing",
                "success_message": "Under control",
                "steps": [
                    {
                        "title": "Act",
                        "prompt": "Fix it?",
                        "actions": [
                            { "id": "lifecycle", "label": "Lifecycle rules", "result": "ok", "output": "done" },
                            { "id": "delete", "label": "Delete logs", "result": "warn", "output": "risky", "next": 0 }
                        ]
                    }
                ]
            }
        ]
    }"#;

    impl DataLoader for FixtureLoader {
        type Error = serde_json::Error;

        fn load_scenario_data(&self) -> Result<ScenarioData, Self::Error> {
            ScenarioData::from_json(FIXTURE)
        }
    }

    struct EmptyLoader;

    impl DataLoader for EmptyLoader {
        type Error = Infallible;

        fn load_scenario_data(&self) -> Result<ScenarioData, Self::Error> {
            Ok(ScenarioData::empty())
        }
    }

    #[test]
    fn simulator_engines_share_the_score_store() {
        let store = MemoryScoreStore::default();
        let simulator = Simulator::new(FixtureLoader, store.clone());
        let mut engine = simulator.create_engine().unwrap();
        assert_eq!(engine.active_key(), ScenarioKey::AwsCost);
        engine.apply_action("lifecycle").unwrap();
        assert!(engine.is_resolved());
        assert_eq!(store.stored(), Some(12));

        let reloaded = simulator.engine_for(Rc::clone(engine.catalog()));
        assert_eq!(reloaded.score(), 12);
    }

    #[test]
    fn simulator_rejects_invalid_catalog() {
        let simulator = Simulator::new(EmptyLoader, MemoryScoreStore::default());
        let err = simulator.create_engine().err().expect("empty catalog fails");
        assert!(err.to_string().contains("no scenarios"));
    }
}
