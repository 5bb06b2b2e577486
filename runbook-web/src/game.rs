//! Web-specific simulator bindings
//!
//! This module provides web-specific implementations of the runbook-game
//! traits and re-exports the core simulator types.

use once_cell::sync::Lazy;
use std::rc::Rc;

// Re-export all types from runbook-game
pub use runbook_game::*;

const RUNBOOKS_JSON: &str = include_str!("../static/assets/data/runbooks.json");

/// Web-specific data loader reading the embedded scenario asset
#[derive(Debug, Clone, Copy, Default)]
pub struct WebDataLoader;

#[derive(Debug, thiserror::Error)]
pub enum WebDataError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl DataLoader for WebDataLoader {
    type Error = WebDataError;

    fn load_scenario_data(&self) -> Result<ScenarioData, Self::Error> {
        ScenarioData::from_json(RUNBOOKS_JSON).map_err(WebDataError::Json)
    }
}

static BUILTIN_CATALOG: Lazy<Result<ScenarioCatalog, String>> = Lazy::new(|| {
    WebDataLoader
        .load_scenario_data()
        .map_err(|err| err.to_string())
        .and_then(|data| ScenarioCatalog::from_data(data).map_err(|err| err.to_string()))
});

/// The validated scenario catalog shipped with the site.
///
/// # Errors
///
/// Returns an error if the embedded asset is malformed.
pub fn builtin_catalog() -> Result<Rc<ScenarioCatalog>, WebDataError> {
    BUILTIN_CATALOG
        .as_ref()
        .map(|catalog| Rc::new(catalog.clone()))
        .map_err(|err| WebDataError::Catalog(err.clone()))
}

/// Score store backed by the browser's `localStorage`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalScoreStore;

#[derive(Debug, thiserror::Error)]
pub enum WebStorageError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Storage unavailable outside the browser")]
    Unavailable,
}

#[cfg(target_arch = "wasm32")]
impl ScoreStore for LocalScoreStore {
    type Error = WebStorageError;

    fn load(&self) -> Result<Option<u32>, Self::Error> {
        use gloo::storage::{LocalStorage, Storage};

        // Read the raw string so garbage and negative values go through
        // the same parser as every other store.
        let raw = LocalStorage::raw()
            .get_item(constants::SCORE_STORAGE_KEY)
            .map_err(|e| WebStorageError::Storage(format!("{e:?}")))?;
        Ok(raw.as_deref().and_then(parse_stored_score))
    }

    fn save(&self, score: u32) -> Result<(), Self::Error> {
        use gloo::storage::{LocalStorage, Storage};

        LocalStorage::set(constants::SCORE_STORAGE_KEY, score)
            .map_err(|e| WebStorageError::Storage(format!("{e:?}")))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ScoreStore for LocalScoreStore {
    type Error = WebStorageError;

    fn load(&self) -> Result<Option<u32>, Self::Error> {
        Err(WebStorageError::Unavailable)
    }

    fn save(&self, _score: u32) -> Result<(), Self::Error> {
        Err(WebStorageError::Unavailable)
    }
}

/// Create a web-compatible simulator with `WebDataLoader` and `LocalScoreStore`
#[must_use]
pub const fn create_web_simulator() -> Simulator<WebDataLoader, LocalScoreStore> {
    Simulator::new(WebDataLoader, LocalScoreStore)
}
