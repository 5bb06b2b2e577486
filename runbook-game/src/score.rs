//! Score persistence boundary
//!
//! The engine never talks to a storage backend directly. Hosts inject a
//! [`ScoreStore`]; a failing store only costs persistence, never the session.
use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

/// Trait for abstracting the persisted cumulative score.
/// Platform-specific implementations should provide this
pub trait ScoreStore {
    type Error: std::error::Error + 'static;

    /// Load the previously stored score.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage is unavailable.
    fn load(&self) -> Result<Option<u32>, Self::Error>;

    /// Persist the score synchronously.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage rejects the write.
    fn save(&self, score: u32) -> Result<(), Self::Error>;
}

impl<S: ScoreStore + ?Sized> ScoreStore for Rc<S> {
    type Error = S::Error;

    fn load(&self) -> Result<Option<u32>, Self::Error> {
        (**self).load()
    }

    fn save(&self, score: u32) -> Result<(), Self::Error> {
        (**self).save(score)
    }
}

/// In-memory store; clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    slot: Rc<Cell<Option<u32>>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryScoreStore {
    #[must_use]
    pub fn with_score(score: u32) -> Self {
        let store = Self::default();
        store.slot.set(Some(score));
        store
    }

    #[must_use]
    pub fn stored(&self) -> Option<u32> {
        self.slot.get()
    }

    /// Number of successful `save` calls so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl ScoreStore for MemoryScoreStore {
    type Error = Infallible;

    fn load(&self) -> Result<Option<u32>, Self::Error> {
        Ok(self.slot.get())
    }

    fn save(&self, score: u32) -> Result<(), Self::Error> {
        self.slot.set(Some(score));
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// Parse a persisted score string.
///
/// Negative values clamp to zero; anything unparsable yields `None`.
#[must_use]
pub fn parse_stored_score(raw: &str) -> Option<u32> {
    let value = raw.trim().parse::<i64>().ok()?;
    Some(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
}

/// Read the initial score, degrading to zero when storage misbehaves.
pub fn load_or_default<S: ScoreStore>(store: &S) -> u32 {
    match store.load() {
        Ok(Some(score)) => score,
        Ok(None) => 0,
        Err(err) => {
            log::warn!("score storage unavailable on load, starting from 0: {err}");
            0
        }
    }
}

/// Persist `score`, keeping the in-memory value authoritative on failure.
pub fn persist<S: ScoreStore>(store: &S, score: u32) {
    if let Err(err) = store.save(score) {
        log::warn!("score storage unavailable on save, keeping {score} in memory: {err}");
    }
}
