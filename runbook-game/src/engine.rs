//! Runbook state machine
//!
//! The engine owns the per-session state of one simulator: the active
//! scenario, the step pointer, the last action taken and the cumulative
//! score. All mutation goes through [`RunbookEngine::select_scenario`],
//! [`RunbookEngine::apply_action`], [`RunbookEngine::settle`] and the two
//! reset operations.
//!
//! Step changes are deferred. A next-bearing action registers a
//! [`PendingTransition`] identified by a [`TransitionToken`]; the host fires
//! [`RunbookEngine::settle`] with that token once the delay has elapsed. Any
//! state-resetting operation drops the pending transition, so a late timer
//! callback carrying an old token is a no-op.
use crate::catalog::ScenarioCatalog;
use crate::constants::{TRANSCRIPT_PLACEHOLDER, TRANSITION_DELAY_MS};
use crate::data::{Scenario, ScenarioKey, Step};
use crate::outcome::{Outcome, apply_delta};
use crate::rank::Rank;
use crate::score::{ScoreStore, load_or_default, persist};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by engine operations. State is left untouched on error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("unknown scenario key '{0}'")]
    InvalidScenarioKey(String),
    #[error("action '{action}' is not offered at step {step}")]
    UnknownAction { step: usize, action: String },
    #[error(
        "action '{action}' at step {step} of '{scenario}' targets step {next} but only {steps} exist"
    )]
    InvalidTransition {
        scenario: ScenarioKey,
        step: usize,
        action: String,
        next: usize,
        steps: usize,
    },
}

/// Identity of one scheduled step change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransitionToken(u64);

impl TransitionToken {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// A step change waiting for its settling delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransition {
    pub token: TransitionToken,
    pub target: usize,
    pub delay: Duration,
}

/// What happened when an action was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    pub action_id: String,
    pub outcome: Outcome,
    /// Change actually applied to the score, after the zero floor.
    pub applied_delta: i32,
    pub score: u32,
    pub pending: Option<PendingTransition>,
    pub resolved: bool,
}

/// Read-only view of the engine, for reports and debugging bridges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub scenario: ScenarioKey,
    pub step_index: usize,
    pub step_count: usize,
    pub last_action_id: Option<String>,
    pub last_result: Option<Outcome>,
    pub transcript: String,
    pub score: u32,
    pub rank: Rank,
    pub resolved: bool,
    pub pending: Option<TransitionToken>,
}

pub struct RunbookEngine<S>
where
    S: ScoreStore,
{
    catalog: Rc<ScenarioCatalog>,
    store: S,
    active: ScenarioKey,
    step_index: usize,
    last_action_id: Option<String>,
    last_result: Option<Outcome>,
    transcript: String,
    score: u32,
    pending: Option<PendingTransition>,
    next_token: u64,
}

impl<S> RunbookEngine<S>
where
    S: ScoreStore,
{
    /// Create an engine on the catalog's first scenario, loading the score
    /// from `store`.
    pub fn new(catalog: Rc<ScenarioCatalog>, store: S) -> Self {
        let score = load_or_default(&store);
        let active = catalog.first().key;
        log::debug!("runbook engine ready on '{active}' with score {score}");
        Self {
            catalog,
            store,
            active,
            step_index: 0,
            last_action_id: None,
            last_result: None,
            transcript: String::new(),
            score,
            pending: None,
            next_token: 0,
        }
    }

    // Accessors --------------------------------------------------------------

    #[must_use]
    pub const fn catalog(&self) -> &Rc<ScenarioCatalog> {
        &self.catalog
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn active_key(&self) -> ScenarioKey {
        self.active
    }

    #[must_use]
    pub fn scenario(&self) -> &Scenario {
        self.catalog
            .get(self.active)
            .unwrap_or_else(|| self.catalog.first())
    }

    #[must_use]
    pub fn current_step(&self) -> &Step {
        let scenario = self.scenario();
        scenario
            .step(self.step_index)
            .unwrap_or(&scenario.steps[0])
    }

    #[must_use]
    pub const fn step_index(&self) -> usize {
        self.step_index
    }

    #[must_use]
    pub fn last_action_id(&self) -> Option<&str> {
        self.last_action_id.as_deref()
    }

    #[must_use]
    pub const fn last_result(&self) -> Option<Outcome> {
        self.last_result
    }

    #[must_use]
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    #[must_use]
    pub fn transcript_or_placeholder(&self) -> &str {
        if self.transcript.is_empty() {
            TRANSCRIPT_PLACEHOLDER
        } else {
            &self.transcript
        }
    }

    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub const fn rank(&self) -> Rank {
        Rank::from_score(self.score)
    }

    #[must_use]
    pub const fn pending(&self) -> Option<PendingTransition> {
        self.pending
    }

    /// Reached flag per step, for progress indicators.
    #[must_use]
    pub fn progress(&self) -> Vec<bool> {
        (0..self.scenario().steps.len())
            .map(|idx| idx <= self.step_index)
            .collect()
    }

    /// True once the final step has been closed by a successful terminal
    /// action. Derived on every call.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        if self.step_index < self.scenario().last_step_index()
            || self.last_result != Some(Outcome::Ok)
        {
            return false;
        }
        self.last_action_id
            .as_deref()
            .and_then(|id| self.current_step().action(id))
            .is_some_and(crate::data::Action::is_terminal)
    }

    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            scenario: self.active,
            step_index: self.step_index,
            step_count: self.scenario().steps.len(),
            last_action_id: self.last_action_id.clone(),
            last_result: self.last_result,
            transcript: self.transcript.clone(),
            score: self.score,
            rank: self.rank(),
            resolved: self.is_resolved(),
            pending: self.pending.map(|pending| pending.token),
        }
    }

    // Operations -------------------------------------------------------------

    /// Switch to `key` and restart it from the first step.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidScenarioKey`] if the loaded catalog does
    /// not define `key`.
    pub fn select_scenario(&mut self, key: ScenarioKey) -> Result<(), EngineError> {
        if !self.catalog.contains(key) {
            return Err(EngineError::InvalidScenarioKey(key.to_string()));
        }
        log::debug!("scenario selected: '{}' -> '{key}'", self.active);
        self.active = key;
        self.reset_scenario();
        Ok(())
    }

    /// String entry point for [`Self::select_scenario`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidScenarioKey`] for names outside the
    /// closed scenario set or missing from the catalog.
    pub fn select_scenario_by_name(&mut self, name: &str) -> Result<(), EngineError> {
        let key = name
            .parse::<ScenarioKey>()
            .map_err(|_| EngineError::InvalidScenarioKey(name.to_string()))?;
        self.select_scenario(key)
    }

    /// Apply the action `action_id` of the current step.
    ///
    /// Replaces the transcript, updates and persists the score, and, for
    /// next-bearing actions, registers a pending transition that replaces any
    /// earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownAction`] if the current step offers no
    /// such action, or [`EngineError::InvalidTransition`] if its target step
    /// does not exist.
    pub fn apply_action(&mut self, action_id: &str) -> Result<ActionReport, EngineError> {
        let step = self.step_index;
        let steps = self.scenario().steps.len();
        let action = self
            .current_step()
            .action(action_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownAction {
                step,
                action: action_id.to_string(),
            })?;
        if let Some(next) = action.next
            && next >= steps
        {
            return Err(EngineError::InvalidTransition {
                scenario: self.active,
                step,
                action: action.id,
                next,
                steps,
            });
        }

        if let Some(stale) = self.pending.take() {
            log::debug!("superseding pending transition {:?}", stale.token);
        }

        let before = self.score;
        self.score = apply_delta(before, action.result.score_delta());
        persist(&self.store, self.score);
        let applied_delta = i32::try_from(i64::from(self.score) - i64::from(before))
            .unwrap_or(action.result.score_delta());

        self.transcript = action.transcript();
        self.last_result = Some(action.result);
        self.last_action_id = Some(action.id.clone());

        let pending = action.next.map(|target| PendingTransition {
            token: self.issue_token(),
            target,
            delay: Duration::from_millis(TRANSITION_DELAY_MS),
        });
        self.pending = pending;

        log::debug!(
            "'{}' step {step}: action '{}' -> {} ({applied_delta:+}), score {}, next {:?}",
            self.active,
            action.id,
            action.result,
            self.score,
            action.next
        );

        Ok(ActionReport {
            action_id: action.id,
            outcome: action.result,
            applied_delta,
            score: self.score,
            pending,
            resolved: self.is_resolved(),
        })
    }

    /// Complete the pending transition identified by `token`.
    ///
    /// Returns `false` without touching state when `token` is stale.
    pub fn settle(&mut self, token: TransitionToken) -> bool {
        match self.pending {
            Some(pending) if pending.token == token => {
                self.pending = None;
                self.step_index = pending.target;
                self.last_action_id = None;
                self.last_result = None;
                log::debug!("'{}' advanced to step {}", self.active, pending.target);
                true
            }
            _ => {
                log::trace!("ignoring stale transition token {token:?}");
                false
            }
        }
    }

    /// Settle whatever transition is pending without waiting for its delay.
    pub fn settle_pending(&mut self) -> bool {
        self.pending
            .map(|pending| pending.token)
            .is_some_and(|token| self.settle(token))
    }

    /// Drop the pending transition, if any.
    pub fn cancel_pending(&mut self) -> Option<PendingTransition> {
        let cancelled = self.pending.take();
        if let Some(pending) = cancelled {
            log::debug!("cancelled pending transition {:?}", pending.token);
        }
        cancelled
    }

    /// Restart the active scenario. The score is kept.
    pub fn reset_scenario(&mut self) {
        self.cancel_pending();
        self.step_index = 0;
        self.last_action_id = None;
        self.last_result = None;
        self.transcript.clear();
        log::debug!("'{}' reset to step 0", self.active);
    }

    /// Zero the score and persist it.
    pub fn reset_score(&mut self) {
        self.score = 0;
        persist(&self.store, self.score);
        log::debug!("score reset");
    }

    fn issue_token(&mut self) -> TransitionToken {
        self.next_token = self.next_token.wrapping_add(1);
        TransitionToken(self.next_token)
    }
}
