use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use runbook_game::{Outcome, Step};

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub action_id: String,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub fn new(action_id: impl Into<String>, rationale: Option<String>) -> Self {
        Self {
            action_id: action_id.into(),
            rationale,
        }
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Select an action at `step`. `attempt` counts earlier picks made at the
    /// same step index during this run.
    fn pick_action(&mut self, step: &Step, attempt: usize) -> PolicyDecision;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy '{0}'")]
pub struct UnknownStrategy(pub String);

/// Built-in play strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayStrategy {
    /// Always the `ok` action
    Optimal,
    /// One hesitant `warn` per step, then the `ok` action
    Cautious,
    /// Worst available outcome every time
    Reckless,
    /// Uniform pick, seeded
    Random,
}

impl PlayStrategy {
    pub const ALL: [Self; 4] = [Self::Optimal, Self::Cautious, Self::Reckless, Self::Random];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Cautious => "cautious",
            Self::Reckless => "reckless",
            Self::Random => "random",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Optimal => "Optimal",
            Self::Cautious => "Cautious",
            Self::Reckless => "Reckless",
            Self::Random => "Random",
        }
    }

    /// Strategies expected to close every scenario within the action budget.
    #[must_use]
    pub const fn must_resolve(self) -> bool {
        matches!(self, Self::Optimal | Self::Cautious)
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy> {
        match self {
            Self::Optimal => Box::new(OptimalPolicy),
            Self::Cautious => Box::new(CautiousPolicy),
            Self::Reckless => Box::new(RecklessPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for PlayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PlayStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

struct OptimalPolicy;
struct CautiousPolicy;
struct RecklessPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

fn first_with(step: &Step, outcome: Outcome) -> Option<&str> {
    step.actions
        .iter()
        .find(|action| action.result == outcome)
        .map(|action| action.id.as_str())
}

fn first_action(step: &Step) -> &str {
    step.actions
        .first()
        .map_or("", |action| action.id.as_str())
}

const fn badness(outcome: Outcome) -> u8 {
    match outcome {
        Outcome::Ok => 0,
        Outcome::Warn => 1,
        Outcome::Fail => 2,
    }
}

impl PlayerPolicy for OptimalPolicy {
    fn name(&self) -> &'static str {
        "Optimal"
    }

    fn pick_action(&mut self, step: &Step, _attempt: usize) -> PolicyDecision {
        first_with(step, Outcome::Ok).map_or_else(
            || PolicyDecision::new(first_action(step), Some("no ok action".to_string())),
            |id| PolicyDecision::new(id, None),
        )
    }
}

impl PlayerPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "Cautious"
    }

    fn pick_action(&mut self, step: &Step, attempt: usize) -> PolicyDecision {
        if attempt == 0
            && let Some(id) = first_with(step, Outcome::Warn)
        {
            return PolicyDecision::new(id, Some("hedging first".to_string()));
        }
        OptimalPolicy.pick_action(step, attempt)
    }
}

impl PlayerPolicy for RecklessPolicy {
    fn name(&self) -> &'static str {
        "Reckless"
    }

    fn pick_action(&mut self, step: &Step, _attempt: usize) -> PolicyDecision {
        // Earliest action among the worst outcomes.
        let worst = step
            .actions
            .iter()
            .rev()
            .max_by_key(|action| badness(action.result));
        worst.map_or_else(
            || PolicyDecision::new(first_action(step), None),
            |action| PolicyDecision::new(action.id.clone(), Some(format!("{}", action.result))),
        )
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn pick_action(&mut self, step: &Step, _attempt: usize) -> PolicyDecision {
        if step.actions.is_empty() {
            return PolicyDecision::new("", None);
        }
        let idx = self.rng.gen_range(0..step.actions.len());
        PolicyDecision::new(
            step.actions[idx].id.clone(),
            Some(format!("roll {idx}")),
        )
    }
}
