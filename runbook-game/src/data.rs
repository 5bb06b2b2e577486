use crate::outcome::Outcome;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Closed set of authored incident scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScenarioKey {
    #[serde(rename = "k8s-latency")]
    K8sLatency,
    #[serde(rename = "cicd-red")]
    CicdRed,
    #[serde(rename = "stp-loop")]
    StpLoop,
    #[serde(rename = "aws-cost")]
    AwsCost,
}

impl ScenarioKey {
    pub const ALL: [Self; 4] = [Self::K8sLatency, Self::CicdRed, Self::StpLoop, Self::AwsCost];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::K8sLatency => "k8s-latency",
            Self::CicdRed => "cicd-red",
            Self::StpLoop => "stp-loop",
            Self::AwsCost => "aws-cost",
        }
    }
}

impl fmt::Display for ScenarioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known scenario.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scenario key '{0}'")]
pub struct UnknownScenarioKey(pub String);

impl FromStr for ScenarioKey {
    type Err = UnknownScenarioKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownScenarioKey(s.to_string()))
    }
}

/// A selectable choice at a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub label: String,
    pub result: Outcome,
    pub output: String,
    /// Index of the follow-up step in the same scenario; `None` is terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<usize>,
}

impl Action {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.next.is_none()
    }

    /// Transcript entry shown after the action is taken.
    #[must_use]
    pub fn transcript(&self) -> String {
        format!(
            "{}{}\n\n{}",
            crate::constants::TRANSCRIPT_PROMPT,
            self.label,
            self.output
        )
    }
}

/// One decision point in a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub title: String,
    pub prompt: String,
    pub actions: SmallVec<[Action; 3]>,
}

impl Step {
    #[must_use]
    pub fn action(&self, id: &str) -> Option<&Action> {
        self.actions.iter().find(|action| action.id == id)
    }
}

/// A named branching incident-response script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub key: ScenarioKey,
    pub title: String,
    pub subtitle: String,
    #[serde(default)]
    pub icons: Vec<String>,
    pub steps: Vec<Step>,
    pub success_message: String,
}

impl Scenario {
    #[must_use]
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    #[must_use]
    pub fn last_step_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Score earned by a run that picks the `ok` action on every step.
    #[must_use]
    pub fn max_clean_score(&self) -> u32 {
        let steps = u32::try_from(self.steps.len()).unwrap_or(u32::MAX);
        steps.saturating_mul(crate::constants::SCORE_DELTA_OK.unsigned_abs())
    }
}

/// Raw JSON container for the scenario catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScenarioData {
    pub scenarios: Vec<Scenario>,
}

impl ScenarioData {
    /// Create empty scenario data (useful for tests)
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            scenarios: Vec::new(),
        }
    }

    /// Parse scenario data from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid scenario data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
