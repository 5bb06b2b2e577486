//! Static scenario registry and its structural validation
use crate::data::{Scenario, ScenarioData, ScenarioKey};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised when scenario data violates catalog invariants.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("scenario data could not be parsed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog contains no scenarios")]
    Empty,
    #[error("scenario '{0}' is defined more than once")]
    DuplicateScenario(ScenarioKey),
    #[error("scenario '{0}' has no steps")]
    EmptyScenario(ScenarioKey),
    #[error("scenario '{scenario}' step {step} has no actions")]
    EmptyStep { scenario: ScenarioKey, step: usize },
    #[error("scenario '{scenario}' step {step} repeats action id '{action}'")]
    DuplicateAction {
        scenario: ScenarioKey,
        step: usize,
        action: String,
    },
    #[error(
        "scenario '{scenario}' step {step} action '{action}' targets step {next} but only {steps} exist"
    )]
    InvalidTransition {
        scenario: ScenarioKey,
        step: usize,
        action: String,
        next: usize,
        steps: usize,
    },
    #[error("scenario '{0}' final step has no terminal action")]
    NoTerminalAction(ScenarioKey),
}

/// Read-only registry of every scenario, in presentation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    /// Build a catalog from parsed scenarios.
    ///
    /// # Errors
    ///
    /// Returns the first structural violation found by [`validate_scenarios`].
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self, CatalogError> {
        validate_scenarios(&scenarios)?;
        Ok(Self { scenarios })
    }

    /// Parse and validate a catalog from its JSON asset.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the scenarios are invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::from_data(ScenarioData::from_json(json)?)
    }

    /// # Errors
    ///
    /// Returns an error if the scenarios are structurally invalid.
    pub fn from_data(data: ScenarioData) -> Result<Self, CatalogError> {
        Self::new(data.scenarios)
    }

    #[must_use]
    pub fn get(&self, key: ScenarioKey) -> Option<&Scenario> {
        self.scenarios.iter().find(|scenario| scenario.key == key)
    }

    #[must_use]
    pub fn contains(&self, key: ScenarioKey) -> bool {
        self.get(key).is_some()
    }

    /// First scenario in presentation order; the default selection.
    ///
    /// # Panics
    ///
    /// Never in practice: construction rejects empty catalogs.
    #[must_use]
    pub fn first(&self) -> &Scenario {
        &self.scenarios[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = ScenarioKey> + '_ {
        self.scenarios.iter().map(|scenario| scenario.key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

/// Check every catalog invariant the engine relies on.
///
/// # Errors
///
/// Returns the first violation in catalog order.
pub fn validate_scenarios(scenarios: &[Scenario]) -> Result<(), CatalogError> {
    if scenarios.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut seen_keys = HashSet::new();
    for scenario in scenarios {
        if !seen_keys.insert(scenario.key) {
            return Err(CatalogError::DuplicateScenario(scenario.key));
        }
        validate_scenario(scenario)?;
    }
    Ok(())
}

fn validate_scenario(scenario: &Scenario) -> Result<(), CatalogError> {
    let steps = scenario.steps.len();
    if steps == 0 {
        return Err(CatalogError::EmptyScenario(scenario.key));
    }

    for (step_idx, step) in scenario.steps.iter().enumerate() {
        if step.actions.is_empty() {
            return Err(CatalogError::EmptyStep {
                scenario: scenario.key,
                step: step_idx,
            });
        }
        let mut seen_ids = HashSet::new();
        for action in &step.actions {
            if !seen_ids.insert(action.id.as_str()) {
                return Err(CatalogError::DuplicateAction {
                    scenario: scenario.key,
                    step: step_idx,
                    action: action.id.clone(),
                });
            }
            if let Some(next) = action.next
                && next >= steps
            {
                return Err(CatalogError::InvalidTransition {
                    scenario: scenario.key,
                    step: step_idx,
                    action: action.id.clone(),
                    next,
                    steps,
                });
            }
        }
    }

    let last = &scenario.steps[steps - 1];
    if !last.actions.iter().any(crate::data::Action::is_terminal) {
        return Err(CatalogError::NoTerminalAction(scenario.key));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Action, Step};
    use crate::outcome::Outcome;
    use smallvec::smallvec;

    fn action(id: &str, result: Outcome, next: Option<usize>) -> Action {
        Action {
            id: id.to_string(),
            label: format!("label {id}"),
            result,
            output: format!("output {id}"),
            next,
        }
    }

    fn scenario(key: ScenarioKey, steps: Vec<Step>) -> Scenario {
        Scenario {
            key,
            title: "title".into(),
            subtitle: "subtitle".into(),
            icons: Vec::new(),
            steps,
            success_message: "done".into(),
        }
    }

    fn two_step() -> Vec<Step> {
        vec![
            Step {
                title: "one".into(),
                prompt: "?".into(),
                actions: smallvec![action("a", Outcome::Ok, Some(1))],
            },
            Step {
                title: "two".into(),
                prompt: "?".into(),
                actions: smallvec![action("b", Outcome::Ok, None)],
            },
        ]
    }

    #[test]
    fn accepts_well_formed_scenarios() {
        let catalog =
            ScenarioCatalog::new(vec![scenario(ScenarioKey::CicdRed, two_step())]).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.first().key, ScenarioKey::CicdRed);
        assert!(catalog.contains(ScenarioKey::CicdRed));
        assert!(catalog.get(ScenarioKey::AwsCost).is_none());
    }

    #[test]
    fn rejects_empty_catalog() {
        assert!(matches!(
            ScenarioCatalog::new(Vec::new()),
            Err(CatalogError::Empty)
        ));
    }

    #[test]
    fn rejects_duplicate_keys() {
        let err = ScenarioCatalog::new(vec![
            scenario(ScenarioKey::StpLoop, two_step()),
            scenario(ScenarioKey::StpLoop, two_step()),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateScenario(ScenarioKey::StpLoop)));
    }

    #[test]
    fn rejects_out_of_range_next() {
        let mut steps = two_step();
        steps[0].actions[0].next = Some(2);
        let err = ScenarioCatalog::new(vec![scenario(ScenarioKey::AwsCost, steps)]).unwrap_err();
        match err {
            CatalogError::InvalidTransition {
                step, next, steps, ..
            } => {
                assert_eq!((step, next, steps), (0, 2, 2));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn rejects_duplicate_action_ids_and_empty_steps() {
        let mut steps = two_step();
        steps[1].actions.push(action("b", Outcome::Fail, Some(1)));
        assert!(matches!(
            ScenarioCatalog::new(vec![scenario(ScenarioKey::K8sLatency, steps)]),
            Err(CatalogError::DuplicateAction { step: 1, .. })
        ));

        let mut steps = two_step();
        steps[0].actions.clear();
        assert!(matches!(
            ScenarioCatalog::new(vec![scenario(ScenarioKey::K8sLatency, steps)]),
            Err(CatalogError::EmptyStep { step: 0, .. })
        ));

        assert!(matches!(
            ScenarioCatalog::new(vec![scenario(ScenarioKey::K8sLatency, Vec::new())]),
            Err(CatalogError::EmptyScenario(ScenarioKey::K8sLatency))
        ));
    }

    #[test]
    fn rejects_final_step_without_terminal_action() {
        let mut steps = two_step();
        steps[1].actions[0].next = Some(0);
        assert!(matches!(
            ScenarioCatalog::new(vec![scenario(ScenarioKey::CicdRed, steps)]),
            Err(CatalogError::NoTerminalAction(ScenarioKey::CicdRed))
        ));
    }

    #[test]
    fn from_json_surfaces_parse_errors() {
        assert!(matches!(
            ScenarioCatalog::from_json("{ not json"),
            Err(CatalogError::Json(_))
        ));
    }
}
