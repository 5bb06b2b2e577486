use colored::Colorize;
use runbook_game::constants::TRANSCRIPT_PROMPT;
use runbook_game::{
    ActionReport, MemoryScoreStore, RunbookEngine, ScenarioCatalog, ScenarioKey, TransitionToken,
    apply_delta,
};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::logic::policy::PlayStrategy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub scenario: ScenarioKey,
    pub strategy: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub resolved_runs: usize,
    pub best_score: u32,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

/// How a single playthrough is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaythroughConfig {
    pub max_actions: usize,
    /// Wait out the real transition delay instead of settling at once.
    pub realtime: bool,
}

/// Outcome of one scripted playthrough.
#[derive(Debug, Clone, Default)]
pub struct PlaySummary {
    pub seed: u64,
    pub actions_taken: usize,
    pub score: u32,
    pub resolved: bool,
    pub decisions: Vec<String>,
    pub violations: Vec<String>,
}

pub struct LogicTester {
    catalog: Rc<ScenarioCatalog>,
    config: PlaythroughConfig,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(catalog: Rc<ScenarioCatalog>, config: PlaythroughConfig, verbose: bool) -> Self {
        Self {
            catalog,
            config,
            verbose,
        }
    }

    pub async fn run_matrix(
        &self,
        scenarios: &[ScenarioKey],
        strategies: &[PlayStrategy],
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();
        for &scenario in scenarios {
            for &strategy in strategies {
                for &seed in seeds {
                    if self.verbose {
                        println!(
                            "🧪 Testing scenario: {} (strategy: {} seed: {})",
                            scenario.as_str().bright_white(),
                            strategy,
                            seed
                        );
                    }
                    results.push(self.run_scenario(scenario, strategy, seed, iterations).await);
                }
            }
        }
        results
    }

    pub async fn run_scenario(
        &self,
        scenario: ScenarioKey,
        strategy: PlayStrategy,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut resolved_runs = 0;
        let mut best_score = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let summary = self.play(scenario, strategy, iteration_seed).await;
            let duration = start_time.elapsed();

            if summary.resolved {
                resolved_runs += 1;
            }
            best_score = best_score.max(summary.score);

            if summary.violations.is_empty() {
                successes += 1;
                performance_data.push(duration);
                if self.verbose {
                    println!(
                        "  ✅ Iteration {}/{} passed ({duration:?}) actions:{} score:{} resolved:{}",
                        i + 1,
                        iterations,
                        summary.actions_taken,
                        summary.score,
                        summary.resolved
                    );
                }
            } else {
                let message = format!(
                    "Iteration {} (strategy {}, seed {}, actions {}, score {}): {} | path {}",
                    i + 1,
                    strategy.label(),
                    summary.seed,
                    summary.actions_taken,
                    summary.score,
                    summary.violations.join("; "),
                    summarize_decision_path(&summary)
                );
                if self.verbose {
                    println!(
                        "  ❌ Iteration {}/{} failed: {}",
                        i + 1,
                        iterations,
                        message.clone().red()
                    );
                }
                failures.push(message);
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: format!("{scenario} / {}", strategy.key()),
            scenario,
            strategy: strategy.key().to_string(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            resolved_runs,
            best_score,
            failures,
            average_duration,
            performance_data,
        }
    }

    /// Play `scenario` once from a zero score, checking engine invariants
    /// after every action.
    pub async fn play(&self, scenario: ScenarioKey, strategy: PlayStrategy, seed: u64) -> PlaySummary {
        let mut summary = PlaySummary {
            seed,
            ..PlaySummary::default()
        };
        let mut engine = RunbookEngine::new(Rc::clone(&self.catalog), MemoryScoreStore::default());
        if let Err(err) = engine.select_scenario(scenario) {
            summary.violations.push(err.to_string());
            return summary;
        }

        let mut policy = strategy.create_policy(seed);
        let mut picks = vec![0_usize; engine.scenario().steps.len()];
        let mut settled: Option<TransitionToken> = None;

        while summary.actions_taken < self.config.max_actions && !engine.is_resolved() {
            let step_index = engine.step_index();
            let Some(attempt) = picks.get_mut(step_index) else {
                summary
                    .violations
                    .push(format!("step index {step_index} out of range"));
                break;
            };
            let decision = policy.pick_action(engine.current_step(), *attempt);
            *attempt += 1;

            let before = engine.score();
            let report = match engine.apply_action(&decision.action_id) {
                Ok(report) => report,
                Err(err) => {
                    summary.violations.push(format!("step {step_index}: {err}"));
                    break;
                }
            };
            summary.actions_taken += 1;
            summary
                .decisions
                .push(format!("{step_index}:{}", report.action_id));
            log::debug!(
                "[{} {}] step {step_index} -> {} ({}), rationale {:?}",
                scenario,
                policy.name(),
                report.action_id,
                report.outcome,
                decision.rationale
            );
            check_report(&engine, before, &report, &mut summary.violations);

            if let Some(pending) = report.pending {
                if let Some(old) = settled.take()
                    && engine.settle(old)
                {
                    summary
                        .violations
                        .push(format!("stale token {} moved the step pointer", old.value()));
                }
                if self.config.realtime {
                    tokio::time::sleep(pending.delay).await;
                }
                if !engine.settle(pending.token) {
                    summary
                        .violations
                        .push(format!("fresh token {} was rejected", pending.token.value()));
                } else if engine.step_index() != pending.target {
                    summary.violations.push(format!(
                        "settled at step {} instead of {}",
                        engine.step_index(),
                        pending.target
                    ));
                }
                settled = Some(pending.token);
            }
        }

        summary.score = engine.score();
        summary.resolved = engine.is_resolved();
        check_expectations(&engine, strategy, &mut summary);
        summary
    }
}

fn check_report(
    engine: &RunbookEngine<MemoryScoreStore>,
    before: u32,
    report: &ActionReport,
    violations: &mut Vec<String>,
) {
    let expected = apply_delta(before, report.outcome.score_delta());
    if report.score != expected || engine.score() != expected {
        violations.push(format!(
            "score {before} {:+} should give {expected}, engine has {}",
            report.outcome.score_delta(),
            engine.score()
        ));
    }
    if engine.store().stored() != Some(engine.score()) {
        violations.push(format!(
            "stored score {:?} differs from engine score {}",
            engine.store().stored(),
            engine.score()
        ));
    }
    if let Some(action) = engine.current_step().action(&report.action_id) {
        let expected = format!("{TRANSCRIPT_PROMPT}{}\n\n{}", action.label, action.output);
        if engine.transcript() != expected {
            violations.push(format!("transcript mismatch after '{}'", action.id));
        }
    }
    if report.resolved && engine.step_index() != engine.scenario().last_step_index() {
        violations.push(format!(
            "resolved at step {} before the last step",
            engine.step_index()
        ));
    }
}

fn check_expectations(
    engine: &RunbookEngine<MemoryScoreStore>,
    strategy: PlayStrategy,
    summary: &mut PlaySummary,
) {
    if strategy.must_resolve() && !summary.resolved {
        summary.violations.push(format!(
            "{} did not resolve within {} actions",
            strategy.label(),
            summary.actions_taken
        ));
    }
    if strategy == PlayStrategy::Optimal && summary.resolved {
        let scenario = engine.scenario();
        if summary.score != scenario.max_clean_score() {
            summary.violations.push(format!(
                "clean run scored {} instead of {}",
                summary.score,
                scenario.max_clean_score()
            ));
        }
        if summary.actions_taken != scenario.steps.len() {
            summary.violations.push(format!(
                "clean run took {} actions for {} steps",
                summary.actions_taken,
                scenario.steps.len()
            ));
        }
    }
}

fn summarize_decision_path(summary: &PlaySummary) -> String {
    if summary.decisions.is_empty() {
        return "no decisions recorded".to_string();
    }
    summary
        .decisions
        .iter()
        .rev()
        .take(5)
        .rev()
        .cloned()
        .collect::<Vec<_>>()
        .join(" -> ")
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::load_catalog;

    fn tester(max_actions: usize) -> LogicTester {
        LogicTester::new(
            Rc::new(load_catalog().unwrap()),
            PlaythroughConfig {
                max_actions,
                realtime: false,
            },
            false,
        )
    }

    #[test]
    fn optimal_clears_every_scenario_cleanly() {
        let tester = tester(32);
        for key in ScenarioKey::ALL {
            let summary = tokio_test::block_on(tester.play(key, PlayStrategy::Optimal, 1));
            assert!(summary.violations.is_empty(), "{key}: {:?}", summary.violations);
            assert!(summary.resolved);
            let scenario = tester.catalog.get(key).unwrap();
            assert_eq!(summary.score, scenario.max_clean_score());
        }
    }

    #[test]
    fn cautious_resolves_with_lower_score() {
        let tester = tester(32);
        let summary = tokio_test::block_on(tester.play(ScenarioKey::CicdRed, PlayStrategy::Cautious, 3));
        assert!(summary.violations.is_empty(), "{:?}", summary.violations);
        assert!(summary.resolved);
        assert!(summary.score < 24);
    }

    #[test]
    fn reckless_runs_hit_action_budget_without_violations() {
        let tester = tester(10);
        let summary =
            tokio_test::block_on(tester.play(ScenarioKey::K8sLatency, PlayStrategy::Reckless, 9));
        assert!(summary.violations.is_empty(), "{:?}", summary.violations);
        assert!(!summary.resolved);
        assert_eq!(summary.actions_taken, 10);
        assert_eq!(summary.score, 0);
    }

    #[test]
    fn tiny_budget_flags_strategies_that_must_resolve() {
        let tester = tester(1);
        let result = tokio_test::block_on(tester.run_scenario(
            ScenarioKey::StpLoop,
            PlayStrategy::Optimal,
            5,
            2,
        ));
        assert!(!result.passed);
        assert_eq!(result.failures.len(), 2);
        assert!(result.failures[0].contains("did not resolve"));
    }

    #[test]
    fn matrix_covers_every_combination() {
        let tester = tester(32);
        let results = tokio_test::block_on(tester.run_matrix(
            &ScenarioKey::ALL,
            &PlayStrategy::ALL,
            &[1, 2],
            2,
        ));
        assert_eq!(results.len(), 4 * 4 * 2);
        assert!(results.iter().all(|r| r.passed), "{results:#?}");
        assert!(
            results
                .iter()
                .filter(|r| r.strategy == "optimal")
                .all(|r| r.resolved_runs == r.iterations_run)
        );
    }

    #[test]
    fn realtime_mode_waits_for_transition_delay() {
        let tester = LogicTester::new(
            Rc::new(load_catalog().unwrap()),
            PlaythroughConfig {
                max_actions: 8,
                realtime: true,
            },
            false,
        );
        let started = Instant::now();
        let summary = tokio_test::block_on(tester.play(ScenarioKey::CicdRed, PlayStrategy::Optimal, 1));
        assert!(started.elapsed() >= Duration::from_millis(500));
        assert!(summary.resolved, "{:?}", summary.violations);
        assert_eq!(summary.score, 24);
    }
}
