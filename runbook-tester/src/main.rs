mod common;
mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use runbook_game::constants::DEFAULT_MAX_ACTIONS;
use runbook_game::{ScenarioCatalog, ScenarioKey};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use common::{load_catalog, parse_seeds, split_csv};
use logic::{LogicTester, PlayStrategy, PlaythroughConfig};

#[derive(Debug, Parser)]
#[command(name = "runbook-tester", version)]
#[command(about = "Automated QA for the Runbook Simulator - scripted play over every scenario")]
struct Args {
    /// Scenarios to run (comma-separated keys, or "all")
    #[arg(long, default_value = "all")]
    scenarios: String,

    /// Play strategies (optimal,cautious,reckless,random, or "all")
    #[arg(long, default_value = "all")]
    strategies: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario, strategy and seed
    #[arg(long, default_value_t = 5)]
    iterations: usize,

    /// Action budget for a single playthrough
    #[arg(long, default_value_t = DEFAULT_MAX_ACTIONS)]
    max_actions: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Wait out the real step transition delay
    #[arg(long)]
    realtime: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let catalog = Rc::new(load_catalog()?);
    if maybe_list_scenarios(&args, &catalog)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios, &catalog);
    let strategies = expand_strategies(&args.strategies);
    let seeds = parse_seeds(&args.seeds)?;
    let config = PlaythroughConfig {
        max_actions: args.max_actions,
        realtime: args.realtime,
    };
    let tester = LogicTester::new(Rc::clone(&catalog), config, args.verbose);

    println!("{}", "🧠 Running Playthroughs".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());
    let results = tester
        .run_matrix(&scenarios, &strategies, &seeds, args.iterations)
        .await;

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

/// Install the `env_logger` backend. Returns `false` when a logger was
/// already installed, which leaves that logger in charge.
fn init_logging(verbose: bool) -> bool {
    let default_filter = if verbose { "debug" } else { "warn" };
    let installed =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
            .try_init();
    if let Err(err) = &installed {
        log::warn!("keeping existing logger: {err}");
    }
    installed.is_ok()
}

fn maybe_list_scenarios(args: &Args, catalog: &ScenarioCatalog) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for scenario in catalog.iter() {
        writeln!(
            output_target.writer(),
            "  {:12} - {} ({} steps, clean score {})",
            scenario.key.as_str(),
            scenario.title,
            scenario.steps.len(),
            scenario.max_clean_score()
        )?;
    }
    writeln!(output_target.writer(), "Available strategies:")?;
    for strategy in PlayStrategy::ALL {
        writeln!(output_target.writer(), "  {}", strategy.key())?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🚨 Runbook Simulator Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn expand_scenarios(scenarios_arg: &str, catalog: &ScenarioCatalog) -> Vec<ScenarioKey> {
    let mut keys: Vec<ScenarioKey> = Vec::new();
    for token in split_csv(scenarios_arg) {
        let expanded: Vec<ScenarioKey> = if token == "all" {
            catalog.keys().collect()
        } else {
            match token.parse::<ScenarioKey>() {
                Ok(key) if catalog.contains(key) => vec![key],
                Ok(key) => {
                    eprintln!("⚠️  Scenario {} is not in the catalog", key.as_str().yellow());
                    Vec::new()
                }
                Err(err) => {
                    eprintln!("⚠️  {}", err.to_string().yellow());
                    Vec::new()
                }
            }
        };
        for key in expanded {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    keys
}

fn expand_strategies(strategies_arg: &str) -> Vec<PlayStrategy> {
    let mut strategies: Vec<PlayStrategy> = Vec::new();
    for token in split_csv(strategies_arg) {
        let expanded: Vec<PlayStrategy> = if token == "all" {
            PlayStrategy::ALL.to_vec()
        } else {
            match token.parse::<PlayStrategy>() {
                Ok(strategy) => vec![strategy],
                Err(err) => {
                    eprintln!("⚠️  {}", err.to_string().yellow());
                    Vec::new()
                }
            }
        };
        for strategy in expanded {
            if !strategies.contains(&strategy) {
                strategies.push(strategy);
            }
        }
    }
    strategies
}

fn write_reports(args: &Args, results: &[logic::ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            logic::reports::generate_json_report(&mut output_target, results)?;
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Runbook Simulator Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            let duration = start_time.elapsed();
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logic::ScenarioResult;
    use std::time::Duration;

    #[test]
    fn second_logging_init_keeps_first_logger() {
        init_logging(false);
        assert!(!init_logging(true));
    }

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "runbook-tester-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    fn base_args() -> Args {
        Args {
            scenarios: "all".to_string(),
            strategies: "optimal".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            iterations: 1,
            max_actions: DEFAULT_MAX_ACTIONS,
            report: "json".to_string(),
            output: None,
            realtime: false,
            verbose: false,
        }
    }

    fn sample_result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "stp-loop / random".to_string(),
            scenario: ScenarioKey::StpLoop,
            strategy: "random".to_string(),
            seed: 1,
            passed,
            iterations_run: 1,
            successful_iterations: usize::from(passed),
            resolved_runs: 0,
            best_score: 8,
            failures: if passed {
                Vec::new()
            } else {
                vec!["failure".to_string()]
            },
            average_duration: Duration::from_millis(1),
            performance_data: vec![Duration::from_millis(1)],
        }
    }

    #[test]
    fn expands_all_scenarios_keyword_in_catalog_order() {
        let catalog = load_catalog().unwrap();
        let expanded = expand_scenarios("stp-loop,all", &catalog);
        assert_eq!(
            expanded,
            vec![
                ScenarioKey::StpLoop,
                ScenarioKey::K8sLatency,
                ScenarioKey::CicdRed,
                ScenarioKey::AwsCost
            ]
        );
    }

    #[test]
    fn expand_scenarios_skips_unknown_names() {
        let catalog = load_catalog().unwrap();
        let expanded = expand_scenarios("dns-outage, aws-cost", &catalog);
        assert_eq!(expanded, vec![ScenarioKey::AwsCost]);
    }

    #[test]
    fn expand_strategies_handles_all_and_unknown() {
        assert_eq!(expand_strategies("all").len(), 4);
        assert_eq!(
            expand_strategies("random,greedy,random"),
            vec![PlayStrategy::Random]
        );
    }

    #[test]
    fn maybe_list_scenarios_writes_output() {
        let catalog = load_catalog().unwrap();
        let temp = temp_path("scenarios.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args, &catalog).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("k8s-latency"));
        assert!(content.contains("clean score 36"));
        assert!(content.contains("reckless"));
    }

    #[test]
    fn maybe_list_scenarios_returns_false_when_disabled() {
        let catalog = load_catalog().unwrap();
        assert!(!maybe_list_scenarios(&base_args(), &catalog).unwrap());
    }

    #[test]
    fn write_reports_emits_json_for_results() {
        let temp = temp_path("report.json");
        let args = Args {
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(false)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["failed"], 1);
    }

    #[test]
    fn write_reports_markdown_empty_results() {
        let temp = temp_path("report.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("No scenarios executed"));
    }

    #[test]
    fn write_reports_console_includes_total_time() {
        let temp = temp_path("report.txt");
        let args = Args {
            report: "console".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(true)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("stp-loop / random"));
        assert!(content.contains("Total time"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        writeln!(target, "hello").unwrap();
        target.flush_inner().unwrap();
    }
}
