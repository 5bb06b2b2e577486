use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "runbook-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_runbook-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    for key in ["k8s-latency", "cicd-red", "stp-loop", "aws-cost"] {
        assert!(content.contains(key), "missing {key}");
    }
}

#[test]
fn cli_full_matrix_passes_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_runbook-tester");
    let output_path = temp_path("matrix");
    let output = Command::new(exe)
        .args([
            "--scenarios",
            "all",
            "--strategies",
            "all",
            "--seeds",
            "1,2",
            "--iterations",
            "2",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Runbook Simulator Tester"));

    let content = std::fs::read_to_string(output_path).expect("read report");
    let report: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    assert_eq!(report["total_scenarios"], 32);
    assert_eq!(report["failed"], 0);
}

#[test]
fn cli_exits_non_zero_when_optimal_cannot_finish() {
    let exe = env!("CARGO_BIN_EXE_runbook-tester");
    let output_path = temp_path("budget");
    let output = Command::new(exe)
        .args([
            "--scenarios",
            "k8s-latency",
            "--strategies",
            "optimal",
            "--iterations",
            "1",
            "--max-actions",
            "1",
            "--report",
            "markdown",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert_eq!(output.status.code(), Some(1));
    let content = std::fs::read_to_string(output_path).expect("read report");
    assert!(content.contains("did not resolve"));
}

#[test]
fn cli_rejects_bad_seed() {
    let exe = env!("CARGO_BIN_EXE_runbook-tester");
    let output = Command::new(exe)
        .args(["--seeds", "not-a-seed", "--iterations", "1"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid seed"));
}
