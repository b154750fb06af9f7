//! # CLI Integration Tests / CLI 集成测试
//!
//! End-to-end tests of the `beta-harness` binary: init scaffolding,
//! full run sessions against live throwaway processes, and the bench
//! matrix command.
//!
//! `beta-harness` 二进制的端到端测试：init 脚手架、
//! 针对一次性活进程的完整运行会话，以及基准矩阵命令。

mod common;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// `init` scaffolds a default configuration that parses back.
///
/// `init` 生成可重新解析的默认配置。
#[test]
fn test_init_creates_a_parseable_config() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("BetaHarness.toml");

    let mut cmd = Command::cargo_bin("beta-harness").unwrap();
    cmd.arg("--lang")
        .arg("en")
        .arg("init")
        .arg("--output")
        .arg(&output);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Configuration file created"));

    assert!(output.exists());
    let config = beta_harness::core::config::load_config(&output).unwrap();
    assert_eq!(config.targets.len(), 2);
    assert!(config.bench.is_some());
}

/// A second `init` without `--force` refuses to overwrite.
///
/// 不带 `--force` 的第二次 `init` 拒绝覆盖。
#[test]
fn test_init_refuses_to_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("BetaHarness.toml");
    fs::write(&output, "language = \"en\"\n").unwrap();

    let mut cmd = Command::cargo_bin("beta-harness").unwrap();
    cmd.arg("--lang")
        .arg("en")
        .arg("init")
        .arg("--output")
        .arg(&output);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("File already exists"));

    assert_eq!(fs::read_to_string(&output).unwrap(), "language = \"en\"\n");
}

/// A run against a config with no targets is a clean no-op.
///
/// 针对无目标配置的运行是干净的空操作。
#[test]
fn test_run_with_no_targets_is_a_noop() {
    let dir = tempdir().unwrap();
    let config = common::empty_config(&dir);

    let mut cmd = Command::cargo_bin("beta-harness").unwrap();
    cmd.arg("--lang")
        .arg("en")
        .arg("run")
        .arg("--config")
        .arg(&config);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No targets configured"));
}

/// A missing configuration file is a hard error.
///
/// 配置文件缺失是硬错误。
#[test]
fn test_run_with_missing_config_fails() {
    let dir = tempdir().unwrap();

    let mut cmd = Command::cargo_bin("beta-harness").unwrap();
    cmd.arg("--lang")
        .arg("en")
        .arg("run")
        .arg("--config")
        .arg(dir.path().join("absent.toml"));
    cmd.assert().failure();
}

/// The full lifecycle against a live throwaway process: connect, run a
/// clean test, disconnect, write reports, exit successfully.
///
/// 针对一次性活进程的完整生命周期：连接、运行干净测试、断开、
/// 写出报告、成功退出。
#[cfg(unix)]
#[test]
fn test_successful_session_writes_reports() {
    let dir = tempdir().unwrap();
    let config = common::tail_target_config(&dir, "");

    let mut cmd = Command::cargo_bin("beta-harness").unwrap();
    cmd.arg("--lang")
        .arg("en")
        .arg("run")
        .arg("--config")
        .arg(&config);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("SESSION PASSED SUCCESSFULLY"));

    let report_dir = dir.path().join("reports");
    assert!(report_dir.join("report.html").exists());
    assert!(report_dir.join("report.json").exists());

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(report_dir.join("report.json")).unwrap()).unwrap();
    assert_eq!(json["summary"]["statistics"]["total"], 1);
    assert_eq!(json["summary"]["statistics"]["passed"], 1);
}

/// A missing scenario script fails the test, produces a classified
/// issue, and fails the session.
///
/// 缺失的场景脚本使测试失败、产生已分类议题，并使会话失败。
#[cfg(unix)]
#[test]
fn test_failing_session_reports_issues() {
    let dir = tempdir().unwrap();
    let config = common::tail_target_config(
        &dir,
        r#"
[[targets.tests]]
name = "broken_flow"

[targets.tests.params]
scenario_script = "/nonexistent/flow.robot"
"#,
    );

    let mut cmd = Command::cargo_bin("beta-harness").unwrap();
    cmd.arg("--lang")
        .arg("en")
        .arg("run")
        .arg("--config")
        .arg(&config);
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("Missing file or element"))
        .stderr(predicate::str::contains("Session finished with failures"));
}

/// An unregistered adapter name skips the target instead of crashing.
///
/// 未注册的适配器名称会跳过目标而不是崩溃。
#[test]
fn test_unknown_adapter_is_skipped() {
    let dir = tempdir().unwrap();
    let config = common::write_config(
        &dir,
        r#"
language = "en"

[[targets]]
name = "mystery"
adapter = "quantum"
target = "whatever"
"#,
    );

    let mut cmd = Command::cargo_bin("beta-harness").unwrap();
    cmd.arg("--lang")
        .arg("en")
        .arg("run")
        .arg("--config")
        .arg(&config);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("no adapter registered"));
}

/// The bench matrix runs the probe command per configuration and
/// aggregates the outcome.
///
/// 基准矩阵按配置运行探针命令并聚合结果。
#[cfg(unix)]
#[test]
fn test_bench_matrix_success() {
    let dir = tempdir().unwrap();
    let report_dir = dir.path().join("reports");
    let config = common::write_config(
        &dir,
        &format!(
            r#"
language = "en"
report_dir = "{}"

[bench]
command = "/bin/sh -c 'echo {{browser}}-on-{{platform}}'"
timeout_secs = 10

[[bench.configs]]
browser = "chrome"
platform = "linux"

[[bench.configs]]
browser = "firefox"
platform = "linux"
"#,
            report_dir.display()
        ),
    );

    let mut cmd = Command::cargo_bin("beta-harness").unwrap();
    cmd.arg("--lang")
        .arg("en")
        .arg("bench")
        .arg("--config")
        .arg(&config);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2/2 passed"))
        .stdout(predicate::str::contains("BENCH MATRIX PASSED"));

    let bench: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(report_dir.join("bench.json")).unwrap()).unwrap();
    assert_eq!(bench["total_probes"], 2);
    assert_eq!(bench["passed_probes"], 2);
}

/// A failing probe command fails the bench run.
///
/// 失败的探针命令使基准运行失败。
#[cfg(unix)]
#[test]
fn test_bench_matrix_failure() {
    let dir = tempdir().unwrap();
    let config = common::write_config(
        &dir,
        &format!(
            r#"
language = "en"
report_dir = "{}"

[bench]
command = "/bin/sh -c 'exit 3'"
timeout_secs = 10

[[bench.configs]]
browser = "chrome"
platform = "linux"
"#,
            dir.path().join("reports").display()
        ),
    );

    let mut cmd = Command::cargo_bin("beta-harness").unwrap();
    cmd.arg("--lang")
        .arg("en")
        .arg("bench")
        .arg("--config")
        .arg(&config);
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("FAILED"));
}

/// `report` with no recorded history prints the empty-trend notice.
///
/// 无历史记录时 `report` 打印空趋势提示。
#[test]
fn test_report_without_history() {
    let dir = tempdir().unwrap();
    let config = common::empty_config(&dir);

    let mut cmd = Command::cargo_bin("beta-harness").unwrap();
    cmd.arg("--lang")
        .arg("en")
        .arg("report")
        .arg("--config")
        .arg(&config);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("no history recorded yet"));
}
