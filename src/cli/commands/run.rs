//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command: it drives every configured
//! target through the adapter lifecycle on a driver task and drains the
//! completion channel into the metrics collector and report generator,
//! the single serialization point for all appends. Failures are
//! classified by log keywords into deduplicated issues.
//!
//! 此模块实现 `run` 命令：在驱动任务中让每个已配置目标走完适配器生命周期，
//! 并将完成通道排空到指标收集器和报告生成器，
//! 这是所有追加操作的唯一串行化点。失败按日志关键词分类为去重议题。

use anyhow::Result;
use colored::*;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::{
    adapters,
    cli::commands::{setup_and_parse_config, setup_signal_handler},
    core::{
        adapter::{ProbeMetrics, TestResult, TestStatus},
        config::HarnessConfig,
        metrics::MetricsCollector,
        registry::AdapterRegistry,
        report::{CaseStatus, ReportGenerator, Severity, TestCase, TestSuite},
        trend::TrendStore,
    },
    infra::{self, t},
    reporting::{
        console::{
            print_bullet_points, print_flaky_tests, print_issues, print_real_time_metrics,
            print_summary,
        },
        html::{generate_html_report, write_json_report},
    },
};

/// Events the driver task sends down the completion channel.
/// 驱动任务通过完成通道发送的事件。
enum SessionEvent {
    Connected {
        target: String,
    },
    AdapterMissing {
        target: String,
        adapter: String,
    },
    ConnectFailed {
        target: String,
        logs: Vec<String>,
    },
    TestFinished {
        target: String,
        result: TestResult,
        probe: ProbeMetrics,
    },
    TargetSkipped {
        target: String,
    },
}

/// Executes the run command with the provided arguments.
///
/// # Arguments
/// * `config` - Path to the harness configuration file
/// * `html` - Optional override for the HTML report path
/// * `json` - Optional override for the JSON report path
///
/// # Returns
/// A Result indicating success or failure of the session
pub async fn execute(
    config: PathBuf,
    html: Option<PathBuf>,
    json: Option<PathBuf>,
) -> Result<()> {
    let (config, config_path) = setup_and_parse_config(&config)?;
    let locale = config.language.clone();
    rust_i18n::set_locale(&locale);

    println!(
        "{}",
        t!("run.loading_config", locale = locale, path = config_path.display())
    );
    if config.targets.is_empty() {
        println!("{}", t!("run.no_targets", locale = locale).yellow());
        return Ok(());
    }
    println!(
        "{}",
        t!("run.targets_found", locale = locale, count = config.targets.len()).bold()
    );

    let stop = setup_signal_handler(&locale)?;
    let registry = adapters::builtin_registry();

    let mut collector = match &config.storage_path {
        Some(path) => MetricsCollector::with_storage(path),
        None => MetricsCollector::new(),
    };
    let mut report = ReportGenerator::new();
    if let Some(history) = &config.history_path {
        report.load_history(history);
    }

    // The driver owns the adapters; this task owns the collector and
    // report generator. The channel between them is the single point
    // where observations are appended.
    // 驱动任务拥有适配器；本任务拥有收集器和报告生成器。
    // 两者之间的通道是观测被追加的唯一位置。
    let (tx, rx) = mpsc::unbounded_channel::<SessionEvent>();
    let driver = tokio::spawn(drive_targets(
        config.clone(),
        registry,
        stop.clone(),
        locale.clone(),
        tx,
    ));

    let mut events = UnboundedReceiverStream::new(rx);
    let mut suites: Vec<TestSuite> = Vec::new();
    let mut session_results: Vec<(String, TestResult)> = Vec::new();

    while let Some(event) = events.next().await {
        match event {
            SessionEvent::Connected { target } => {
                println!("{}", t!("run.connected", locale = locale, target = target).green());
            }
            SessionEvent::AdapterMissing { target, adapter } => {
                println!(
                    "{}",
                    t!(
                        "run.adapter_missing",
                        locale = locale,
                        target = target,
                        adapter = adapter
                    )
                    .yellow()
                );
            }
            SessionEvent::ConnectFailed { target, logs } => {
                println!(
                    "{}",
                    t!("run.connect_failed", locale = locale, target = target).red()
                );
                for line in &logs {
                    println!("    {}", line.dimmed());
                }
                let description = logs.last().cloned().unwrap_or_default();
                report.add_issue(
                    &format!("Connection failed: {}", target),
                    &description,
                    Severity::High,
                    None,
                    None,
                );
            }
            SessionEvent::TestFinished {
                target,
                result,
                probe,
            } => {
                absorb_result(&mut collector, &mut report, &mut suites, &target, &result, &probe);
                session_results.push((target, result));
            }
            SessionEvent::TargetSkipped { target } => {
                println!(
                    "{}",
                    t!("run.target_skipped", locale = locale, target = target).dimmed()
                );
            }
        }
    }

    if let Err(e) = driver.await {
        eprintln!("A critical error occurred in the session driver: {}", e);
    }

    for suite in suites {
        report.add_suite(suite);
    }

    print_summary(&session_results, &locale);
    print_real_time_metrics(&collector.get_real_time_metrics(), &locale);
    print_flaky_tests(&collector.get_flaky_tests(3), &locale);
    print_bullet_points(&report.generate_bullet_points(), &locale);
    print_issues(report.issues(), &locale);

    render_outputs(&config, &report, html, json, &locale);

    if let Err(e) = collector.save() {
        eprintln!(
            "{}",
            t!("metrics.save_failed", locale = locale, error = e).yellow()
        );
    }
    if let Some(history) = &config.history_path {
        let mut store = TrendStore::open(history);
        store.append(report.generate_summary());
        if let Err(e) = store.save() {
            eprintln!(
                "{}",
                t!("trend.save_failed", locale = locale, error = e).yellow()
            );
        }
    }

    let has_problems = session_results.iter().any(|(_, r)| r.is_problem());
    if has_problems {
        anyhow::bail!(t!("run.session_failed", locale = locale).to_string());
    }
    println!("\n{}", t!("run.session_passed", locale = locale).green().bold());
    Ok(())
}

/// Drives every configured target through the adapter lifecycle:
/// create, configure, connect, run tests, disconnect. Emits one event
/// per observation; never touches collector or report state itself.
///
/// 驱动每个已配置目标走完适配器生命周期：
/// 创建、配置、连接、运行测试、断开。每个观测发出一个事件；
/// 自身从不触碰收集器或报告状态。
async fn drive_targets(
    config: HarnessConfig,
    registry: AdapterRegistry,
    stop: CancellationToken,
    locale: String,
    tx: mpsc::UnboundedSender<SessionEvent>,
) {
    for target in config.targets {
        if stop.is_cancelled() {
            let _ = tx.send(SessionEvent::TargetSkipped {
                target: target.name,
            });
            continue;
        }

        let Some(mut adapter) = registry.create(&target.adapter) else {
            let _ = tx.send(SessionEvent::AdapterMissing {
                target: target.name.clone(),
                adapter: target.adapter.clone(),
            });
            continue;
        };

        let mut options = target.config.clone();
        if let Some(dir) = &config.screenshot_dir {
            options
                .entry("screenshot_dir".to_string())
                .or_insert_with(|| Value::from(dir.display().to_string()));
        }
        adapter.configure(options);

        if !adapter.connect(&target.target).await {
            let _ = tx.send(SessionEvent::ConnectFailed {
                target: target.name.clone(),
                logs: adapter.logs().to_vec(),
            });
            continue;
        }
        let _ = tx.send(SessionEvent::Connected {
            target: target.name.clone(),
        });

        for test in &target.tests {
            if stop.is_cancelled() {
                break;
            }

            let (result, timed_out) = match test.timeout_secs {
                Some(secs) => {
                    let budget = Duration::from_secs(secs);
                    match tokio::time::timeout(budget, adapter.run_test(&test.name, &test.params))
                        .await
                    {
                        Ok(result) => (result, false),
                        Err(_) => {
                            println!(
                                "{}",
                                t!(
                                    "run.test_timeout",
                                    locale = &locale,
                                    name = &test.name,
                                    timeout = secs
                                )
                                .red()
                            );
                            let mut result = TestResult::error(
                                &test.name,
                                format!("test timed out after {}s", secs),
                            );
                            result.duration = budget;
                            (result, true)
                        }
                    }
                }
                None => (adapter.run_test(&test.name, &test.params).await, false),
            };

            let probe = adapter.collect_metrics().await;
            let _ = tx.send(SessionEvent::TestFinished {
                target: target.name.clone(),
                result,
                probe,
            });

            if timed_out {
                // A timed-out session cannot be trusted any further:
                // terminate the target and move on.
                // 超时的会话不可再信任：终止目标并继续下一个目标。
                adapter.disconnect().await;
                break;
            }
        }

        adapter.disconnect().await;
    }
}

/// Folds one finished test into the collector, the report suites, and
/// the issue list.
///
/// 将一个已完成的测试折叠进收集器、报告套件和议题列表。
fn absorb_result(
    collector: &mut MetricsCollector,
    report: &mut ReportGenerator,
    suites: &mut Vec<TestSuite>,
    target: &str,
    result: &TestResult,
    probe: &ProbeMetrics,
) {
    let qualified = format!("{}::{}", target, result.name);

    match result.status {
        TestStatus::Passed => collector.record_test_result(&qualified, true),
        TestStatus::Failed | TestStatus::Error => collector.record_test_result(&qualified, false),
        TestStatus::Skipped => {}
    }
    collector.record_response_time(result.duration.as_secs_f64() * 1000.0);
    if probe.load_time > 0.0 {
        collector.record_load_time(probe.load_time);
    }

    let message = result.error_message.as_deref().unwrap_or("");
    if message.contains("exited during") {
        collector.record_crash();
    }

    if result.is_problem() {
        let (title, description, severity) = classify_failure(target, result);
        report.add_issue(
            &title,
            &description,
            severity,
            Some(&qualified),
            result.screenshot_path.clone(),
        );
    }

    if !suites.iter().any(|s| s.name == target) {
        let mut suite = TestSuite::new(target);
        suite.start_time = Some(result.timestamp);
        suites.push(suite);
    }
    if let Some(suite) = suites.iter_mut().find(|s| s.name == target) {
        suite.end_time = Some(result.timestamp);
        suite.add_case(case_from_result(result));
    }
}

/// Maps an adapter result onto a report-level case. `Error` becomes
/// `Broken` so infrastructure problems stay distinguishable from
/// product defects in the summary.
///
/// 将适配器结果映射为报告级用例。`Error` 映射为 `Broken`，
/// 使基础设施问题在摘要中与产品缺陷保持可区分。
fn case_from_result(result: &TestResult) -> TestCase {
    let status = match result.status {
        TestStatus::Passed => CaseStatus::Passed,
        TestStatus::Failed => CaseStatus::Failed,
        TestStatus::Skipped => CaseStatus::Skipped,
        TestStatus::Error => CaseStatus::Broken,
    };
    let mut case = TestCase::new(&result.name, status, result.duration.as_secs_f64() * 1000.0);
    case.error_message = result.error_message.clone();
    if let Some(shot) = &result.screenshot_path {
        case.attachments.push(shot.display().to_string());
    }
    case
}

/// Keyword classification of a failed result into an issue title,
/// description and severity. Crude on purpose: it runs over whatever
/// message the adapter surfaced, outside the aggregation core.
///
/// 将失败结果按关键词分类为议题标题、描述和严重度。
/// 有意保持粗糙：它处理适配器呈现的任意消息，位于聚合核心之外。
fn classify_failure(target: &str, result: &TestResult) -> (String, String, Severity) {
    let message = result.error_message.as_deref().unwrap_or("");
    let lower = message.to_lowercase();

    if lower.contains("exited during") {
        (
            format!("Target crashed during {}", result.name),
            format!("{} went away while {} was running: {}", target, result.name, message),
            Severity::Critical,
        )
    } else if lower.contains("timed out") || lower.contains("timeout") {
        (
            format!("Timeout in {}", result.name),
            format!("{} exceeded its time budget on {}: {}", result.name, target, message),
            Severity::High,
        )
    } else if lower.contains("not found") {
        (
            format!("Missing file or element in {}", result.name),
            format!("{} on {} referenced something that does not exist: {}", result.name, target, message),
            Severity::Medium,
        )
    } else if result.status == TestStatus::Error {
        (
            format!("Infrastructure error in {}", result.name),
            format!("{} on {} could not be executed: {}", result.name, target, message),
            Severity::High,
        )
    } else {
        (
            format!("Test failed: {}", result.name),
            format!("{} failed on {}: {}", result.name, target, message),
            Severity::Medium,
        )
    }
}

/// Writes the HTML and JSON reports and bundles the screenshot
/// directory next to them. Rendering problems are warnings, never
/// session failures.
///
/// 写出 HTML 和 JSON 报告，并将截图目录打包到其旁。
/// 渲染问题只是警告，绝不构成会话失败。
fn render_outputs(
    config: &HarnessConfig,
    report: &ReportGenerator,
    html: Option<PathBuf>,
    json: Option<PathBuf>,
    locale: &str,
) {
    if let Err(e) = infra::fs::ensure_dir(&config.report_dir) {
        eprintln!("{} {:#}", "Failed to prepare report directory:".red(), e);
        return;
    }

    let html_path = html.unwrap_or_else(|| config.report_dir.join("report.html"));
    match generate_html_report(report, &html_path, locale) {
        Ok(()) => println!(
            "{}",
            t!("run.html_saved", locale = locale, path = html_path.display())
        ),
        Err(e) => eprintln!("{} {:#}", "Failed to generate HTML report:".red(), e),
    }

    let json_path = json.unwrap_or_else(|| config.report_dir.join("report.json"));
    match write_json_report(report, &json_path) {
        Ok(()) => println!(
            "{}",
            t!("run.json_saved", locale = locale, path = json_path.display())
        ),
        Err(e) => eprintln!("{} {:#}", "Failed to write JSON report:".red(), e),
    }

    if let Some(shots) = &config.screenshot_dir {
        if shots.exists() {
            let bundle = config.report_dir.join("screenshots");
            if let Err(e) = infra::fs::copy_dir_all(shots, &bundle) {
                eprintln!("{} {:#}", "Failed to bundle screenshots:".red(), e);
            }
        }
    }
}
