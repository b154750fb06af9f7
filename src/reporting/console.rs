//! # Console Reporting Module / 控制台报告模块
//!
//! This module handles the display of session results in the console.
//! It provides functionality for printing colorful, formatted summaries
//! with internationalization support.
//!
//! 此模块处理会话结果在控制台中的显示。
//! 它提供打印彩色格式化摘要的功能，支持国际化。

use colored::*;

use crate::core::adapter::{TestResult, TestStatus};
use crate::core::bench::BenchSummary;
use crate::core::metrics::{FlakyTest, RealTimeMetrics};
use crate::core::report::{Issue, Severity};
use crate::core::trend::TrendStore;
use crate::infra::t;

/// Prints a formatted summary of per-target test results.
/// Displays a table with target, test name, status and duration, using
/// color coding to highlight different statuses.
///
/// 打印按目标分组的测试结果摘要。
/// 显示包含目标、测试名称、状态和持续时间的表格，
/// 使用颜色编码突出不同状态。
///
/// # Output Format / 输出格式
/// ```text
/// --- Session Summary ---
///   - Passed   | web-app / login_flow            |      1.23s
///   - Failed   | web-app / checkout              |      0.45s
///   - Error    | synth / render_preset           |      0.00s
/// ```
pub fn print_summary(results: &[(String, TestResult)], locale: &str) {
    println!("\n{}", t!("summary.banner", locale = locale).bold());

    if results.is_empty() {
        println!("  {}", t!("summary.no_results", locale = locale).dimmed());
        return;
    }

    for (target, result) in results {
        let status_str = status_label(result.status, locale);
        let status_colored = match result.status {
            TestStatus::Passed => status_str.green(),
            TestStatus::Failed => status_str.red(),
            TestStatus::Error => status_str.magenta(),
            TestStatus::Skipped => status_str.dimmed(),
        };
        let duration_str = format!("{:.2}s", result.duration.as_secs_f64());
        let name = format!("{} / {}", target, result.name);

        println!(
            "  - {:<10} | {:<40} | {:>10}",
            status_colored, name, duration_str
        );
        if let Some(message) = &result.error_message {
            println!("      {}", message.dimmed());
        }
    }
}

/// Prints the current derived metrics snapshot.
/// 打印当前派生指标快照。
pub fn print_real_time_metrics(metrics: &RealTimeMetrics, locale: &str) {
    println!("\n{}", t!("metrics.banner", locale = locale).bold());
    println!(
        "  {}",
        t!(
            "metrics.totals",
            locale = locale,
            passed = metrics.passed_tests,
            failed = metrics.failed_tests,
            total = metrics.total_tests
        )
    );
    println!(
        "  {}",
        t!(
            "metrics.pass_rate",
            locale = locale,
            rate = format!("{:.1}", metrics.pass_rate)
        )
    );
    println!(
        "  {}",
        t!(
            "metrics.crash_rate",
            locale = locale,
            rate = format!("{:.2}", metrics.crash_rate)
        )
    );
    println!(
        "  {}",
        t!(
            "metrics.flaky_rate",
            locale = locale,
            rate = format!("{:.1}", metrics.flaky_test_rate)
        )
    );
    println!(
        "  {}",
        t!(
            "metrics.engagement",
            locale = locale,
            score = format!("{:.1}", metrics.engagement_score)
        )
    );
}

/// Prints the threshold-aware flaky-test listing, most flaky first.
/// Nothing is printed when the listing is empty.
///
/// 打印带阈值的不稳定测试列表，最不稳定的在前。列表为空时不打印。
pub fn print_flaky_tests(flaky: &[FlakyTest], locale: &str) {
    if flaky.is_empty() {
        return;
    }
    println!("\n{}", t!("metrics.flaky_banner", locale = locale).bold());
    for test in flaky {
        println!(
            "  - {:<40} {:>6.1}%  ({}/{} {})",
            test.name,
            test.flakiness_rate,
            test.pass_count,
            test.total_runs,
            t!("metrics.flaky_passes", locale = locale)
        );
    }
}

/// Prints the deterministic bullet-point digest.
/// 打印确定性要点摘要。
pub fn print_bullet_points(bullets: &[String], locale: &str) {
    println!("\n{}", t!("report.bullets_banner", locale = locale).bold());
    for bullet in bullets {
        println!("{}", bullet);
    }
}

/// Prints the deduplicated issue list with severity coloring.
/// 打印带严重度着色的去重议题列表。
pub fn print_issues(issues: &[Issue], locale: &str) {
    if issues.is_empty() {
        return;
    }
    println!(
        "\n{}",
        t!("report.issues_banner", locale = locale, count = issues.len()).bold()
    );
    for issue in issues {
        let severity = format!("[{}]", issue.severity);
        let severity_colored = match issue.severity {
            Severity::Critical => severity.red().bold(),
            Severity::High => severity.red(),
            Severity::Medium => severity.yellow(),
            Severity::Low => severity.green(),
        };
        let occurrences = if issue.occurrences > 1 {
            format!(" ({}x)", issue.occurrences)
        } else {
            String::new()
        };
        println!(
            "  {} {} {}{}",
            issue.id.cyan(),
            severity_colored,
            issue.title,
            occurrences
        );
    }
}

/// Prints the aggregated bench-matrix summary, including per-probe
/// failures.
///
/// 打印聚合的基准矩阵摘要，包括单个探针的失败。
pub fn print_bench_summary(summary: &BenchSummary, locale: &str) {
    println!("\n{}", t!("bench.banner", locale = locale).bold());
    println!(
        "  {}",
        t!(
            "bench.probes",
            locale = locale,
            passed = summary.passed_probes,
            total = summary.total_probes
        )
    );
    println!(
        "  {}",
        t!(
            "bench.avg_duration",
            locale = locale,
            ms = format!("{:.0}", summary.avg_duration_ms)
        )
    );
    println!(
        "  {}",
        t!(
            "bench.avg_load",
            locale = locale,
            ms = format!("{:.0}", summary.avg_load_time_ms)
        )
    );

    for result in summary.results.iter().filter(|r| !r.success) {
        let label = format!("{}/{}", result.browser, result.platform);
        println!(
            "  - {} {}: {}",
            t!("bench.failed_probe", locale = locale).red(),
            label,
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
}

/// Prints historical pass-rate trends from the trend store.
/// 打印趋势存储中的历史通过率趋势。
pub fn print_trends(store: &TrendStore, locale: &str) {
    println!("\n{}", t!("trend.banner", locale = locale).bold());
    if store.is_empty() {
        println!("  {}", t!("trend.no_history", locale = locale).dimmed());
        return;
    }
    println!(
        "  {}",
        t!("trend.total_runs", locale = locale, count = store.len())
    );
    println!(
        "  {}",
        t!(
            "trend.avg_pass_rate",
            locale = locale,
            rate = format!("{:.1}", store.average_pass_rate())
        )
    );
    let series: Vec<String> = store
        .pass_rate_series()
        .iter()
        .map(|r| format!("{:.0}", r))
        .collect();
    println!("  {}", series.join(" -> ").dimmed());
}

/// Localized label for a result status.
/// 结果状态的本地化标签。
pub fn status_label(status: TestStatus, locale: &str) -> String {
    match status {
        TestStatus::Passed => t!("status.passed", locale = locale).to_string(),
        TestStatus::Failed => t!("status.failed", locale = locale).to_string(),
        TestStatus::Skipped => t!("status.skipped", locale = locale).to_string(),
        TestStatus::Error => t!("status.error", locale = locale).to_string(),
    }
}
