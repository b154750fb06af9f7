//! # Report Generator Unit Tests / 报告生成器单元测试
//!
//! This module contains unit tests for suite statistics, issue
//! deduplication, the bullet-point digest, and trend loading.
//!
//! 此模块包含套件统计、议题去重、要点摘要和趋势加载的单元测试。

use beta_harness::core::report::{
    CaseStatus, ReportGenerator, Severity, TestCase, TestSuite,
};
use beta_harness::core::trend::TrendStore;
use std::fs;
use tempfile::tempdir;

/// Helper to build a suite with the given pass/fail/skip/broken shape.
fn build_suite(name: &str, passed: usize, failed: usize, skipped: usize, broken: usize) -> TestSuite {
    let mut suite = TestSuite::new(name);
    let mut add = |status: CaseStatus, count: usize, label: &str| {
        for i in 0..count {
            suite.add_case(TestCase::new(format!("{}_{}", label, i), status, 10.0));
        }
    };
    add(CaseStatus::Passed, passed, "pass");
    add(CaseStatus::Failed, failed, "fail");
    add(CaseStatus::Skipped, skipped, "skip");
    add(CaseStatus::Broken, broken, "broken");
    suite
}

#[cfg(test)]
mod issue_dedup_tests {
    use super::*;

    #[test]
    fn test_case_insensitive_titles_merge() {
        let mut report = ReportGenerator::new();
        let first = report.add_issue("Login failed", "cannot log in", Severity::High, Some("t1"), None);
        let second = report.add_issue(
            "login FAILED again",
            "still cannot log in",
            Severity::High,
            Some("t2"),
            None,
        );

        assert_eq!(first, second);
        assert_eq!(report.issues().len(), 1);
        let issue = &report.issues()[0];
        assert_eq!(issue.occurrences, 2);
        assert_eq!(issue.tests, vec!["t1".to_string(), "t2".to_string()]);
        // The first reporter's wording wins.
        assert_eq!(issue.title, "Login failed");
    }

    #[test]
    fn test_unrelated_titles_stay_distinct() {
        let mut report = ReportGenerator::new();
        report.add_issue("Login failed", "", Severity::High, None, None);
        report.add_issue("Totally unrelated bug", "", Severity::Low, None, None);

        assert_eq!(report.issues().len(), 2);
        assert_eq!(report.issues()[1].id, "ISSUE-2");
        assert_eq!(report.issues()[1].occurrences, 1);
    }

    #[test]
    fn test_containment_merges_in_both_directions() {
        let mut report = ReportGenerator::new();
        report.add_issue("Crash on save", "", Severity::Critical, None, None);
        // New title contains the existing one.
        report.add_issue("Crash on save dialog", "", Severity::Critical, None, None);
        // New title is contained by the existing one.
        report.add_issue("on save", "", Severity::Critical, None, None);

        assert_eq!(report.issues().len(), 1);
        assert_eq!(report.issues()[0].occurrences, 3);
    }

    #[test]
    fn test_first_match_in_insertion_order_wins() {
        let mut report = ReportGenerator::new();
        let a = report.add_issue("save", "", Severity::Low, None, None);
        report.add_issue("load", "", Severity::Low, None, None);
        // Matches both existing titles by containment; must merge into
        // the earliest.
        let merged = report.add_issue("save and load", "", Severity::Low, None, None);

        assert_eq!(merged, a);
        assert_eq!(report.issues()[0].occurrences, 2);
        assert_eq!(report.issues()[1].occurrences, 1);
    }
}

#[cfg(test)]
mod summary_tests {
    use super::*;

    #[test]
    fn test_summary_over_zero_suites() {
        let report = ReportGenerator::new();
        let summary = report.generate_summary();

        assert_eq!(summary.statistics.total, 0);
        assert_eq!(summary.statistics.pass_rate, 0.0);
        assert_eq!(summary.critical_issues, 0);
        assert_eq!(summary.suites, 0);
    }

    #[test]
    fn test_summary_sums_across_suites() {
        let mut report = ReportGenerator::new();
        report.add_suite(build_suite("alpha", 3, 1, 0, 0));
        report.add_suite(build_suite("beta", 1, 0, 1, 1));
        report.add_issue("boom", "", Severity::Critical, None, None);
        report.add_issue("meh", "", Severity::Low, None, None);

        let summary = report.generate_summary();
        assert_eq!(summary.statistics.total, 7);
        assert_eq!(summary.statistics.passed, 4);
        assert_eq!(summary.statistics.failed, 1);
        assert_eq!(summary.statistics.skipped, 1);
        assert_eq!(summary.statistics.broken, 1);
        assert!((summary.statistics.pass_rate - 4.0 / 7.0 * 100.0).abs() < 1e-9);
        assert_eq!(summary.issues, 2);
        assert_eq!(summary.critical_issues, 1);
        assert_eq!(summary.suites, 2);
    }

    #[test]
    fn test_suite_statistics() {
        let suite = build_suite("solo", 2, 1, 1, 0);
        let stats = suite.statistics();
        assert_eq!(stats.total, 4);
        assert!((stats.pass_rate - 50.0).abs() < 1e-9);
    }
}

#[cfg(test)]
mod bullet_point_tests {
    use super::*;

    #[test]
    fn test_clean_run_emits_only_the_pass_rate_line() {
        let mut report = ReportGenerator::new();
        report.add_suite(build_suite("alpha", 3, 0, 0, 0));

        let bullets = report.generate_bullet_points();
        assert_eq!(bullets.len(), 1);
        assert_eq!(bullets[0], "- Ran 3 tests with 100.0% pass rate");
    }

    #[test]
    fn test_conditional_lines_and_severity_order() {
        let mut report = ReportGenerator::new();
        report.add_suite(build_suite("alpha", 1, 2, 0, 1));
        report.add_issue("slow search", "", Severity::Low, None, None);
        report.add_issue("crash on login", "", Severity::Critical, None, None);
        report.add_issue("crash on login", "", Severity::Critical, None, None);
        report.add_issue("misaligned button", "", Severity::Medium, None, None);

        let bullets = report.generate_bullet_points();
        assert_eq!(bullets[0], "- Ran 4 tests with 25.0% pass rate");
        assert_eq!(bullets[1], "- 2 tests failed");
        assert_eq!(bullets[2], "- 1 tests broken (infrastructure issues)");
        assert_eq!(bullets[3], "- 1 critical issues found");
        // Issues ranked critical < medium < low, occurrences annotated.
        assert_eq!(bullets[4], "  [critical] crash on login (2x)");
        assert_eq!(bullets[5], "  [medium] misaligned button");
        assert_eq!(bullets[6], "  [low] slow search");
    }
}

#[cfg(test)]
mod trend_tests {
    use super::*;

    #[test]
    fn test_empty_history_yields_default_trend() {
        let report = ReportGenerator::new();
        let trends = report.get_trends();
        assert_eq!(trends.total_runs, 0);
        assert_eq!(trends.avg_pass_rate, 0.0);
        assert!(trends.pass_rate_trend.is_empty());
    }

    #[test]
    fn test_trend_store_round_trip_feeds_report_trends() {
        let dir = tempdir().unwrap();
        let history = dir.path().join("history.json");

        let mut store = TrendStore::open(&history);
        let mut first = ReportGenerator::new();
        first.add_suite(build_suite("alpha", 1, 1, 0, 0));
        store.append(first.generate_summary());
        let mut second = ReportGenerator::new();
        second.add_suite(build_suite("alpha", 3, 1, 0, 0));
        store.append(second.generate_summary());
        store.save().unwrap();

        let mut report = ReportGenerator::new();
        report.load_history(&history);
        let trends = report.get_trends();
        assert_eq!(trends.total_runs, 2);
        assert_eq!(trends.pass_rate_trend.len(), 2);
        assert!((trends.pass_rate_trend[0] - 50.0).abs() < 1e-9);
        assert!((trends.pass_rate_trend[1] - 75.0).abs() < 1e-9);
        assert!((trends.avg_pass_rate - 62.5).abs() < 1e-9);

        let reopened = TrendStore::open(&history);
        assert_eq!(reopened.len(), 2);
        assert!((reopened.average_pass_rate() - 62.5).abs() < 1e-9);
    }

    #[test]
    fn test_corrupt_history_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let history = dir.path().join("history.json");
        fs::write(&history, "[{ not json").unwrap();

        let store = TrendStore::open(&history);
        assert!(store.is_empty());

        let mut report = ReportGenerator::new();
        report.load_history(&history);
        assert_eq!(report.get_trends().total_runs, 0);
    }
}
