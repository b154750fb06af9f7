//! # Metrics Collector Unit Tests / 指标收集器单元测试
//!
//! This module contains unit tests for the metrics collector: pass-rate
//! accounting, both flakiness definitions, crash-rate behavior, and
//! snapshot persistence round trips.
//!
//! 此模块包含指标收集器的单元测试：通过率统计、两种不稳定度定义、
//! 崩溃率行为以及快照持久化往返。

use beta_harness::core::metrics::MetricsCollector;
use std::collections::HashMap;
use std::fs;
use tempfile::tempdir;

#[cfg(test)]
mod real_time_metrics_tests {
    use super::*;

    #[test]
    fn test_empty_collector_yields_zeros() {
        let collector = MetricsCollector::new();
        let metrics = collector.get_real_time_metrics();

        assert_eq!(metrics.total_tests, 0);
        assert_eq!(metrics.passed_tests, 0);
        assert_eq!(metrics.failed_tests, 0);
        assert_eq!(metrics.pass_rate, 0.0);
        assert_eq!(metrics.flaky_test_rate, 0.0);
        assert_eq!(metrics.crash_rate, 0.0);
        // All-zero state still scores the flakiness share of engagement.
        assert!((metrics.engagement_score - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_passed_plus_failed_equals_total() {
        let mut collector = MetricsCollector::new();
        collector.record_test_result("login", true);
        collector.record_test_result("login", false);
        collector.record_test_result("checkout", true);
        collector.record_test_result("search", false);

        let metrics = collector.get_real_time_metrics();
        assert_eq!(metrics.total_tests, 4);
        assert_eq!(metrics.passed_tests + metrics.failed_tests, metrics.total_tests);
        assert!((metrics.pass_rate - 50.0).abs() < 1e-9);
        assert_eq!(metrics.active_tests, 3);
    }

    #[test]
    fn test_pass_rate_spans_all_test_names_combined() {
        let mut collector = MetricsCollector::new();
        for _ in 0..3 {
            collector.record_test_result("a", true);
        }
        collector.record_test_result("b", false);

        let metrics = collector.get_real_time_metrics();
        assert!((metrics.pass_rate - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_flaky_rate_has_no_run_threshold() {
        let mut collector = MetricsCollector::new();
        // Two runs with mixed outcomes: flaky even below any min-run cut.
        collector.record_test_result("wobbly", true);
        collector.record_test_result("wobbly", false);
        collector.record_test_result("steady", true);

        let metrics = collector.get_real_time_metrics();
        assert!((metrics.flaky_test_rate - 50.0).abs() < 1e-9);
        // The threshold-aware listing disagrees on purpose.
        assert!(collector.get_flaky_tests(3).is_empty());
    }

    #[test]
    fn test_engagement_score_is_clamped() {
        let mut collector = MetricsCollector::new();
        collector.record_test_result("solid", true);

        let metrics = collector.get_real_time_metrics();
        // 100 * 0.8 + 100 * 0.2 clamps to 100.
        assert!((metrics.engagement_score - 100.0).abs() < 1e-9);
        assert!(metrics.engagement_score <= 100.0);
    }

    #[test]
    fn test_crash_rate_counts_against_elapsed_session_time() {
        let mut collector = MetricsCollector::new();
        collector.record_crash();
        collector.record_crash();
        std::thread::sleep(std::time::Duration::from_millis(10));

        let metrics = collector.get_real_time_metrics();
        assert_eq!(collector.crash_count(), 2);
        assert!(metrics.crash_rate > 0.0);
    }

    #[test]
    fn test_average_timings() {
        let mut collector = MetricsCollector::new();
        collector.record_response_time(100.0);
        collector.record_response_time(300.0);
        collector.record_load_time(50.0);

        let metrics = collector.get_real_time_metrics();
        assert!((metrics.avg_response_time_ms - 200.0).abs() < 1e-9);
        assert!((metrics.avg_load_time_ms - 50.0).abs() < 1e-9);
    }
}

#[cfg(test)]
mod flaky_tests_tests {
    use super::*;

    #[test]
    fn test_pass_fail_pass_is_one_third_flaky() {
        let mut collector = MetricsCollector::new();
        collector.record_test_result("blinker", true);
        collector.record_test_result("blinker", false);
        collector.record_test_result("blinker", true);

        let flaky = collector.get_flaky_tests(3);
        assert_eq!(flaky.len(), 1);
        assert_eq!(flaky[0].name, "blinker");
        assert_eq!(flaky[0].total_runs, 3);
        assert_eq!(flaky[0].pass_count, 2);
        assert_eq!(flaky[0].fail_count, 1);
        assert!((flaky[0].flakiness_rate - 33.33).abs() < 0.01);
    }

    #[test]
    fn test_min_runs_threshold_filters() {
        let mut collector = MetricsCollector::new();
        collector.record_test_result("short", true);
        collector.record_test_result("short", false);

        assert_eq!(collector.get_flaky_tests(3).len(), 0);
        assert_eq!(collector.get_flaky_tests(2).len(), 1);
    }

    #[test]
    fn test_consistent_tests_are_not_flaky() {
        let mut collector = MetricsCollector::new();
        for _ in 0..5 {
            collector.record_test_result("all-pass", true);
            collector.record_test_result("all-fail", false);
        }

        assert!(collector.get_flaky_tests(1).is_empty());
    }

    #[test]
    fn test_sorted_descending_by_flakiness() {
        let mut collector = MetricsCollector::new();
        // 25% flaky
        collector.record_test_result("mild", false);
        for _ in 0..3 {
            collector.record_test_result("mild", true);
        }
        // 50% flaky
        collector.record_test_result("wild", true);
        collector.record_test_result("wild", false);
        collector.record_test_result("wild", true);
        collector.record_test_result("wild", false);

        let flaky = collector.get_flaky_tests(4);
        assert_eq!(flaky.len(), 2);
        assert_eq!(flaky[0].name, "wild");
        assert_eq!(flaky[1].name, "mild");
    }
}

#[cfg(test)]
mod persistence_tests {
    use super::*;

    #[test]
    fn test_save_then_load_reproduces_derived_metrics() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.json");

        let mut collector = MetricsCollector::with_storage(&path);
        collector.record_test_result("login", true);
        collector.record_test_result("login", false);
        collector.record_test_result("checkout", true);
        collector.record_response_time(120.0);
        collector.record_load_time(40.0);
        collector.record_metric("fps", 59.8, HashMap::new(), HashMap::new());
        collector.save().unwrap();

        let reloaded = MetricsCollector::with_storage(&path);
        // No crash events recorded, so nothing here depends on the call
        // instant and the snapshots must match exactly.
        assert_eq!(
            collector.get_real_time_metrics(),
            reloaded.get_real_time_metrics()
        );
        assert_eq!(collector.session_start(), reloaded.session_start());
        assert_eq!(reloaded.get_trend_data("fps", 10).len(), 1);
    }

    #[test]
    fn test_corrupt_snapshot_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        fs::write(&path, "{ not json").unwrap();

        let collector = MetricsCollector::with_storage(&path);
        let metrics = collector.get_real_time_metrics();
        assert_eq!(metrics.total_tests, 0);
        assert_eq!(collector.crash_count(), 0);
    }

    #[test]
    fn test_missing_snapshot_is_not_fatal() {
        let dir = tempdir().unwrap();
        let collector = MetricsCollector::with_storage(dir.path().join("absent.json"));
        assert_eq!(collector.get_real_time_metrics().total_tests, 0);
    }

    #[test]
    fn test_collector_without_storage_saves_as_noop() {
        let mut collector = MetricsCollector::new();
        collector.record_test_result("x", true);
        assert!(collector.save().is_ok());
    }
}

#[cfg(test)]
mod reset_tests {
    use super::*;

    #[test]
    fn test_reset_clears_series_and_moves_session_start() {
        let mut collector = MetricsCollector::new();
        collector.record_test_result("x", true);
        collector.record_crash();
        collector.record_response_time(10.0);
        let started = collector.session_start();

        std::thread::sleep(std::time::Duration::from_millis(5));
        collector.reset();

        let metrics = collector.get_real_time_metrics();
        assert_eq!(metrics.total_tests, 0);
        assert_eq!(collector.crash_count(), 0);
        assert!(collector.session_start() > started);
    }
}

#[cfg(test)]
mod trend_data_tests {
    use super::*;

    #[test]
    fn test_trend_data_returns_last_n_points_for_one_metric() {
        let mut collector = MetricsCollector::new();
        for i in 0..5 {
            collector.record_metric("fps", 60.0 - i as f64, HashMap::new(), HashMap::new());
        }
        collector.record_metric("memory_mb", 512.0, HashMap::new(), HashMap::new());

        let trend = collector.get_trend_data("fps", 3);
        assert_eq!(trend.len(), 3);
        assert!((trend[0].value - 58.0).abs() < 1e-9);
        assert!((trend[2].value - 56.0).abs() < 1e-9);
    }
}
