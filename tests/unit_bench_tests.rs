//! # Bench Matrix Unit Tests / 基准矩阵单元测试
//!
//! This module contains unit tests for the parallel bench matrix:
//! aggregation rules, per-probe timeouts, cancellation, and the
//! worker-pool bound.
//!
//! 此模块包含并行基准矩阵的单元测试：
//! 聚合规则、单探针超时、取消以及工作池上限。

use beta_harness::core::bench::{
    BenchConfig, BenchProbe, BenchResult, DEFAULT_MATRIX, run_matrix, summarize,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn probe_ok(load_time_ms: f64) -> BenchProbe {
    BenchProbe {
        load_time_ms,
        node_id: String::new(),
        screenshot_path: None,
        custom_metrics: HashMap::new(),
    }
}

fn result(browser: &str, platform: &str, node: &str, success: bool, dur: f64, load: f64) -> BenchResult {
    BenchResult {
        browser: browser.to_string(),
        platform: platform.to_string(),
        node_id: node.to_string(),
        success,
        duration_ms: dur,
        load_time_ms: load,
        screenshot_path: None,
        error: if success { None } else { Some("boom".to_string()) },
        custom_metrics: HashMap::new(),
    }
}

#[cfg(test)]
mod summarize_tests {
    use super::*;

    #[test]
    fn test_averages_cover_successful_probes_only() {
        let summary = summarize(vec![
            result("chrome", "linux", "n1", true, 100.0, 40.0),
            result("firefox", "linux", "n2", true, 300.0, 80.0),
            result("edge", "windows", "n3", false, 9999.0, 0.0),
        ]);

        assert_eq!(summary.total_probes, 3);
        assert_eq!(summary.passed_probes, 2);
        assert_eq!(summary.failed_probes, 1);
        assert!((summary.avg_duration_ms - 200.0).abs() < 1e-9);
        assert!((summary.avg_load_time_ms - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_distinct_nodes_browsers_platforms() {
        let summary = summarize(vec![
            result("chrome", "linux", "n1", true, 1.0, 1.0),
            result("chrome", "windows", "n1", true, 1.0, 1.0),
            result("firefox", "linux", "n2", true, 1.0, 1.0),
        ]);

        assert_eq!(summary.nodes_used, 2);
        assert_eq!(summary.browsers_tested, vec!["chrome", "firefox"]);
        assert_eq!(summary.platforms_tested, vec!["linux", "windows"]);
    }

    #[test]
    fn test_empty_matrix_summarizes_to_zeros() {
        let summary = summarize(Vec::new());
        assert_eq!(summary.total_probes, 0);
        assert_eq!(summary.avg_duration_ms, 0.0);
        assert!(summary.results.is_empty());
    }

    #[test]
    fn test_default_matrix_shape() {
        assert_eq!(DEFAULT_MATRIX.len(), 5);
        assert!(DEFAULT_MATRIX.iter().any(|c| c.browser == "chrome"));
        assert!(DEFAULT_MATRIX.iter().all(|c| !c.platform.is_empty()));
    }
}

#[cfg(test)]
mod run_matrix_tests {
    use super::*;

    #[tokio::test]
    async fn test_all_probes_run_and_reduce() {
        let configs = vec![
            BenchConfig::new("chrome", "linux"),
            BenchConfig::new("firefox", "linux"),
            BenchConfig::new("edge", "windows"),
        ];

        let summary = run_matrix(
            configs,
            2,
            Duration::from_secs(5),
            CancellationToken::new(),
            |config| async move {
                if config.browser == "edge" {
                    Err(anyhow::anyhow!("no such node"))
                } else {
                    Ok(probe_ok(25.0))
                }
            },
        )
        .await;

        assert_eq!(summary.total_probes, 3);
        assert_eq!(summary.passed_probes, 2);
        assert_eq!(summary.failed_probes, 1);
        let failed = summary.results.iter().find(|r| !r.success).unwrap();
        assert_eq!(failed.browser, "edge");
        assert!(failed.error.as_deref().unwrap().contains("no such node"));
    }

    #[tokio::test]
    async fn test_probe_timeout_is_recorded_as_failure() {
        let configs = vec![BenchConfig::new("chrome", "linux")];

        let summary = run_matrix(
            configs,
            1,
            Duration::from_millis(50),
            CancellationToken::new(),
            |_config| async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(probe_ok(1.0))
            },
        )
        .await;

        assert_eq!(summary.failed_probes, 1);
        let failed = &summary.results[0];
        assert!(!failed.success);
        assert!(failed.error.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_cancelled_token_short_circuits_probes() {
        let stop = CancellationToken::new();
        stop.cancel();

        let summary = run_matrix(
            vec![
                BenchConfig::new("chrome", "linux"),
                BenchConfig::new("firefox", "linux"),
            ],
            2,
            Duration::from_secs(5),
            stop,
            |_config| async move { Ok(probe_ok(1.0)) },
        )
        .await;

        assert_eq!(summary.total_probes, 2);
        assert_eq!(summary.passed_probes, 0);
        assert!(
            summary
                .results
                .iter()
                .all(|r| r.error.as_deref() == Some("probe cancelled"))
        );
    }

    #[tokio::test]
    async fn test_worker_pool_bound_is_respected() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let jobs = 2;

        let configs: Vec<BenchConfig> = (0..8)
            .map(|i| BenchConfig::new(format!("browser-{}", i), "linux"))
            .collect();

        let in_flight_probe = in_flight.clone();
        let max_seen_probe = max_seen.clone();
        let summary = run_matrix(
            configs,
            jobs,
            Duration::from_secs(5),
            CancellationToken::new(),
            move |_config| {
                let in_flight = in_flight_probe.clone();
                let max_seen = max_seen_probe.clone();
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(probe_ok(1.0))
                }
            },
        )
        .await;

        assert_eq!(summary.passed_probes, 8);
        assert!(
            max_seen.load(Ordering::SeqCst) <= jobs,
            "worker pool exceeded its bound: {}",
            max_seen.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn test_probe_node_id_falls_back_to_index() {
        let summary = run_matrix(
            vec![BenchConfig::new("chrome", "linux")],
            1,
            Duration::from_secs(5),
            CancellationToken::new(),
            |_config| async move { Ok(probe_ok(1.0)) },
        )
        .await;

        assert_eq!(summary.results[0].node_id, "node_0");
    }
}
