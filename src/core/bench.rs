//! # Bench Matrix Module / 基准矩阵模块
//!
//! Parallel multi-configuration benchmarking: a bounded worker pool runs
//! fully isolated probes, one per browser/platform combination, and
//! the results are combined only after every worker has completed or
//! timed out (accumulate-then-reduce, no shared mutable counters).
//!
//! 并行多配置基准测试：有界工作池运行完全隔离的探针（每个浏览器/平台
//! 组合一个），结果只在所有工作者完成或超时后合并
//! （先累积后归约，没有共享可变计数器）。

use futures::{stream, StreamExt};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// One probe configuration in the matrix.
/// 矩阵中的一个探针配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    pub browser: String,
    #[serde(default = "default_platform")]
    pub platform: String,
}

impl BenchConfig {
    pub fn new(browser: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            browser: browser.into(),
            platform: platform.into(),
        }
    }
}

fn default_platform() -> String {
    "any".to_string()
}

/// The matrix used when a configuration does not provide its own.
/// 配置未提供矩阵时使用的默认矩阵。
pub static DEFAULT_MATRIX: Lazy<Vec<BenchConfig>> = Lazy::new(|| {
    vec![
        BenchConfig::new("chrome", "windows"),
        BenchConfig::new("chrome", "linux"),
        BenchConfig::new("firefox", "windows"),
        BenchConfig::new("firefox", "linux"),
        BenchConfig::new("edge", "windows"),
    ]
});

/// Successful probe observation handed back by the probe closure.
/// 探针闭包返回的成功探测观测。
#[derive(Debug, Clone, Default)]
pub struct BenchProbe {
    pub load_time_ms: f64,
    pub node_id: String,
    pub screenshot_path: Option<PathBuf>,
    pub custom_metrics: HashMap<String, f64>,
}

/// Outcome of one isolated probe.
/// 单个隔离探针的结果。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchResult {
    pub browser: String,
    pub platform: String,
    pub node_id: String,
    pub success: bool,
    pub duration_ms: f64,
    pub load_time_ms: f64,
    #[serde(default)]
    pub screenshot_path: Option<PathBuf>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub custom_metrics: HashMap<String, f64>,
}

/// Aggregate over all probes, computed once after the pool drains.
/// Averages cover successful probes only.
///
/// 所有探针的聚合，在工作池排空后一次性计算。
/// 平均值只覆盖成功的探针。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchSummary {
    pub total_probes: usize,
    pub passed_probes: usize,
    pub failed_probes: usize,
    pub avg_duration_ms: f64,
    pub avg_load_time_ms: f64,
    pub nodes_used: usize,
    pub browsers_tested: Vec<String>,
    pub platforms_tested: Vec<String>,
    pub results: Vec<BenchResult>,
}

/// Runs the probe over every configuration through a bounded worker
/// pool and reduces the collected results into a summary.
///
/// Each probe races its future against the per-probe timeout and the
/// cancellation token. Probes own their external resources; a timed-out
/// or cancelled probe's process dies with its kill-on-drop handle. No
/// retries; retry policy is a layered concern outside this contract.
///
/// 通过有界工作池对每个配置运行探针，并将收集到的结果归约为摘要。
///
/// 每个探针让其 future 与单探针超时及取消令牌竞争。
/// 探针拥有自己的外部资源；超时或被取消的探针进程随其 kill-on-drop
/// 句柄一起结束。没有重试；重试策略是此契约之外的分层关注点。
pub async fn run_matrix<F, Fut>(
    configs: Vec<BenchConfig>,
    jobs: usize,
    per_probe_timeout: Duration,
    stop: CancellationToken,
    probe: F,
) -> BenchSummary
where
    F: Fn(BenchConfig) -> Fut,
    Fut: Future<Output = anyhow::Result<BenchProbe>>,
{
    let probe = &probe;
    let results: Vec<BenchResult> = stream::iter(configs.into_iter().enumerate())
        .map(|(index, config)| {
            let stop = stop.clone();
            async move { run_single(index, config, per_probe_timeout, stop, probe).await }
        })
        .buffer_unordered(jobs.max(1))
        .collect()
        .await;

    summarize(results)
}

async fn run_single<F, Fut>(
    index: usize,
    config: BenchConfig,
    per_probe_timeout: Duration,
    stop: CancellationToken,
    probe: &F,
) -> BenchResult
where
    F: Fn(BenchConfig) -> Fut,
    Fut: Future<Output = anyhow::Result<BenchProbe>>,
{
    let start = Instant::now();
    let fallback_node = format!("node_{}", index);

    let outcome = tokio::select! {
        biased;
        _ = stop.cancelled() => Err(anyhow::anyhow!("probe cancelled")),
        timed = tokio::time::timeout(per_probe_timeout, probe(config.clone())) => {
            match timed {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!(
                    "probe timed out after {}s",
                    per_probe_timeout.as_secs()
                )),
            }
        }
    };

    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    match outcome {
        Ok(observed) => BenchResult {
            browser: config.browser,
            platform: config.platform,
            node_id: if observed.node_id.is_empty() {
                fallback_node
            } else {
                observed.node_id
            },
            success: true,
            duration_ms,
            load_time_ms: observed.load_time_ms,
            screenshot_path: observed.screenshot_path,
            error: None,
            custom_metrics: observed.custom_metrics,
        },
        Err(e) => BenchResult {
            browser: config.browser,
            platform: config.platform,
            node_id: fallback_node,
            success: false,
            duration_ms,
            load_time_ms: 0.0,
            screenshot_path: None,
            error: Some(e.to_string()),
            custom_metrics: HashMap::new(),
        },
    }
}

/// The reduce step: one pass over the accumulated results.
/// 归约步骤：对累积结果的一次遍历。
pub fn summarize(results: Vec<BenchResult>) -> BenchSummary {
    let mut summary = BenchSummary {
        total_probes: results.len(),
        passed_probes: results.iter().filter(|r| r.success).count(),
        ..BenchSummary::default()
    };
    summary.failed_probes = summary.total_probes - summary.passed_probes;

    let durations: Vec<f64> = results
        .iter()
        .filter(|r| r.success)
        .map(|r| r.duration_ms)
        .collect();
    if !durations.is_empty() {
        summary.avg_duration_ms = durations.iter().sum::<f64>() / durations.len() as f64;
    }
    let load_times: Vec<f64> = results
        .iter()
        .filter(|r| r.success && r.load_time_ms > 0.0)
        .map(|r| r.load_time_ms)
        .collect();
    if !load_times.is_empty() {
        summary.avg_load_time_ms = load_times.iter().sum::<f64>() / load_times.len() as f64;
    }

    summary.nodes_used = distinct(results.iter().map(|r| r.node_id.as_str())).len();
    summary.browsers_tested = distinct(results.iter().map(|r| r.browser.as_str()));
    summary.platforms_tested = distinct(results.iter().map(|r| r.platform.as_str()));
    summary.results = results;
    summary
}

/// Distinct values preserving first appearance.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.iter().any(|s: &String| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}
