//! # Metrics Collector Module / 指标收集器模块
//!
//! Accumulates raw observation streams (per-test pass/fail sequences,
//! crash events, response and load timings, named metric points) and
//! derives real-time and threshold-aware statistics from them on demand.
//! Derived values are never stored; the raw history is the only ground
//! truth, and it is what the JSON snapshot persists so that a reload
//! reproduces identical derived metrics.
//!
//! 累积原始观测流（每个测试的通过/失败序列、崩溃事件、响应与加载耗时、
//! 命名指标点），并按需从中推导实时与带阈值的统计数据。
//! 派生值从不被存储；原始历史是唯一的事实来源，
//! JSON 快照持久化的正是它，因此重新加载会复现完全相同的派生指标。

use chrono::{DateTime, Utc};
use colored::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::infra::t;

/// A single immutable metric observation.
/// 单个不可变的指标观测。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestMetric {
    pub name: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

/// Derived statistics, recomputed from the accumulated series on every
/// call to [`MetricsCollector::get_real_time_metrics`]. Never persisted
/// as authoritative state.
///
/// 派生统计数据，每次调用 [`MetricsCollector::get_real_time_metrics`]
/// 时都会从累积序列重新计算。从不作为权威状态持久化。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealTimeMetrics {
    /// Crashes per elapsed hour since session start. Recomputed at call
    /// time, so the value decays as the session ages even with no new
    /// crashes. Intentional, not a defect.
    ///
    /// 自会话开始以来每小时的崩溃数。在调用时重新计算，
    /// 因此即使没有新的崩溃，该值也会随会话时间增长而衰减；
    /// 这是有意的设计，不是缺陷。
    pub crash_rate: f64,
    pub pass_rate: f64,
    /// Share of distinct test names whose sequence contains both a pass
    /// and a fail. No minimum-run threshold; this intentionally
    /// diverges from [`MetricsCollector::get_flaky_tests`].
    ///
    /// 序列中同时包含通过与失败的不同测试名称所占的比例。
    /// 没有最小运行次数阈值；这与
    /// [`MetricsCollector::get_flaky_tests`] 刻意不同。
    pub flaky_test_rate: f64,
    pub avg_response_time_ms: f64,
    pub avg_load_time_ms: f64,
    pub active_tests: usize,
    pub total_tests: usize,
    pub passed_tests: usize,
    pub failed_tests: usize,
    pub engagement_score: f64,
}

/// One entry in the threshold-aware flaky-test listing.
/// 带阈值的不稳定测试列表中的一个条目。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlakyTest {
    pub name: String,
    pub total_runs: usize,
    pub pass_count: usize,
    pub fail_count: usize,
    pub flakiness_rate: f64,
}

/// The persisted form: the full raw event history, not derived
/// aggregates.
/// 持久化形式：完整的原始事件历史，而非派生聚合。
#[derive(Debug, Serialize, Deserialize)]
struct MetricsSnapshot {
    session_start: DateTime<Utc>,
    #[serde(default)]
    metrics: Vec<TestMetric>,
    #[serde(default)]
    test_results: HashMap<String, Vec<bool>>,
    #[serde(default)]
    crash_events: Vec<DateTime<Utc>>,
    #[serde(default)]
    response_times: Vec<f64>,
    #[serde(default)]
    load_times: Vec<f64>,
}

/// Collector for test observations with on-demand aggregation.
///
/// Not designed for concurrent writers: callers serialize appends, e.g.
/// a single orchestrator draining a completion channel. All series are
/// unbounded; call [`reset`](Self::reset) if growth is a concern.
///
/// 带按需聚合的测试观测收集器。
///
/// 未为并发写入者设计：调用方需要串行化追加操作，
/// 例如由单个编排器排空完成通道。所有序列均无上限；
/// 如担心增长请调用 [`reset`](Self::reset)。
pub struct MetricsCollector {
    storage_path: Option<PathBuf>,
    metrics: Vec<TestMetric>,
    test_results: HashMap<String, Vec<bool>>,
    // Append-only first-seen name order; backs the stable tie order in
    // get_flaky_tests.
    seen_order: Vec<String>,
    crash_events: Vec<DateTime<Utc>>,
    response_times: Vec<f64>,
    load_times: Vec<f64>,
    session_start: DateTime<Utc>,
}

impl MetricsCollector {
    /// Creates an in-memory collector. The session start is fixed here
    /// and only moves again on an explicit [`reset`](Self::reset).
    ///
    /// 创建内存中的收集器。会话开始时间在此固定，
    /// 只有显式调用 [`reset`](Self::reset) 才会再次改变。
    pub fn new() -> Self {
        Self {
            storage_path: None,
            metrics: Vec::new(),
            test_results: HashMap::new(),
            seen_order: Vec::new(),
            crash_events: Vec::new(),
            response_times: Vec::new(),
            load_times: Vec::new(),
            session_start: Utc::now(),
        }
    }

    /// Creates a collector backed by a snapshot file. An existing
    /// snapshot is reloaded so derived metrics continue where the
    /// previous session left off; a missing or corrupt file degrades to
    /// an empty history and is never fatal.
    ///
    /// 创建由快照文件支撑的收集器。已有快照会被重新加载，
    /// 使派生指标从上一会话停止处继续；文件缺失或损坏会退化为空历史，
    /// 绝不致命。
    pub fn with_storage(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut collector = Self::new();
        collector.load_history(&path);
        collector.storage_path = Some(path);
        collector
    }

    /// Records a named metric observation.
    /// 记录一个命名指标观测。
    pub fn record_metric(
        &mut self,
        name: &str,
        value: f64,
        tags: HashMap<String, String>,
        metadata: HashMap<String, Value>,
    ) {
        self.metrics.push(TestMetric {
            name: name.to_string(),
            value,
            timestamp: Utc::now(),
            tags,
            metadata,
        });
    }

    /// Appends one pass/fail outcome to the named test's ordered,
    /// append-only sequence.
    ///
    /// 向命名测试的有序、只追加序列中追加一个通过/失败结果。
    pub fn record_test_result(&mut self, test_name: &str, passed: bool) {
        if !self.test_results.contains_key(test_name) {
            self.seen_order.push(test_name.to_string());
        }
        self.test_results
            .entry(test_name.to_string())
            .or_default()
            .push(passed);
    }

    /// Records a crash event at the current instant.
    pub fn record_crash(&mut self) {
        self.crash_events.push(Utc::now());
    }

    /// Records a response-time measurement in milliseconds.
    pub fn record_response_time(&mut self, time_ms: f64) {
        self.response_times.push(time_ms);
    }

    /// Records a load-time measurement in milliseconds.
    pub fn record_load_time(&mut self, time_ms: f64) {
        self.load_times.push(time_ms);
    }

    /// Computes the current derived statistics from the accumulated
    /// state.
    ///
    /// 从累积状态计算当前派生统计数据。
    pub fn get_real_time_metrics(&self) -> RealTimeMetrics {
        let mut derived = RealTimeMetrics::default();

        let total: usize = self.test_results.values().map(Vec::len).sum();
        let passed: usize = self
            .test_results
            .values()
            .map(|seq| seq.iter().filter(|p| **p).count())
            .sum();
        if total > 0 {
            derived.pass_rate = passed as f64 / total as f64 * 100.0;
            derived.total_tests = total;
            derived.passed_tests = passed;
            derived.failed_tests = total - passed;
        }
        derived.active_tests = self.test_results.len();

        let session_hours =
            (Utc::now() - self.session_start).num_milliseconds() as f64 / 3_600_000.0;
        if session_hours > 0.0 {
            derived.crash_rate = self.crash_events.len() as f64 / session_hours;
        }

        let flaky_count = self
            .test_results
            .values()
            .filter(|seq| is_mixed(seq))
            .count();
        if !self.test_results.is_empty() {
            derived.flaky_test_rate = flaky_count as f64 / self.test_results.len() as f64 * 100.0;
        }

        if !self.response_times.is_empty() {
            derived.avg_response_time_ms =
                self.response_times.iter().sum::<f64>() / self.response_times.len() as f64;
        }
        if !self.load_times.is_empty() {
            derived.avg_load_time_ms =
                self.load_times.iter().sum::<f64>() / self.load_times.len() as f64;
        }

        derived.engagement_score = (derived.pass_rate * 0.8
            + (100.0 - derived.flaky_test_rate) * 0.2)
            .clamp(0.0, 100.0);

        derived
    }

    /// Lists tests with at least `min_runs` recorded runs and both
    /// outcomes present, with `flakiness_rate = min(pass, fail) / total
    /// × 100`, sorted descending. The sort is stable over first-seen
    /// order, so ties keep their first appearance. An implementation
    /// detail, not a contract.
    ///
    /// 列出运行次数不少于 `min_runs` 且两种结果都出现过的测试，
    /// `flakiness_rate = min(通过, 失败) / 总数 × 100`，降序排列。
    /// 排序在首次出现顺序上是稳定的，因此并列项保持其首次出现的次序；
    /// 这是实现细节，不是契约。
    pub fn get_flaky_tests(&self, min_runs: usize) -> Vec<FlakyTest> {
        let mut flaky: Vec<FlakyTest> = self
            .seen_order
            .iter()
            .filter_map(|name| {
                let seq = self.test_results.get(name)?;
                if seq.len() < min_runs {
                    return None;
                }
                let pass_count = seq.iter().filter(|p| **p).count();
                let fail_count = seq.len() - pass_count;
                if pass_count == 0 || fail_count == 0 {
                    return None;
                }
                Some(FlakyTest {
                    name: name.clone(),
                    total_runs: seq.len(),
                    pass_count,
                    fail_count,
                    flakiness_rate: pass_count.min(fail_count) as f64 / seq.len() as f64 * 100.0,
                })
            })
            .collect();

        flaky.sort_by(|a, b| {
            b.flakiness_rate
                .partial_cmp(&a.flakiness_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        flaky
    }

    /// The last `last_n` recorded points for a named metric.
    /// 命名指标最近 `last_n` 个记录点。
    pub fn get_trend_data(&self, metric_name: &str, last_n: usize) -> Vec<TestMetric> {
        let filtered: Vec<&TestMetric> = self
            .metrics
            .iter()
            .filter(|m| m.name == metric_name)
            .collect();
        let start = filtered.len().saturating_sub(last_n);
        filtered[start..].iter().map(|m| (*m).clone()).collect()
    }

    /// Total crash events recorded this session.
    pub fn crash_count(&self) -> usize {
        self.crash_events.len()
    }

    /// The fixed session start this collector derives crash rate from.
    pub fn session_start(&self) -> DateTime<Utc> {
        self.session_start
    }

    /// Persists the full raw event history to the storage path. A
    /// collector without storage saves nothing and succeeds.
    ///
    /// 将完整原始事件历史持久化到存储路径。
    /// 没有存储路径的收集器不保存任何内容并直接成功。
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = &self.storage_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let snapshot = MetricsSnapshot {
            session_start: self.session_start,
            metrics: self.metrics.clone(),
            test_results: self.test_results.clone(),
            crash_events: self.crash_events.clone(),
            response_times: self.response_times.clone(),
            load_times: self.load_times.clone(),
        };
        fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
        Ok(())
    }

    /// Clears all series and re-fixes the session start at now.
    /// 清空所有序列并将会话开始时间重新固定为当前时刻。
    pub fn reset(&mut self) {
        self.metrics.clear();
        self.test_results.clear();
        self.seen_order.clear();
        self.crash_events.clear();
        self.response_times.clear();
        self.load_times.clear();
        self.session_start = Utc::now();
    }

    fn load_history(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!(
                    "{}",
                    t!("metrics.load_failed", path = path.display(), error = e).yellow()
                );
                return;
            }
        };
        let snapshot: MetricsSnapshot = match serde_json::from_str(&content) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                eprintln!(
                    "{}",
                    t!("metrics.load_failed", path = path.display(), error = e).yellow()
                );
                return;
            }
        };

        self.session_start = snapshot.session_start;
        self.metrics = snapshot.metrics;
        self.crash_events = snapshot.crash_events;
        self.response_times = snapshot.response_times;
        self.load_times = snapshot.load_times;
        // The snapshot map carries no insertion order; reloaded names get
        // an arbitrary but fixed first-seen order.
        self.seen_order = snapshot.test_results.keys().cloned().collect();
        self.test_results = snapshot.test_results;
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// A sequence is mixed when it contains both a pass and a fail.
fn is_mixed(seq: &[bool]) -> bool {
    seq.iter().any(|p| *p) && seq.iter().any(|p| !*p)
}
