//! # Adapter Contract Module / 适配器契约模块
//!
//! This module defines the uniform contract every target-specific adapter
//! implements, together with the data model shared by all of them:
//! test statuses, target categories, per-test results, and the benchmark
//! metrics snapshot.
//!
//! 此模块定义了每个目标专用适配器都要实现的统一契约，
//! 以及它们共享的数据模型：测试状态、目标类别、单次测试结果和基准指标快照。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration and parameter maps are free-form key/value stores.
/// Unknown and partial keys are tolerated everywhere; nothing validates
/// them eagerly.
///
/// 配置和参数映射是自由形式的键值存储。
/// 所有地方都容忍未知和部分键；没有任何地方会急切地验证它们。
pub type ConfigMap = HashMap<String, Value>;

/// Status of a single test execution.
/// `Failed` means the target behaved incorrectly; `Error` means the
/// harness itself could not complete the run. Keeping the two apart is
/// what lets reports separate product defects from infrastructure
/// problems.
///
/// 单次测试执行的状态。
/// `Failed` 表示目标行为不正确；`Error` 表示工具链自身无法完成运行。
/// 区分两者使报告能够将产品缺陷与基础设施问题分开。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
    Error,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Skipped => "skipped",
            TestStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Categories of target software an adapter can drive.
/// 适配器可以驱动的目标软件类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    VideoGame,
    VstPlugin,
    Daw,
    WebApp,
    WindowsApp,
    Fintech,
    Biotech,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TargetKind::VideoGame => "video_game",
            TargetKind::VstPlugin => "vst_plugin",
            TargetKind::Daw => "daw",
            TargetKind::WebApp => "web_app",
            TargetKind::WindowsApp => "windows_app",
            TargetKind::Fintech => "fintech",
            TargetKind::Biotech => "biotech",
        };
        write!(f, "{}", s)
    }
}

/// Result of a single test execution against one target.
/// 针对单个目标的单次测试执行结果。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// Name of the test that was run / 所运行测试的名称
    pub name: String,
    /// Outcome of the run / 运行结果
    pub status: TestStatus,
    /// Wall-clock time the run took / 运行所花费的挂钟时间
    pub duration: Duration,
    /// When the result was produced / 结果产生的时间
    pub timestamp: DateTime<Utc>,
    /// Best-effort screenshot captured during the run, if any.
    /// 运行期间尽力捕获的截图（如果有）。
    #[serde(default)]
    pub screenshot_path: Option<PathBuf>,
    /// Path to a target log file associated with the run, if any.
    /// 与运行关联的目标日志文件路径（如果有）。
    #[serde(default)]
    pub log_path: Option<PathBuf>,
    /// Failure or error message, absent for clean passes.
    /// 失败或错误消息，干净通过时为空。
    #[serde(default)]
    pub error_message: Option<String>,
    /// Free-form metadata attached by the adapter (metrics snapshot etc).
    /// 适配器附加的自由格式元数据（指标快照等）。
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl TestResult {
    /// Creates a result with the given status and duration.
    /// 创建具有给定状态和持续时间的结果。
    pub fn new(name: impl Into<String>, status: TestStatus, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status,
            duration,
            timestamp: Utc::now(),
            screenshot_path: None,
            log_path: None,
            error_message: None,
            metadata: HashMap::new(),
        }
    }

    /// Creates an `Error` result carrying a message, with zero duration.
    /// 创建携带消息的 `Error` 结果，持续时间为零。
    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        let mut result = Self::new(name, TestStatus::Error, Duration::ZERO);
        result.error_message = Some(message.into());
        result
    }

    /// The rejection result every adapter returns when `run_test` is
    /// called while disconnected. No external call is attempted.
    ///
    /// 每个适配器在断开连接状态下调用 `run_test` 时返回的拒绝结果。
    /// 不会尝试任何外部调用。
    pub fn not_connected(name: impl Into<String>) -> Self {
        Self::error(name, "not connected")
    }

    /// Whether the run ended with a clean pass.
    pub fn is_pass(&self) -> bool {
        self.status == TestStatus::Passed
    }

    /// Whether the run ended in any non-pass, non-skip state.
    pub fn is_problem(&self) -> bool {
        matches!(self.status, TestStatus::Failed | TestStatus::Error)
    }
}

/// Point-in-time benchmark metrics snapshot collected from a target.
/// `collect_metrics` always succeeds; fields the adapter cannot observe
/// keep their defaults.
///
/// 从目标收集的时间点基准指标快照。
/// `collect_metrics` 总是成功；适配器无法观测的字段保持默认值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeMetrics {
    pub load_time: f64,
    pub memory_usage_mb: f64,
    pub cpu_usage_percent: f64,
    pub crash_count: u32,
    pub fps_average: f64,
    pub response_time_ms: f64,
    pub ui_stability_score: f64,
    #[serde(default)]
    pub custom_metrics: HashMap<String, f64>,
}

impl Default for ProbeMetrics {
    fn default() -> Self {
        Self {
            load_time: 0.0,
            memory_usage_mb: 0.0,
            cpu_usage_percent: 0.0,
            crash_count: 0,
            fps_average: 0.0,
            response_time_ms: 0.0,
            // A target we know nothing about has not yet misbehaved.
            ui_stability_score: 100.0,
            custom_metrics: HashMap::new(),
        }
    }
}

/// The uniform contract every target-specific adapter implements.
///
/// An adapter is in exactly one connection state at a time. `connect`
/// moves Disconnected to Connected on success and stays Disconnected
/// (with a log entry) on failure; `disconnect` is idempotent; `run_test`
/// is a self-loop on Connected and a no-op rejection on Disconnected.
/// None of the operations panic or return errors: every failure is
/// communicated through the return value.
///
/// 每个目标专用适配器都要实现的统一契约。
///
/// 适配器在任一时刻都处于恰好一个连接状态。`connect` 成功时从
/// Disconnected 转移到 Connected，失败时保持 Disconnected（并记录日志）；
/// `disconnect` 是幂等的；`run_test` 在 Connected 上是自环，
/// 在 Disconnected 上是空操作拒绝。所有操作都不会 panic 或返回错误：
/// 每种失败都通过返回值传达。
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Human-readable adapter identity.
    fn name(&self) -> &str;

    /// The target-software category this adapter drives.
    fn kind(&self) -> TargetKind;

    /// Current connection state.
    fn is_connected(&self) -> bool;

    /// Merges options into the adapter's configuration store.
    /// Unknown keys are kept verbatim; nothing is validated here.
    ///
    /// 将选项合并到适配器的配置存储中。
    /// 未知键原样保留；此处不做任何验证。
    fn configure(&mut self, options: ConfigMap);

    /// Attempts to establish a session with the target (launch a
    /// process, open a page, attach to a host). Returns `true` and
    /// transitions to Connected on success; on any recoverable failure
    /// (missing file, missing dependency, launch error) returns `false`
    /// and appends a descriptive log entry.
    ///
    /// 尝试与目标建立会话（启动进程、打开页面、附加到宿主）。
    /// 成功时返回 `true` 并转移到 Connected；任何可恢复的失败
    /// （文件缺失、依赖缺失、启动错误）返回 `false` 并追加描述性日志。
    async fn connect(&mut self, target: &str) -> bool;

    /// Releases external resources and flips the state to Disconnected.
    /// Safe to call when already disconnected.
    ///
    /// 释放外部资源并将状态切换为 Disconnected。已断开时调用也是安全的。
    async fn disconnect(&mut self);

    /// Runs a single named test. Requires Connected; when disconnected
    /// the returned result has status `Error`, duration zero and the
    /// message "not connected". Internal faults become `Error` results
    /// carrying the captured message; a target-behavior assertion
    /// failure yields `Failed`; only a clean run yields `Passed`.
    /// Screenshot capture and a metrics snapshot are attempted
    /// best-effort regardless of the outcome.
    ///
    /// 运行单个命名测试。要求处于 Connected 状态；断开时返回的结果
    /// 状态为 `Error`、持续时间为零、消息为 "not connected"。
    /// 内部故障变为携带捕获消息的 `Error` 结果；目标行为断言失败产生
    /// `Failed`；只有干净的运行才产生 `Passed`。
    /// 无论结果如何都会尽力尝试截图和指标快照。
    async fn run_test(&mut self, test_name: &str, params: &ConfigMap) -> TestResult;

    /// Best-effort screenshot capture. Returns `None` and logs on
    /// failure.
    ///
    /// 尽力而为的截图捕获。失败时返回 `None` 并记录日志。
    async fn capture_screenshot(&mut self, file_name: &str) -> Option<PathBuf>;

    /// Collects the current metrics snapshot. Always succeeds, with
    /// default values when telemetry is unavailable.
    ///
    /// 收集当前指标快照。总是成功，遥测不可用时返回默认值。
    async fn collect_metrics(&mut self) -> ProbeMetrics;

    /// The pollable log entries accumulated by this adapter.
    /// 此适配器累积的可轮询日志条目。
    fn logs(&self) -> &[String];
}

/// Folds a metrics snapshot into a result's metadata map so every
/// result carries the telemetry observed at completion time.
///
/// 将指标快照折叠进结果的元数据映射，
/// 使每个结果都携带完成时观测到的遥测数据。
pub fn attach_probe_metrics(result: &mut TestResult, metrics: &ProbeMetrics) {
    let entries = [
        ("load_time", metrics.load_time),
        ("memory_usage_mb", metrics.memory_usage_mb),
        ("cpu_usage_percent", metrics.cpu_usage_percent),
        ("fps_average", metrics.fps_average),
        ("response_time_ms", metrics.response_time_ms),
        ("ui_stability_score", metrics.ui_stability_score),
    ];
    for (key, value) in entries {
        result
            .metadata
            .insert(key.to_string(), Value::from(value));
    }
    result
        .metadata
        .insert("crash_count".to_string(), Value::from(metrics.crash_count));
}
