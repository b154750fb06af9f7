//! # Harness Configuration Module / 工具配置模块
//!
//! The TOML configuration model: global session settings, the list of
//! targets to drive (each with its adapter name, connect target,
//! adapter options and test entries), and the optional bench matrix
//! section.
//!
//! TOML 配置模型：全局会话设置、要驱动的目标列表
//! （各自带有适配器名称、连接目标、适配器选项和测试条目），
//! 以及可选的基准矩阵节。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::adapter::ConfigMap;
use crate::core::bench::BenchConfig;
use crate::infra::t;

/// A single named test to run against a target.
/// 针对目标运行的单个命名测试。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestEntry {
    /// The test name, used for identification in metrics and reports.
    /// 测试名称，用于在指标和报告中识别。
    pub name: String,
    /// Free-form parameters handed to the adapter's `run_test`.
    /// 传给适配器 `run_test` 的自由形式参数。
    #[serde(default)]
    pub params: ConfigMap,
    /// Optional per-test timeout in seconds.
    /// 可选的单测试超时时间（秒）。
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// One target system to exercise in a session.
/// 会话中要驱动的一个目标系统。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetEntry {
    /// Display name for the target.
    pub name: String,
    /// Registry key of the adapter to construct (e.g. "game", "web").
    /// 要构造的适配器的注册表键（例如 "game"、"web"）。
    pub adapter: String,
    /// Path or URL handed to `connect`.
    /// 传给 `connect` 的路径或 URL。
    pub target: String,
    /// Adapter configuration, merged via `configure` before connecting.
    /// 适配器配置，连接前通过 `configure` 合并。
    #[serde(default)]
    pub config: ConfigMap,
    /// Tests to run once connected.
    /// 连接后要运行的测试。
    #[serde(default)]
    pub tests: Vec<TestEntry>,
}

/// The parallel bench matrix section.
/// 并行基准矩阵节。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchSection {
    /// Probe command template; `{browser}` and `{platform}` are
    /// substituted per configuration.
    /// 探针命令模板；`{browser}` 与 `{platform}` 按配置替换。
    #[serde(default)]
    pub command: Option<String>,
    /// Worker-pool size override.
    #[serde(default)]
    pub jobs: Option<usize>,
    /// Per-probe timeout in seconds.
    #[serde(default = "default_bench_timeout")]
    pub timeout_secs: u64,
    /// The matrix; the built-in default matrix applies when empty.
    /// 矩阵；为空时使用内置默认矩阵。
    #[serde(default)]
    pub configs: Vec<BenchConfig>,
}

/// The entire harness configuration, loaded from a TOML file.
/// 从 TOML 文件加载的整个工具配置。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// The language for console messages (e.g. "en", "zh-CN").
    /// 控制台消息的语言（例如 "en"、"zh-CN"）。
    #[serde(default = "default_language")]
    pub language: String,
    /// Directory for generated reports.
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
    /// Directory for screenshots; adapters stage under a temporary
    /// directory when unset.
    /// 截图目录；未设置时适配器使用临时目录暂存。
    #[serde(default)]
    pub screenshot_dir: Option<PathBuf>,
    /// Metrics snapshot path; metrics stay in-memory when unset.
    /// 指标快照路径；未设置时指标仅存于内存。
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    /// Trend history path; trends are skipped when unset.
    /// 趋势历史路径；未设置时跳过趋势。
    #[serde(default)]
    pub history_path: Option<PathBuf>,
    #[serde(default)]
    pub targets: Vec<TargetEntry>,
    #[serde(default)]
    pub bench: Option<BenchSection>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            report_dir: default_report_dir(),
            screenshot_dir: None,
            storage_path: None,
            history_path: None,
            targets: Vec::new(),
            bench: None,
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_bench_timeout() -> u64 {
    30
}

/// Loads and parses a harness configuration file.
/// 加载并解析工具配置文件。
pub fn load_config(path: &Path) -> Result<HarnessConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| t!("config.read_failed", path = path.display()).to_string())?;
    let config: HarnessConfig = toml::from_str(&content)
        .with_context(|| t!("config.parse_failed", path = path.display()).to_string())?;
    Ok(config)
}
