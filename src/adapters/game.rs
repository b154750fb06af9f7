//! # Game Adapter Module / 游戏适配器模块
//!
//! Drives video-game builds: launches the game executable with
//! resolution and windowing arguments, waits out a bounded startup
//! window, and watches process liveness during tests.
//!
//! 驱动电子游戏构建：以分辨率和窗口化参数启动游戏可执行文件，
//! 等待有界的启动窗口，并在测试期间监视进程存活状态。

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::process::{Child, Command};

use crate::adapters::{bool_option, reserve_screenshot_path, str_param, str_value, u64_option};
use crate::core::adapter::{
    Adapter, ConfigMap, ProbeMetrics, TargetKind, TestResult, TestStatus, attach_probe_metrics,
};
use crate::infra::process::{launch_detached, shutdown_child, wait_ready};

/// Adapter for video-game builds.
///
/// Config options / 配置选项:
/// - `resolution`: "WxH" string, passed as `-screen-width`/`-screen-height`
/// - `fullscreen`: `false` adds `-windowed`
/// - `startup_secs`: bounded readiness window after launch (default 2)
/// - `shutdown_grace_secs`: grace window before the hard kill (default 5)
/// - `scenario_script`: default scenario script for tests
/// - `screenshot_dir`: where captures land
pub struct GameAdapter {
    name: String,
    connected: bool,
    config: ConfigMap,
    process: Option<Child>,
    logs: Vec<String>,
    staging: Option<TempDir>,
}

impl GameAdapter {
    pub const KIND: TargetKind = TargetKind::VideoGame;

    pub fn new() -> Self {
        Self {
            name: "GameAdapter".to_string(),
            connected: false,
            config: ConfigMap::new(),
            process: None,
            logs: Vec::new(),
            staging: None,
        }
    }

    /// Runs the target-behavior checks for one test. `Ok(None)` is a
    /// clean pass, `Ok(Some(reason))` an assertion failure, `Err` an
    /// internal fault.
    ///
    /// 运行单个测试的目标行为检查。`Ok(None)` 为干净通过，
    /// `Ok(Some(reason))` 为断言失败，`Err` 为内部故障。
    async fn execute_scenario(
        &mut self,
        test_name: &str,
        params: &ConfigMap,
    ) -> anyhow::Result<Option<String>> {
        if let Some(script) = str_param(params, &self.config, "scenario_script")? {
            if !Path::new(&script).exists() {
                self.logs
                    .push(format!("Scenario script not found: {}", script));
                return Ok(Some(format!("scenario script not found: {}", script)));
            }
            self.logs
                .push(format!("Scenario script for {}: {}", test_name, script));
        }

        if let Some(child) = self.process.as_mut() {
            if let Ok(Some(status)) = child.try_wait() {
                return Ok(Some(format!(
                    "target process exited during test ({})",
                    status
                )));
            }
        }

        Ok(None)
    }
}

impl Default for GameAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for GameAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TargetKind {
        Self::KIND
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn configure(&mut self, options: ConfigMap) {
        self.config.extend(options);
    }

    async fn connect(&mut self, target: &str) -> bool {
        let path = Path::new(target);
        if !path.exists() {
            self.logs
                .push(format!("Game executable not found: {}", target));
            return false;
        }
        if !path.is_file() {
            self.logs.push(format!("Target is not a file: {}", target));
            return false;
        }

        let mut cmd = Command::new(target);
        cmd.kill_on_drop(true);
        // Only known-safe launch arguments are derived from the config.
        // 只从配置推导已知安全的启动参数。
        if let Some(resolution) = str_value(&self.config, "resolution") {
            let parts: Vec<&str> = resolution.split('x').collect();
            if parts.len() == 2
                && parts[0].chars().all(|c| c.is_ascii_digit())
                && parts[1].chars().all(|c| c.is_ascii_digit())
            {
                cmd.args(["-screen-width", parts[0], "-screen-height", parts[1]]);
            }
        }
        if !bool_option(&self.config, "fullscreen", true) {
            cmd.arg("-windowed");
        }

        let mut child = match launch_detached(cmd) {
            Ok(child) => child,
            Err(e) => {
                self.logs.push(format!("Failed to launch game: {:#}", e));
                return false;
            }
        };

        let window = Duration::from_secs(u64_option(&self.config, "startup_secs", 2));
        if !wait_ready(&mut child, window).await {
            self.logs
                .push(format!("Game exited during startup: {}", target));
            return false;
        }

        self.process = Some(child);
        self.connected = true;
        self.logs.push(format!("Game launched: {}", target));
        true
    }

    async fn disconnect(&mut self) {
        if let Some(child) = self.process.take() {
            let grace = Duration::from_secs(u64_option(&self.config, "shutdown_grace_secs", 5));
            shutdown_child(child, grace).await;
        }
        self.connected = false;
        self.logs.push("Game disconnected".to_string());
    }

    async fn run_test(&mut self, test_name: &str, params: &ConfigMap) -> TestResult {
        if !self.connected {
            return TestResult::not_connected(test_name);
        }

        let start = Instant::now();
        let outcome = self.execute_scenario(test_name, params).await;

        // Metrics and a screenshot ride along regardless of the outcome.
        // 无论结果如何，指标和截图都会随结果一并返回。
        let metrics = self.collect_metrics().await;
        let shot_name = format!("{}_{}", test_name, Utc::now().timestamp());
        let screenshot = self.capture_screenshot(&shot_name).await;

        let (status, message) = match outcome {
            Ok(None) => (TestStatus::Passed, None),
            Ok(Some(reason)) => (TestStatus::Failed, Some(reason)),
            Err(e) => (TestStatus::Error, Some(format!("{:#}", e))),
        };

        let mut result = TestResult::new(test_name, status, start.elapsed());
        result.error_message = message;
        result.screenshot_path = screenshot;
        attach_probe_metrics(&mut result, &metrics);
        self.logs
            .push(format!("Test {} finished: {}", test_name, result.status));
        result
    }

    async fn capture_screenshot(&mut self, file_name: &str) -> Option<PathBuf> {
        reserve_screenshot_path(&self.config, &mut self.staging, &mut self.logs, file_name)
    }

    async fn collect_metrics(&mut self) -> ProbeMetrics {
        let mut metrics = ProbeMetrics::default();
        let alive = match self.process.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        };
        metrics
            .custom_metrics
            .insert("process_alive".to_string(), if alive { 1.0 } else { 0.0 });
        metrics
    }

    fn logs(&self) -> &[String] {
        &self.logs
    }
}
