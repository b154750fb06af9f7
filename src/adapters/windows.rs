//! # Windows App Adapter Module / Windows 应用适配器模块
//!
//! Drives desktop applications: launches the executable with configured
//! arguments and watches process liveness during tests.
//!
//! 驱动桌面应用：以配置的参数启动可执行文件，并在测试期间监视进程存活。

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::process::{Child, Command};

use crate::adapters::{reserve_screenshot_path, str_param, str_value, u64_option};
use crate::core::adapter::{
    Adapter, ConfigMap, ProbeMetrics, TargetKind, TestResult, TestStatus, attach_probe_metrics,
};
use crate::infra::process::{launch_detached, shutdown_child, wait_ready};

/// Adapter for Windows desktop applications.
pub struct WindowsAppAdapter {
    name: String,
    connected: bool,
    config: ConfigMap,
    process: Option<Child>,
    logs: Vec<String>,
    staging: Option<TempDir>,
}

impl WindowsAppAdapter {
    pub const KIND: TargetKind = TargetKind::WindowsApp;

    pub fn new() -> Self {
        Self {
            name: "WindowsAppAdapter".to_string(),
            connected: false,
            config: ConfigMap::new(),
            process: None,
            logs: Vec::new(),
            staging: None,
        }
    }

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
                    "application exited during test ({})",
                    status
                )));
            }
        }

        Ok(None)
    }
}

impl Default for WindowsAppAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for WindowsAppAdapter {
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
                .push(format!("Application not found: {}", target));
            return false;
        }
        if !path.is_file() {
            self.logs.push(format!("Target is not a file: {}", target));
            return false;
        }

        let mut cmd = Command::new(target);
        cmd.kill_on_drop(true);
        if let Some(args) = str_value(&self.config, "args") {
            match shlex::split(&args) {
                Some(parts) => {
                    cmd.args(parts);
                }
                None => {
                    self.logs
                        .push(format!("Failed to parse launch arguments: {}", args));
                    return false;
                }
            }
        }

        let mut child = match launch_detached(cmd) {
            Ok(child) => child,
            Err(e) => {
                self.logs
                    .push(format!("Failed to launch application: {:#}", e));
                return false;
            }
        };

        let window = Duration::from_secs(u64_option(&self.config, "startup_secs", 2));
        if !wait_ready(&mut child, window).await {
            self.logs
                .push(format!("Application exited during startup: {}", target));
            return false;
        }

        self.process = Some(child);
        self.connected = true;
        self.logs.push(format!("Application launched: {}", target));
        true
    }

    async fn disconnect(&mut self) {
        if let Some(child) = self.process.take() {
            let grace = Duration::from_secs(u64_option(&self.config, "shutdown_grace_secs", 5));
            shutdown_child(child, grace).await;
        }
        self.connected = false;
        self.logs.push("Application closed".to_string());
    }

    async fn run_test(&mut self, test_name: &str, params: &ConfigMap) -> TestResult {
        if !self.connected {
            return TestResult::not_connected(test_name);
        }

        let start = Instant::now();
        let outcome = self.execute_scenario(test_name, params).await;
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
