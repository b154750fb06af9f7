//! # Web Adapter Module / Web 适配器模块
//!
//! Drives web applications through a configured browser command. The
//! time from browser launch to readiness is observed as the page load
//! time and reported in the metrics snapshot.
//!
//! 通过配置的浏览器命令驱动 Web 应用。
//! 从浏览器启动到就绪的时间被观测为页面加载时间，并在指标快照中报告。

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::process::Child;

use crate::adapters::{reserve_screenshot_path, str_param, str_value, u64_option};
use crate::core::adapter::{
    Adapter, ConfigMap, ProbeMetrics, TargetKind, TestResult, TestStatus, attach_probe_metrics,
};
use crate::infra::process::{build_command, launch_detached, shutdown_child, wait_ready};

/// Adapter for web applications.
///
/// Config options / 配置选项:
/// - `browser_command`: browser command line; `{url}` is substituted,
///   otherwise the URL is appended as the last argument
/// - `ready_secs`: readiness window after launch (default 3)
/// - `scenario_script`: default scenario script for tests
/// - `screenshot_dir`: where captures land
pub struct WebAdapter {
    name: String,
    connected: bool,
    config: ConfigMap,
    browser: Option<Child>,
    logs: Vec<String>,
    staging: Option<TempDir>,
    current_url: String,
    last_load_time_ms: f64,
}

impl WebAdapter {
    pub const KIND: TargetKind = TargetKind::WebApp;

    pub fn new() -> Self {
        Self {
            name: "WebAdapter".to_string(),
            connected: false,
            config: ConfigMap::new(),
            browser: None,
            logs: Vec::new(),
            staging: None,
            current_url: String::new(),
            last_load_time_ms: 0.0,
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

        if let Some(browser) = self.browser.as_mut() {
            if let Ok(Some(status)) = browser.try_wait() {
                return Ok(Some(format!(
                    "browser process exited during test ({})",
                    status
                )));
            }
        }

        Ok(None)
    }
}

impl Default for WebAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for WebAdapter {
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
        if !target.starts_with("http://") && !target.starts_with("https://") {
            self.logs.push(format!(
                "Invalid web target (expected http(s) URL): {}",
                target
            ));
            return false;
        }

        let Some(browser_command) = str_value(&self.config, "browser_command") else {
            // Missing dependency, not a hard error: the session simply
            // cannot be established.
            // 依赖缺失而非硬错误：会话只是无法建立。
            self.logs.push(format!(
                "No browser command configured; cannot open {}",
                target
            ));
            return false;
        };

        let command_line = if browser_command.contains("{url}") {
            browser_command.replace("{url}", target)
        } else {
            format!("{} {}", browser_command, target)
        };

        let cmd = match build_command(&command_line, None) {
            Ok(cmd) => cmd,
            Err(e) => {
                self.logs.push(format!("Invalid browser command: {:#}", e));
                return false;
            }
        };

        let launch_start = Instant::now();
        let mut child = match launch_detached(cmd) {
            Ok(child) => child,
            Err(e) => {
                self.logs.push(format!("Failed to launch browser: {:#}", e));
                return false;
            }
        };

        let window = Duration::from_secs(u64_option(&self.config, "ready_secs", 3));
        if !wait_ready(&mut child, window).await {
            self.logs
                .push(format!("Browser exited during startup: {}", command_line));
            return false;
        }

        self.last_load_time_ms = launch_start.elapsed().as_secs_f64() * 1000.0;
        self.browser = Some(child);
        self.current_url = target.to_string();
        self.connected = true;
        self.logs.push(format!("Browser opened: {}", target));
        true
    }

    async fn disconnect(&mut self) {
        if let Some(browser) = self.browser.take() {
            let grace = Duration::from_secs(u64_option(&self.config, "shutdown_grace_secs", 3));
            shutdown_child(browser, grace).await;
        }
        self.connected = false;
        self.current_url.clear();
        self.logs.push("Browser closed".to_string());
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
        let mut metrics = ProbeMetrics {
            load_time: self.last_load_time_ms,
            ..ProbeMetrics::default()
        };
        let alive = match self.browser.as_mut() {
            Some(browser) => matches!(browser.try_wait(), Ok(None)),
            None => false,
        };
        metrics
            .custom_metrics
            .insert("browser_alive".to_string(), if alive { 1.0 } else { 0.0 });
        metrics
    }

    fn logs(&self) -> &[String] {
        &self.logs
    }
}
