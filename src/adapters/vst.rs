//! # VST Adapter Module / VST 适配器模块
//!
//! Drives audio-plugin targets. The plugin file itself cannot be
//! launched; when a host command is configured the plugin is loaded
//! into that host process, otherwise the adapter attaches to the plugin
//! file in validate-only mode.
//!
//! 驱动音频插件目标。插件文件本身无法启动；
//! 配置了宿主命令时将插件加载进该宿主进程，
//! 否则适配器以仅校验模式附加到插件文件。

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

const PLUGIN_EXTENSIONS: [&str; 5] = ["vst3", "dll", "so", "component", "clap"];

/// Adapter for VST/audio plugins, optionally hosted.
///
/// Config options / 配置选项:
/// - `host_command`: command line of the plugin host; the plugin path
///   is appended as its last argument
/// - `startup_secs`: readiness window for the host (default 2)
/// - `preset`: default preset file tests should load
/// - `screenshot_dir`: where captures land
pub struct VstAdapter {
    name: String,
    connected: bool,
    config: ConfigMap,
    host: Option<Child>,
    logs: Vec<String>,
    staging: Option<TempDir>,
}

impl VstAdapter {
    pub const KIND: TargetKind = TargetKind::VstPlugin;

    pub fn new() -> Self {
        Self {
            name: "VstAdapter".to_string(),
            connected: false,
            config: ConfigMap::new(),
            host: None,
            logs: Vec::new(),
            staging: None,
        }
    }

    async fn execute_scenario(
        &mut self,
        test_name: &str,
        params: &ConfigMap,
    ) -> anyhow::Result<Option<String>> {
        if let Some(preset) = str_param(params, &self.config, "preset")? {
            if !Path::new(&preset).exists() {
                self.logs.push(format!("Preset not found: {}", preset));
                return Ok(Some(format!("preset not found: {}", preset)));
            }
            self.logs
                .push(format!("Preset for {}: {}", test_name, preset));
        }

        if let Some(host) = self.host.as_mut() {
            if let Ok(Some(status)) = host.try_wait() {
                return Ok(Some(format!("host process exited during test ({})", status)));
            }
        }

        Ok(None)
    }
}

impl Default for VstAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for VstAdapter {
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
            self.logs.push(format!("Plugin not found: {}", target));
            return false;
        }
        if !path.is_file() {
            self.logs.push(format!("Target is not a file: {}", target));
            return false;
        }

        // Unexpected extensions are logged but tolerated; plenty of
        // plugin bundles use nonstandard names.
        // 意外的扩展名会被记录但被容忍；很多插件包使用非标准名称。
        let known = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| PLUGIN_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if !known {
            self.logs
                .push(format!("Unrecognized plugin extension: {}", target));
        }

        match str_value(&self.config, "host_command") {
            Some(host_command) => {
                let mut cmd = match build_command(&host_command, None) {
                    Ok(cmd) => cmd,
                    Err(e) => {
                        self.logs.push(format!("Invalid host command: {:#}", e));
                        return false;
                    }
                };
                cmd.arg(target);
                let mut child = match launch_detached(cmd) {
                    Ok(child) => child,
                    Err(e) => {
                        self.logs.push(format!("Failed to launch host: {:#}", e));
                        return false;
                    }
                };
                let window = Duration::from_secs(u64_option(&self.config, "startup_secs", 2));
                if !wait_ready(&mut child, window).await {
                    self.logs
                        .push(format!("Host exited during startup: {}", host_command));
                    return false;
                }
                self.host = Some(child);
                self.logs
                    .push(format!("Plugin loaded into host: {}", target));
            }
            None => {
                self.logs.push(format!(
                    "No host configured; attached to plugin file: {}",
                    target
                ));
            }
        }

        self.connected = true;
        true
    }

    async fn disconnect(&mut self) {
        if let Some(host) = self.host.take() {
            let grace = Duration::from_secs(u64_option(&self.config, "shutdown_grace_secs", 5));
            shutdown_child(host, grace).await;
        }
        self.connected = false;
        self.logs.push("Plugin disconnected".to_string());
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
        let hosted = match self.host.as_mut() {
            Some(host) => matches!(host.try_wait(), Ok(None)),
            None => false,
        };
        metrics
            .custom_metrics
            .insert("host_running".to_string(), if hosted { 1.0 } else { 0.0 });
        metrics
    }

    fn logs(&self) -> &[String] {
        &self.logs
    }
}
