//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command for the Beta Harness CLI,
//! which creates a new harness configuration file.
//!
//! 此模块实现了 Beta Harness CLI 的 `init` 命令，
//! 用于创建新的工具配置文件。

use anyhow::{Context, Result};
use colored::*;
use std::{fs, path::PathBuf};

use crate::infra::t;

const DEFAULT_CONFIG: &str = r#"# Beta Harness Configuration / Beta Harness 配置
# Documentation: https://github.com/beta-harness/beta-harness

# Language for console messages / 控制台消息的语言
language = "en"

# Directory for generated reports / 生成报告的目录
report_dir = "reports"

# Where screenshots land; a temp dir is used when unset
# 截图落盘目录；未设置时使用临时目录
# screenshot_dir = "reports/screenshots"

# Metrics snapshot, reloaded on the next session
# 指标快照，下次会话时重新加载
# storage_path = "reports/metrics.json"

# Pass-rate history for trend charts / 用于趋势图的通过率历史
# history_path = "reports/history.json"

# Targets / 目标
[[targets]]
name = "demo-game" # Display name / 显示名称
adapter = "game"   # Registry key: game, vst, web, windows / 注册表键
target = "C:/Games/demo/demo.exe" # Handed to connect / 传给 connect

[targets.config]
resolution = "1920x1080"
fullscreen = false

[[targets.tests]]
name = "boot_sequence"

[[targets.tests]]
name = "tutorial_flow"
# Per-test timeout in seconds / 单测试超时时间（秒）
timeout_secs = 120

[[targets]]
name = "web-app"
adapter = "web"
target = "https://staging.example.com"

[targets.config]
browser_command = "chromium --headless {url}"

[[targets.tests]]
name = "login_flow"

# Parallel bench matrix / 并行基准矩阵
[bench]
# {browser} and {platform} are substituted per configuration
# {browser} 和 {platform} 按配置替换
command = "curl -sf https://staging.example.com"
timeout_secs = 30

[[bench.configs]]
browser = "chrome"
platform = "linux"

[[bench.configs]]
browser = "firefox"
platform = "linux"
"#;

/// Executes the init command with the provided arguments.
///
/// # Arguments
/// * `output` - Path for the new configuration file
/// * `force` - Whether to overwrite an existing file
///
/// # Returns
/// A Result indicating success or failure of the command execution
pub async fn execute(output: PathBuf, force: bool) -> Result<()> {
    // Check if file already exists
    if output.exists() && !force {
        println!("{}", t!("init.file_exists", path = output.display()).red());
        println!("{}", t!("init.use_force").yellow());
        return Ok(());
    }

    // Create parent directories if needed
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                t!("init.create_parent_dir_failed", path = parent.display()).to_string()
            })?;
        }
    }

    // Write the default configuration to the output file
    fs::write(&output, DEFAULT_CONFIG)
        .with_context(|| t!("init.write_failed", path = output.display()).to_string())?;

    println!("{}", t!("init.success", path = output.display()).green());
    println!("{}", t!("init.next_steps"));

    Ok(())
}
