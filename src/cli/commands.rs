//! # CLI Commands Module / CLI 命令模块
//!
//! The subcommand implementations plus the helpers they share: config
//! loading and the Ctrl-C cancellation token.
//!
//! 子命令实现及其共享的辅助函数：配置加载和 Ctrl-C 取消令牌。

use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::core::config::{self, HarnessConfig};
use crate::infra::t;

pub mod bench;
pub mod init;
pub mod report;
pub mod run;

/// Canonicalizes and parses the harness configuration file.
/// 规范化并解析工具配置文件。
pub(crate) fn setup_and_parse_config(config_path_arg: &Path) -> Result<(HarnessConfig, PathBuf)> {
    // For config parsing we don't have the configured locale yet; use
    // the session default.
    let config_path = fs::canonicalize(config_path_arg)
        .with_context(|| t!("config.read_failed", path = config_path_arg.display()).to_string())?;
    let config = config::load_config(&config_path)?;
    Ok((config, config_path))
}

/// Sets up a signal handler for graceful shutdown.
/// 设置用于优雅关停的信号处理器。
pub(crate) fn setup_signal_handler(locale: &str) -> Result<CancellationToken> {
    let token = CancellationToken::new();
    let token_clone = token.clone();
    let locale = locale.to_string();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("run.shutdown_signal", locale = &locale).yellow());
            token_clone.cancel();
        }
    });

    Ok(token)
}
