//! # Report Command Module / 报告命令模块
//!
//! This module implements the `report` command, which prints historical
//! pass-rate trends from the trend store.
//!
//! 此模块实现 `report` 命令，打印趋势存储中的历史通过率趋势。

use anyhow::Result;
use std::path::PathBuf;

use crate::{
    cli::commands::setup_and_parse_config, core::trend::TrendStore,
    reporting::console::print_trends,
};

/// Executes the report command: opens the trend history configured for
/// the session (falling back to `<report_dir>/history.json`) and prints
/// the pass-rate trend.
///
/// 执行 report 命令：打开会话配置的趋势历史
/// （回退到 `<report_dir>/history.json`）并打印通过率趋势。
pub async fn execute(config: PathBuf) -> Result<()> {
    let (config, _config_path) = setup_and_parse_config(&config)?;
    let locale = config.language.clone();
    rust_i18n::set_locale(&locale);

    let history = config
        .history_path
        .clone()
        .unwrap_or_else(|| config.report_dir.join("history.json"));
    let store = TrendStore::open(history);
    print_trends(&store, &locale);
    Ok(())
}
