//! # Bench Command Module / 基准命令模块
//!
//! This module implements the `bench` command: it runs the configured
//! probe command across the browser/platform matrix through the bounded
//! worker pool and prints the aggregated summary.
//!
//! 此模块实现 `bench` 命令：通过有界工作池在浏览器/平台矩阵上运行
//! 配置的探针命令，并打印聚合摘要。

use anyhow::{Context, Result};
use colored::*;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::{
    cli::commands::{setup_and_parse_config, setup_signal_handler},
    core::bench::{BenchConfig, BenchProbe, DEFAULT_MATRIX, run_matrix},
    infra::{
        self,
        process::{build_command, spawn_and_capture},
        t,
    },
    reporting::console::print_bench_summary,
};

/// Executes the bench command with the provided arguments.
///
/// # Arguments
/// * `config` - Path to the harness configuration file
/// * `jobs` - Worker-pool size override
/// * `timeout` - Per-probe timeout override in seconds
pub async fn execute(config: PathBuf, jobs: Option<usize>, timeout: Option<u64>) -> Result<()> {
    let (config, _config_path) = setup_and_parse_config(&config)?;
    let locale = config.language.clone();
    rust_i18n::set_locale(&locale);

    let Some(section) = &config.bench else {
        anyhow::bail!(t!("bench.not_configured", locale = locale).to_string());
    };
    let Some(command) = section.command.clone() else {
        anyhow::bail!(t!("bench.no_command", locale = locale).to_string());
    };

    let configs = if section.configs.is_empty() {
        DEFAULT_MATRIX.clone()
    } else {
        section.configs.clone()
    };
    let jobs = jobs
        .or(section.jobs)
        .unwrap_or_else(|| num_cpus::get() / 2 + 1);
    let per_probe_timeout = Duration::from_secs(timeout.unwrap_or(section.timeout_secs));

    println!(
        "{}",
        t!(
            "bench.running",
            locale = locale,
            count = configs.len(),
            jobs = jobs
        )
        .bold()
    );

    let stop = setup_signal_handler(&locale)?;
    let summary = run_matrix(configs, jobs, per_probe_timeout, stop, |probe_config| {
        let command = command.clone();
        async move { probe_command(&command, &probe_config).await }
    })
    .await;

    print_bench_summary(&summary, &locale);

    infra::fs::ensure_dir(&config.report_dir)?;
    let report_path = config.report_dir.join("bench.json");
    std::fs::write(&report_path, serde_json::to_string_pretty(&summary)?)?;
    println!(
        "{}",
        t!(
            "bench.report_saved",
            locale = locale,
            path = report_path.display()
        )
    );

    if summary.failed_probes > 0 {
        anyhow::bail!(
            t!(
                "bench.failed",
                locale = locale,
                count = summary.failed_probes
            )
            .to_string()
        );
    }
    println!("\n{}", t!("bench.passed", locale = locale).green().bold());
    Ok(())
}

/// One isolated probe: the command template with `{browser}` and
/// `{platform}` substituted, spawned with captured output. The elapsed
/// wall-clock is the observed load time. A non-zero exit becomes an
/// error carrying the output tail.
///
/// 单个隔离探针：替换了 `{browser}` 与 `{platform}` 的命令模板，
/// 以捕获输出的方式派生。经过的挂钟时间即观测到的加载时间。
/// 非零退出变为携带输出尾部的错误。
async fn probe_command(template: &str, config: &BenchConfig) -> anyhow::Result<BenchProbe> {
    let command_line = template
        .replace("{browser}", &config.browser)
        .replace("{platform}", &config.platform);
    let cmd = build_command(&command_line, None)?;

    let start = Instant::now();
    let (status_res, output) = spawn_and_capture(cmd).await;
    let status = status_res.context("Failed to get probe process status")?;
    let load_time_ms = start.elapsed().as_secs_f64() * 1000.0;

    if status.success() {
        Ok(BenchProbe {
            load_time_ms,
            node_id: format!("local-{}-{}", config.browser, config.platform),
            screenshot_path: None,
            custom_metrics: HashMap::new(),
        })
    } else {
        let tail: Vec<&str> = output.lines().rev().take(5).collect();
        let tail: Vec<&str> = tail.into_iter().rev().collect();
        Err(anyhow::anyhow!(
            "probe command failed ({}): {}",
            status,
            tail.join(" | ")
        ))
    }
}
