//! # Trend Store Module / 趋势存储模块
//!
//! A thin JSON-backed history of session summaries, consumed for
//! historical charting. Not part of the aggregation core: it only
//! appends what the report generator produced and exposes the pass-rate
//! series back out.
//!
//! 以 JSON 为后端的会话摘要薄历史，供历史图表消费。
//! 不属于聚合核心：它只追加报告生成器产出的内容，并对外暴露通过率序列。

use chrono::{DateTime, Utc};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::report::ReportSummary;
use crate::infra::t;

/// One persisted session record.
/// 一条持久化的会话记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub generated: DateTime<Utc>,
    pub summary: ReportSummary,
}

/// Append-only history of run summaries at a fixed path.
/// 固定路径上只追加的运行摘要历史。
pub struct TrendStore {
    path: PathBuf,
    runs: Vec<RunRecord>,
}

impl TrendStore {
    /// Opens the store, loading any existing history. A missing or
    /// corrupt file degrades to an empty history.
    ///
    /// 打开存储并加载既有历史。文件缺失或损坏退化为空历史。
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let runs = load_run_records(&path);
        Self { path, runs }
    }

    /// Appends a session summary stamped with the current time.
    /// 追加一条带当前时间戳的会话摘要。
    pub fn append(&mut self, summary: ReportSummary) {
        self.runs.push(RunRecord {
            generated: Utc::now(),
            summary,
        });
    }

    /// Persists the full history back to the store path.
    /// 将完整历史持久化回存储路径。
    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.runs)?)?;
        Ok(())
    }

    /// Pass rates of all recorded runs, oldest first.
    /// 所有记录运行的通过率，最早在前。
    pub fn pass_rate_series(&self) -> Vec<f64> {
        self.runs
            .iter()
            .map(|r| r.summary.statistics.pass_rate)
            .collect()
    }

    /// Mean pass rate over the history, zero when empty.
    /// 历史通过率均值，为空时为零。
    pub fn average_pass_rate(&self) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        self.pass_rate_series().iter().sum::<f64>() / self.runs.len() as f64
    }

    pub fn runs(&self) -> &[RunRecord] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Reads run records from a JSON history file. Missing or corrupt
/// storage degrades to an empty list, with a warning for the corrupt
/// case. Persistence problems are never fatal.
///
/// 从 JSON 历史文件读取运行记录。存储缺失或损坏退化为空列表，
/// 损坏时给出警告；持久化问题绝不致命。
pub fn load_run_records(path: &Path) -> Vec<RunRecord> {
    if !path.exists() {
        return Vec::new();
    }
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(runs) => runs,
            Err(e) => {
                eprintln!(
                    "{}",
                    t!("trend.load_failed", path = path.display(), error = e).yellow()
                );
                Vec::new()
            }
        },
        Err(e) => {
            eprintln!(
                "{}",
                t!("trend.load_failed", path = path.display(), error = e).yellow()
            );
            Vec::new()
        }
    }
}
