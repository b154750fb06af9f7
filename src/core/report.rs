//! # Report Generator Module / 报告生成器模块
//!
//! Aggregates suite and test-case records into summary statistics,
//! merges duplicate defect reports into issues by normalized title, and
//! produces the deterministic bullet-point digest consumed by the
//! rendering sinks. Historical snapshots feed simple trend statistics.
//!
//! 将套件和测试用例记录聚合为摘要统计，按规范化标题将重复缺陷报告合并为
//! 议题，并生成供渲染输出使用的确定性要点摘要。历史快照用于简单的趋势统计。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::trend::{self, RunRecord};

/// Status of a report-level test case. `Broken` marks infrastructure
/// problems, kept apart from product-defect `Failed`.
///
/// 报告级测试用例的状态。`Broken` 标记基础设施问题，
/// 与产品缺陷 `Failed` 区分开。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Passed,
    Failed,
    Skipped,
    Broken,
}

/// Issue severity. Variants are declared in rank order, so the derived
/// `Ord` sorts Critical first.
///
/// 议题严重度。变体按等级顺序声明，因此派生的 `Ord` 会把 Critical 排在最前。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        };
        write!(f, "{}", s)
    }
}

/// A single test case as recorded in a report suite.
/// 报告套件中记录的单个测试用例。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub status: CaseStatus,
    pub duration_ms: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub stack_trace: Option<String>,
}

impl TestCase {
    pub fn new(name: impl Into<String>, status: CaseStatus, duration_ms: f64) -> Self {
        Self {
            name: name.into(),
            status,
            duration_ms,
            description: String::new(),
            steps: Vec::new(),
            attachments: Vec::new(),
            labels: HashMap::new(),
            error_message: None,
            stack_trace: None,
        }
    }
}

/// An ordered collection of test cases.
/// 测试用例的有序集合。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuite {
    pub name: String,
    #[serde(default)]
    pub cases: Vec<TestCase>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

impl TestSuite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
            start_time: None,
            end_time: None,
        }
    }

    /// Appends a case to the suite.
    pub fn add_case(&mut self, case: TestCase) {
        self.cases.push(case);
    }

    /// Per-suite pass/fail statistics.
    /// 套件级的通过/失败统计。
    pub fn statistics(&self) -> SuiteStats {
        let total = self.cases.len();
        let count = |status: CaseStatus| self.cases.iter().filter(|c| c.status == status).count();
        let passed = count(CaseStatus::Passed);
        SuiteStats {
            total,
            passed,
            failed: count(CaseStatus::Failed),
            skipped: count(CaseStatus::Skipped),
            broken: count(CaseStatus::Broken),
            pass_rate: if total > 0 {
                passed as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        }
    }
}

/// Pass/fail counters with the derived pass rate.
/// 带派生通过率的通过/失败计数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SuiteStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub broken: usize,
    pub pass_rate: f64,
}

/// A deduplicated defect record aggregating one or more raw
/// observations under one title.
///
/// 在同一标题下聚合一条或多条原始观测的去重缺陷记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub occurrences: u32,
    #[serde(default)]
    pub tests: Vec<String>,
    #[serde(default)]
    pub screenshot: Option<PathBuf>,
    pub created: DateTime<Utc>,
}

/// Aggregate of all suites plus issue counts.
/// 所有套件的聚合加上议题计数。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub statistics: SuiteStats,
    pub issues: usize,
    pub critical_issues: usize,
    pub suites: usize,
}

/// Trend statistics over previously loaded historical snapshots.
/// 之前加载的历史快照上的趋势统计。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub pass_rate_trend: Vec<f64>,
    pub avg_pass_rate: f64,
    pub total_runs: usize,
}

/// Generator for session reports with issue deduplication.
///
/// Like the metrics collector, this is single-writer state: appends are
/// serialized by the orchestrator.
///
/// 带议题去重的会话报告生成器。
///
/// 与指标收集器一样，这是单写入者状态：追加操作由编排器串行化。
#[derive(Default)]
pub struct ReportGenerator {
    suites: Vec<TestSuite>,
    issues: Vec<Issue>,
    history: Vec<RunRecord>,
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a suite. Suites are never merged.
    /// 追加一个套件。套件从不合并。
    pub fn add_suite(&mut self, suite: TestSuite) {
        self.suites.push(suite);
    }

    /// Records a defect observation, merging duplicates by title.
    ///
    /// The title is normalized (lowercased, trimmed) and compared
    /// against existing issues in insertion order; equality or substring
    /// containment in either direction counts as the same issue. The
    /// first match has its occurrence counter incremented and the test
    /// name appended, and its id is returned; otherwise a new issue with
    /// occurrence 1 is created. This is a linear scan per insertion:
    /// fine at expected issue volumes, a known scaling limit beyond
    /// them.
    ///
    /// 记录一条缺陷观测，按标题合并重复项。
    ///
    /// 标题被规范化（转小写、去空白）后按插入顺序与现有议题比较；
    /// 相等或任一方向的子串包含都视为同一议题。首个匹配项的出现计数加一、
    /// 追加测试名并返回其 id；否则创建出现次数为 1 的新议题。
    /// 每次插入都是线性扫描：在预期议题数量下没有问题，
    /// 超出后是已知的扩展性限制。
    pub fn add_issue(
        &mut self,
        title: &str,
        description: &str,
        severity: Severity,
        test_name: Option<&str>,
        screenshot: Option<PathBuf>,
    ) -> String {
        for existing in &mut self.issues {
            if is_duplicate_title(title, &existing.title) {
                existing.occurrences += 1;
                if let Some(test) = test_name {
                    existing.tests.push(test.to_string());
                }
                return existing.id.clone();
            }
        }

        let id = format!("ISSUE-{}", self.issues.len() + 1);
        self.issues.push(Issue {
            id: id.clone(),
            title: title.to_string(),
            description: description.to_string(),
            severity,
            occurrences: 1,
            tests: test_name.map(|t| vec![t.to_string()]).unwrap_or_default(),
            screenshot,
            created: Utc::now(),
        });
        id
    }

    pub fn suites(&self) -> &[TestSuite] {
        &self.suites
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Sums per-suite statistics across all suites. Zero suites yield a
    /// zeroed summary, not an error.
    ///
    /// 对所有套件的统计求和。零套件产生全零摘要，而非错误。
    pub fn generate_summary(&self) -> ReportSummary {
        let mut stats = SuiteStats::default();
        for suite in &self.suites {
            let s = suite.statistics();
            stats.total += s.total;
            stats.passed += s.passed;
            stats.failed += s.failed;
            stats.skipped += s.skipped;
            stats.broken += s.broken;
        }
        stats.pass_rate = if stats.total > 0 {
            stats.passed as f64 / stats.total as f64 * 100.0
        } else {
            0.0
        };

        ReportSummary {
            statistics: stats,
            issues: self.issues.len(),
            critical_issues: self
                .issues
                .iter()
                .filter(|i| i.severity == Severity::Critical)
                .count(),
            suites: self.suites.len(),
        }
    }

    /// Produces the deterministic digest: the overall pass-rate line,
    /// conditional failed/broken/critical count lines, then every issue
    /// ordered by severity rank (stable within a rank), annotated with
    /// its occurrence count when above one.
    ///
    /// 生成确定性摘要：总体通过率行、按条件出现的失败/损坏/严重计数行，
    /// 然后是按严重度等级排序的每个议题（同级内稳定），
    /// 出现次数大于一时附加注记。
    pub fn generate_bullet_points(&self) -> Vec<String> {
        let summary = self.generate_summary();
        let stats = summary.statistics;
        let mut bullets = Vec::new();

        bullets.push(format!(
            "- Ran {} tests with {:.1}% pass rate",
            stats.total, stats.pass_rate
        ));
        if stats.failed > 0 {
            bullets.push(format!("- {} tests failed", stats.failed));
        }
        if stats.broken > 0 {
            bullets.push(format!(
                "- {} tests broken (infrastructure issues)",
                stats.broken
            ));
        }
        if summary.critical_issues > 0 {
            bullets.push(format!(
                "- {} critical issues found",
                summary.critical_issues
            ));
        }

        let mut ordered: Vec<&Issue> = self.issues.iter().collect();
        ordered.sort_by_key(|issue| issue.severity);
        for issue in ordered {
            let occurrences = if issue.occurrences > 1 {
                format!(" ({}x)", issue.occurrences)
            } else {
                String::new()
            };
            bullets.push(format!(
                "  [{}] {}{}",
                issue.severity, issue.title, occurrences
            ));
        }

        bullets
    }

    /// Loads historical run records for trend analysis. A missing or
    /// corrupt file degrades to an empty history.
    ///
    /// 加载历史运行记录用于趋势分析。文件缺失或损坏退化为空历史。
    pub fn load_history(&mut self, path: &Path) {
        self.history = trend::load_run_records(path);
    }

    /// Averages the pass rate across the loaded history. An empty
    /// history yields the default trend object, not an error.
    ///
    /// 对已加载历史的通过率取平均。空历史产生默认趋势对象，而非错误。
    pub fn get_trends(&self) -> TrendReport {
        if self.history.is_empty() {
            return TrendReport::default();
        }
        let pass_rates: Vec<f64> = self
            .history
            .iter()
            .map(|record| record.summary.statistics.pass_rate)
            .collect();
        let avg = pass_rates.iter().sum::<f64>() / pass_rates.len() as f64;
        TrendReport {
            avg_pass_rate: avg,
            total_runs: self.history.len(),
            pass_rate_trend: pass_rates,
        }
    }
}

/// Title-based duplicate check: normalized equality, or containment in
/// either direction.
///
/// 基于标题的重复检查：规范化后相等，或任一方向的包含。
fn is_duplicate_title(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    a == b || a.contains(&b) || b.contains(&a)
}
