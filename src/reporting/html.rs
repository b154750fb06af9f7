//! # HTML Reporting Module / HTML 报告模块
//!
//! This module handles the generation of HTML and JSON session reports.
//! Both are pure templating over the report generator's summary, bullet
//! points, issues and suites.
//!
//! 此模块处理 HTML 和 JSON 会话报告的生成。
//! 两者都是对报告生成器的摘要、要点、议题和套件的纯模板化。

use anyhow::Result;
use chrono::Utc;
use std::fs;
use std::path::Path;

use crate::core::report::{CaseStatus, ReportGenerator};
use crate::infra::t;

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = include_str!("assets/report.css");

/// Embedded JavaScript for HTML report interactivity / HTML 报告交互性的嵌入式 JavaScript
const HTML_SCRIPT: &str = include_str!("assets/report.js");

/// Generates a comprehensive HTML report for the session.
/// Creates a styled HTML file with summary statistics, the issue list,
/// the bullet-point digest, and a per-suite results table with
/// toggleable error output.
///
/// 为会话生成综合的 HTML 报告。
/// 创建一个样式化的 HTML 文件，包含摘要统计、议题列表、要点摘要，
/// 以及每个套件的结果表格（错误输出可展开）。
///
/// # Errors / 错误
/// This function will return an error if the output file cannot be
/// written to the specified path.
///
/// 如果无法将输出文件写入指定路径，此函数会返回错误。
pub fn generate_html_report(
    report: &ReportGenerator,
    output_path: &Path,
    locale: &str,
) -> Result<()> {
    let summary = report.generate_summary();
    let stats = summary.statistics;
    let bullets = report.generate_bullet_points();

    let mut html = String::new();
    html.push_str(&format!(
        "<!DOCTYPE html><html><head><title>{}</title>",
        t!("html_report.title", locale = locale)
    ));
    html.push_str("<style>");
    html.push_str(HTML_STYLE);
    html.push_str("</style>");
    html.push_str("</head><body>");
    html.push_str(&format!(
        "<h1>{}</h1>",
        t!("html_report.main_header", locale = locale)
    ));
    html.push_str(&format!(
        "<p>{}</p>",
        t!(
            "html_report.generated",
            locale = locale,
            time = Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        )
    ));

    // Summary statistics
    html.push_str("<div class='summary-container'>");
    for (count, class, label) in [
        (stats.total.to_string(), "", "html_report.summary.total"),
        (
            stats.passed.to_string(),
            " passed-text",
            "html_report.summary.passed",
        ),
        (
            stats.failed.to_string(),
            " failed-text",
            "html_report.summary.failed",
        ),
        (
            stats.broken.to_string(),
            " broken-text",
            "html_report.summary.broken",
        ),
        (
            format!("{:.1}%", stats.pass_rate),
            "",
            "html_report.summary.pass_rate",
        ),
    ] {
        html.push_str(&format!(
            "<div class='summary-item'><span class='count{}'>{}</span><span class='label'>{}</span></div>",
            class,
            count,
            t!(label, locale = locale)
        ));
    }
    html.push_str("</div>");

    // Issues
    html.push_str(&format!(
        "<div class='issues'><h2>{} ({})</h2>",
        t!("html_report.issues_header", locale = locale),
        report.issues().len()
    ));
    for issue in report.issues() {
        html.push_str(&format!(
            "<div class='issue {}'><strong>{}</strong><p>{}</p><small>{} &middot; {}x</small></div>",
            issue.severity,
            escape_html(&issue.title),
            escape_html(&issue.description),
            issue.id,
            issue.occurrences
        ));
    }
    html.push_str("</div>");

    // Bullet points
    html.push_str(&format!(
        "<div class='bullets'><h2>{}</h2><ul>",
        t!("html_report.bullets_header", locale = locale)
    ));
    for bullet in &bullets {
        html.push_str(&format!("<li>{}</li>", escape_html(bullet)));
    }
    html.push_str("</ul></div>");

    // Per-suite results table
    html.push_str(&format!(
        "<h2>{}</h2>",
        t!("html_report.suites_header", locale = locale)
    ));
    let mut output_index = 0usize;
    for suite in report.suites() {
        html.push_str(&format!("<h3>{}</h3>", escape_html(&suite.name)));
        html.push_str("<table><thead><tr>");
        html.push_str(&format!(
            "<th>{}</th>",
            t!("html_report.table.header.name", locale = locale)
        ));
        html.push_str(&format!(
            "<th class='status-col'>{}</th>",
            t!("html_report.table.header.status", locale = locale)
        ));
        html.push_str(&format!(
            "<th class='duration-cell'>{}</th>",
            t!("html_report.table.header.duration", locale = locale)
        ));
        html.push_str("</tr></thead><tbody>");

        for case in &suite.cases {
            let status_class = match case.status {
                CaseStatus::Passed => "status-Passed",
                CaseStatus::Failed => "status-Failed",
                CaseStatus::Skipped => "status-Skipped",
                CaseStatus::Broken => "status-Broken",
            };
            let output_id = format!("output-{}", output_index);
            output_index += 1;

            let (toggle, details) = match &case.error_message {
                Some(message) => (
                    format!(
                        "<div class='output-toggle' onclick=\"toggleOutput('{}')\">{}</div>",
                        output_id,
                        t!("html_report.toggle_output", locale = locale)
                    ),
                    format!(
                        "<tr id='{}' style='display:none;'><td colspan='3'><pre class='output-content'>{}</pre></td></tr>",
                        output_id,
                        escape_html(message)
                    ),
                ),
                None => (String::new(), String::new()),
            };

            html.push_str("<tr>");
            html.push_str(&format!("<td>{}</td>", escape_html(&case.name)));
            html.push_str(&format!(
                "<td class='status-col'><div class='status-cell {}'>{:?}</div>{}</td>",
                status_class, case.status, toggle
            ));
            html.push_str(&format!(
                "<td class='duration-cell'>{:.2}s</td>",
                case.duration_ms / 1000.0
            ));
            html.push_str("</tr>");
            html.push_str(&details);
        }
        html.push_str("</tbody></table>");
    }

    html.push_str("<script>");
    html.push_str(HTML_SCRIPT);
    html.push_str("</script></body></html>");

    fs::write(output_path, html)?;
    Ok(())
}

/// Writes the machine-readable JSON report: generation time, summary,
/// bullet points, issues and full suites.
///
/// 写出机器可读的 JSON 报告：生成时间、摘要、要点、议题和完整套件。
pub fn write_json_report(report: &ReportGenerator, output_path: &Path) -> Result<()> {
    let payload = serde_json::json!({
        "generated": Utc::now(),
        "summary": report.generate_summary(),
        "bullet_points": report.generate_bullet_points(),
        "issues": report.issues(),
        "suites": report.suites().iter().map(|suite| {
            serde_json::json!({
                "name": suite.name,
                "statistics": suite.statistics(),
                "cases": suite.cases,
            })
        }).collect::<Vec<_>>(),
    });
    fs::write(output_path, serde_json::to_string_pretty(&payload)?)?;
    Ok(())
}

/// Simple HTML escape function to replace special characters with their
/// HTML entities
/// 简单的 HTML 转义函数，用 HTML 实体替换特殊字符
fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
