//! # Reporting Module / 报告模块
//!
//! This module handles the rendering sinks for session data: colorful
//! console summaries and HTML/JSON report files. Rendering is pure
//! templating over the report generator's output; no aggregation logic
//! lives here.
//!
//! 此模块处理会话数据的渲染输出：彩色控制台摘要和 HTML/JSON 报告文件。
//! 渲染是对报告生成器输出的纯模板化；这里没有聚合逻辑。

pub mod console;
pub mod html;

// Re-export common reporting functions
pub use console::{print_bullet_points, print_real_time_metrics, print_summary};
pub use html::{generate_html_report, write_json_report};
