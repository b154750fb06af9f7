//! # Beta Harness Library / Beta Harness 库
//!
//! This library provides the core functionality for the Beta Harness
//! tool, a configuration-driven beta-test harness that drives
//! heterogeneous target software (games, audio plugins, web apps and
//! desktop apps) through one uniform test lifecycle.
//!
//! 此库为 Beta Harness 工具提供核心功能，
//! 这是一个配置驱动的 beta 测试工具，
//! 通过统一的测试生命周期驱动异构目标软件：
//! 游戏、音频插件、Web 应用和桌面应用。
//!
//! ## Modules / 模块
//!
//! - `core` - Adapter contract, registry, metrics, reports, trends, bench matrix
//! - `adapters` - Concrete adapters for each target-software category
//! - `infra` - Infrastructure services like process management and file system operations
//! - `reporting` - Session result reporting and visualization
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 适配器契约、注册表、指标、报告、趋势、基准矩阵
//! - `adapters` - 每个目标软件类别的具体适配器
//! - `infra` - 基础设施服务，如进程管理和文件系统操作
//! - `reporting` - 会话结果报告和可视化
//! - `cli` - 命令行接口和命令

pub mod adapters;
pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::adapter;
pub use crate::core::metrics;
pub use crate::core::registry;
pub use crate::core::report;

/// Initializes the application's internationalization (i18n) based on the system locale.
///
/// This function detects the user's system locale and sets the appropriate
/// language for the application's user interface. It attempts to match the full
/// locale (e.g., "zh-CN"), then just the language code (e.g., "en"), and
/// finally falls back to the default language ("en").
pub fn init() {
    // Detect system locale and set it for i18n.
    // Fallback to "en" if detection fails.
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    // Try to match the full locale first (e.g., "zh-CN")
    // Then try to match the language part only (e.g., "en" from "en-US")
    // Finally, fall back to "en"
    let lang = if available_locales.contains(&locale.as_str()) {
        &locale
    } else {
        locale
            .split('-')
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
