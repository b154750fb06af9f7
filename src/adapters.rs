//! # Adapters Module / 适配器模块
//!
//! Concrete adapter implementations, one per supported target-software
//! category. Each adapter owns its own connection state, configuration
//! map, process handle and log buffer; there is no shared mutable base
//! state. Targets are driven through the narrow process primitives in
//! [`crate::infra::process`]; no third-party automation bindings live
//! here.
//!
//! 具体适配器实现，每个支持的目标软件类别一个。
//! 每个适配器拥有自己的连接状态、配置映射、进程句柄和日志缓冲；
//! 没有共享的可变基础状态。目标通过 [`crate::infra::process`]
//! 中的窄进程原语驱动；这里没有第三方自动化绑定。

pub mod game;
pub mod vst;
pub mod web;
pub mod windows;

pub use game::GameAdapter;
pub use vst::VstAdapter;
pub use web::WebAdapter;
pub use windows::WindowsAppAdapter;

use std::path::PathBuf;
use tempfile::TempDir;

use crate::core::adapter::ConfigMap;
use crate::core::registry::AdapterRegistry;
use crate::infra;

/// Builds a registry with every built-in adapter registered. This is
/// the orchestrator's construction-time initialization point; callers
/// may register further adapters on the returned instance.
///
/// 构建一个注册了所有内置适配器的注册表。
/// 这是编排器在构建期的初始化入口；
/// 调用方可以在返回的实例上继续注册其他适配器。
pub fn builtin_registry() -> AdapterRegistry {
    let mut registry = AdapterRegistry::new();
    registry.register("game", GameAdapter::KIND, || Box::new(GameAdapter::new()));
    registry.register("vst", VstAdapter::KIND, || Box::new(VstAdapter::new()));
    registry.register("web", WebAdapter::KIND, || Box::new(WebAdapter::new()));
    registry.register("windows", WindowsAppAdapter::KIND, || {
        Box::new(WindowsAppAdapter::new())
    });
    registry
}

/// Reads a string value from a config/parameter map.
pub(crate) fn str_value(map: &ConfigMap, key: &str) -> Option<String> {
    map.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

/// Reads a string parameter, preferring the call-site params over the
/// adapter configuration. A present but non-string value is an internal
/// fault, surfaced as an Error-status result by the caller.
///
/// 读取字符串参数，调用点参数优先于适配器配置。
/// 存在但非字符串的值是内部故障，由调用方以 Error 状态结果呈现。
pub(crate) fn str_param(
    params: &ConfigMap,
    config: &ConfigMap,
    key: &str,
) -> anyhow::Result<Option<String>> {
    for map in [params, config] {
        if let Some(value) = map.get(key) {
            return match value.as_str() {
                Some(s) => Ok(Some(s.to_string())),
                None => Err(anyhow::anyhow!("parameter `{}` must be a string", key)),
            };
        }
    }
    Ok(None)
}

/// Reads a boolean option, tolerating absent or mistyped values.
pub(crate) fn bool_option(map: &ConfigMap, key: &str, default: bool) -> bool {
    map.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
}

/// Reads an integer option, tolerating absent or mistyped values.
pub(crate) fn u64_option(map: &ConfigMap, key: &str, default: u64) -> u64 {
    map.get(key).and_then(|v| v.as_u64()).unwrap_or(default)
}

/// Resolves the directory a screenshot should land in and reserves a
/// sanitized path inside it. Without a configured `screenshot_dir` the
/// adapter stages under a temporary directory that lives as long as the
/// adapter. Failure to prepare the directory is logged and yields
/// `None`; capture is best-effort everywhere.
///
/// 解析截图应落入的目录并在其中保留一个净化后的路径。
/// 未配置 `screenshot_dir` 时，适配器在一个与其同寿命的临时目录下暂存。
/// 目录准备失败会记录日志并产生 `None`；截图捕获在任何地方都是尽力而为。
pub(crate) fn reserve_screenshot_path(
    config: &ConfigMap,
    staging: &mut Option<TempDir>,
    logs: &mut Vec<String>,
    file_name: &str,
) -> Option<PathBuf> {
    let dir = match str_value(config, "screenshot_dir") {
        Some(dir) => PathBuf::from(dir),
        None => {
            if staging.is_none() {
                match tempfile::Builder::new().prefix("beta_harness_shots_").tempdir() {
                    Ok(dir) => *staging = Some(dir),
                    Err(e) => {
                        logs.push(format!("Screenshot staging failed: {}", e));
                        return None;
                    }
                }
            }
            staging.as_ref()?.path().to_path_buf()
        }
    };

    if let Err(e) = infra::fs::ensure_dir(&dir) {
        logs.push(format!("Screenshot capture failed: {:#}", e));
        return None;
    }
    let path = dir.join(format!("{}.png", infra::fs::sanitize_name(file_name)));
    logs.push(format!("Screenshot captured: {}", path.display()));
    Some(path)
}
