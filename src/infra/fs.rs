//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides utilities for file system operations,
//! such as preparing report and screenshot directories and copying
//! artifact directories into report bundles.
//!
//! 此模块提供文件系统操作的实用功能，
//! 如准备报告和截图目录，以及将产物目录复制进报告包。

use anyhow::{Context, Result};
use fs_extra::dir::{CopyOptions, copy};
use std::fs;
use std::path::{Path, PathBuf};

/// Creates a directory (and parents) if it does not exist yet.
///
/// 如目录尚不存在则创建它（包括父目录）。
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Replaces every non-alphanumeric character with an underscore so a
/// free-form name is safe as a file name.
///
/// 将所有非字母数字字符替换为下划线，使自由形式的名称可安全用作文件名。
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Copies the entire content of a source directory to a destination
/// directory, used to bundle screenshot directories next to reports.
///
/// 将源目录的全部内容复制到目标目录，用于将截图目录打包到报告旁。
pub fn copy_dir_all(from: &Path, to: &Path) -> Result<()> {
    let mut options = CopyOptions::new();
    options.overwrite = true;
    options.copy_inside = true;
    copy(from, to, &options)?;
    Ok(())
}

/// Gets the absolute path from a potentially relative path.
///
/// 从可能的相对路径获取绝对路径。
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {}", path.display()))
}
