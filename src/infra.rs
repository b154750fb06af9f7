//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for Beta Harness,
//! including target-process lifecycle management, file system
//! operations, and i18n support.
//!
//! 此模块为 Beta Harness 提供基础设施服务，
//! 包括目标进程生命周期管理、文件系统操作和国际化支持。

pub mod fs;
pub mod process;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
