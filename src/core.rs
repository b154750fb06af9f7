//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Beta Harness,
//! including the adapter contract and registry, the metrics collector,
//! the report generator with issue deduplication, the trend store, and
//! the parallel bench matrix.
//!
//! 此模块包含 Beta Harness 的核心功能，
//! 包括适配器契约与注册表、指标收集器、带议题去重的报告生成器、
//! 趋势存储以及并行基准矩阵。

pub mod adapter;
pub mod bench;
pub mod config;
pub mod metrics;
pub mod registry;
pub mod report;
pub mod trend;

// Re-exports
pub use adapter::{Adapter, ProbeMetrics, TargetKind, TestResult, TestStatus};
pub use config::HarnessConfig;
pub use metrics::MetricsCollector;
pub use registry::AdapterRegistry;
pub use report::ReportGenerator;
