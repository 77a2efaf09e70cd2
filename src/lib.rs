//! # accesslog-analysis
//!
//! Web 服务器 access log（combined 格式）的并发解析与流量统计库。
//!
//! 流水线：
//! 1. [`accesslog::discover`] 按目录、文件名模式和时效策略发现日志文件
//! 2. [`concurrent`] 有界线程池按文件并发处理，每个线程分块读取、解析、分类并累加到私有的部分聚合
//! 3. [`analytics::TrafficAggregate::merge`] 合并所有部分聚合，结果与合并顺序无关
//! 4. [`analytics::summarize`] 生成固定形状的报告，由 [`exporter`] 渲染输出
//!
//! ```no_run
//! use accesslog_analysis::config::Config;
//! use accesslog_analysis::process::run;
//!
//! let config = Config::from_file("config.toml")?;
//! let report_path = run(&config)?;
//! println!("{}", report_path.display());
//! # Ok::<(), accesslog_analysis::error::AnalyticsError>(())
//! ```

pub mod accesslog;
pub mod analytics;
pub mod concurrent;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod exporter;
pub mod process;

#[cfg(feature = "logging")]
pub mod logging;

pub use analytics::{AnalysisWindow, Report};
pub use config::Config;
pub use error::{AnalyticsError, Result};
pub use process::{aggregate, aggregate_with, run};
