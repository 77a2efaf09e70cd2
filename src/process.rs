//! 流水线入口
//!
//! 发现文件 → 并发聚合 → 生成报告 → 渲染输出。

use crate::accesslog::{RecencyPolicy, discover_files};
use crate::analytics::{AnalysisWindow, Report, summarize};
use crate::concurrent::ConcurrentAggregator;
use crate::config::Config;
use crate::enrichment::{ResolverFactory, StandardResolvers};
use crate::error::Result;
use crate::exporter::{JsonReportRenderer, ReportRenderer};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 确定本次运行要处理的日志文件
///
/// 配置了显式文件列表时直接使用该列表，否则扫描日志目录。
///
/// # Errors
/// 文件名模式或日期正则无效、日志目录无法读取时返回错误
pub fn discover_sources(config: &Config, window: &AnalysisWindow) -> Result<Vec<PathBuf>> {
    let sources = &config.sources;
    if !sources.files.is_empty() {
        #[cfg(feature = "logging")]
        tracing::info!("使用配置中的 {} 个日志文件，跳过目录扫描", sources.files.len());
        return Ok(sources.files.clone());
    }

    let policy = RecencyPolicy::from_config(sources, window)?;
    discover_files(&sources.log_dir, &sources.file_pattern, &policy)
}

/// 使用默认解析器聚合文件并生成报告
///
/// 单个文件无法读取或单行无法解析都不会导致失败；文件列表为空时返回全零报告。
pub fn aggregate(files: &[PathBuf], config: &Config, window: &AnalysisWindow) -> Report {
    let resolvers: Arc<dyn ResolverFactory> =
        Arc::new(StandardResolvers::new(&config.enrichment));
    aggregate_with(files, config, window, resolvers)
}

/// 使用注入的解析器聚合文件并生成报告
pub fn aggregate_with(
    files: &[PathBuf],
    config: &Config,
    window: &AnalysisWindow,
    resolvers: Arc<dyn ResolverFactory>,
) -> Report {
    let aggregator = ConcurrentAggregator::new(config, resolvers);
    let (global, stats) = aggregator.aggregate_files(files, window);
    summarize(&global, window, config.analytics.top_posts, stats)
}

/// 以当前时间为窗口终点执行完整流水线，返回报告文件路径
///
/// # Errors
/// 配置无效、文件发现失败或报告写入失败时返回错误
pub fn run(config: &Config) -> Result<PathBuf> {
    config.validate()?;
    run_with_window(config, &AnalysisWindow::current(config.analytics.lookback_days)?)
}

/// 以给定窗口执行完整流水线
pub fn run_with_window(config: &Config, window: &AnalysisWindow) -> Result<PathBuf> {
    config.validate()?;

    #[cfg(feature = "logging")]
    tracing::info!(
        "开始分析，回溯 {} 天，截止时间: {}",
        window.lookback_days(),
        window.cutoff()
    );

    let files = discover_sources(config, window)?;
    let report = aggregate(&files, config, window);

    #[cfg(feature = "logging")]
    tracing::info!("分析完成: {}", report.stats);

    let renderer = JsonReportRenderer::new(config.output.file_name.clone());
    renderer.render(&report, Path::new(&config.output.output_dir))
}
