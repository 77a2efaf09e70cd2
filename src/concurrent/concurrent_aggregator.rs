//! 并发聚合器主实现

use super::types::{AggregateTask, FileOutcome};
use super::workers;
use crate::analytics::{AnalysisWindow, Classifier, GlobalAggregate, PathMatcher, RunStats};
use crate::config::{AnalyticsConfig, Config};
use crate::enrichment::ResolverFactory;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;

/// 并发访问日志聚合器
///
/// 工作线程从共享队列中取文件，各自持有独立的部分聚合，
/// 所有线程 join 之后才开始合并。
#[derive(Clone)]
pub struct ConcurrentAggregator {
    /// 线程数与分块大小
    analytics: AnalyticsConfig,
    matcher: Arc<PathMatcher>,
    resolvers: Arc<dyn ResolverFactory>,
}

impl ConcurrentAggregator {
    /// 创建新的并发聚合器
    pub fn new(config: &Config, resolvers: Arc<dyn ResolverFactory>) -> Self {
        #[cfg(feature = "logging")]
        tracing::debug!(
            "创建并发聚合器，线程数: {}, 分块大小: {}",
            config.analytics.thread_count,
            config.analytics.chunk_size
        );

        Self {
            analytics: config.analytics.clone(),
            matcher: Arc::new(PathMatcher::new(&config.paths)),
            resolvers,
        }
    }

    /// 并发聚合文件列表，返回全局聚合与运行统计
    pub fn aggregate_files(
        &self,
        file_paths: &[PathBuf],
        window: &AnalysisWindow,
    ) -> (GlobalAggregate, RunStats) {
        let mut stats = RunStats::new();
        stats.files_discovered = file_paths.len();

        if file_paths.is_empty() {
            #[cfg(feature = "logging")]
            tracing::warn!("文件列表为空，跳过聚合");
            stats.finish();
            return (GlobalAggregate::new(), stats);
        }

        let actual_threads = self.analytics.worker_count(file_paths.len());

        #[cfg(feature = "logging")]
        tracing::info!(
            "开始并发聚合 {} 个文件，启动 {} 个工作线程",
            file_paths.len(),
            actual_threads
        );

        // 创建文件队列和结果通道
        let tasks = file_paths
            .iter()
            .enumerate()
            .map(|(index, file_path)| AggregateTask { index, file_path: file_path.clone() });
        let queue = Arc::new(Mutex::new(VecDeque::from_iter(tasks)));
        let (result_tx, result_rx) = mpsc::channel::<FileOutcome>();

        let mut handles = Vec::with_capacity(actual_threads);
        for thread_id in 0..actual_threads {
            let queue = Arc::clone(&queue);
            let result_tx = result_tx.clone();
            let matcher = Arc::clone(&self.matcher);
            let resolvers = Arc::clone(&self.resolvers);
            let window = *window;
            let chunk_size = self.analytics.chunk_size;

            let handle = thread::spawn(move || {
                // 解析器在线程内构建，线程之间不共享可变状态
                let classifier = Classifier::new(
                    window,
                    matcher,
                    resolvers.geo_resolver(),
                    resolvers.ua_classifier(),
                );
                workers::aggregate_worker(thread_id, queue, result_tx, classifier, chunk_size);
            });
            handles.push(handle);
        }
        drop(result_tx);

        // 等待所有线程完成
        for (_i, handle) in handles.into_iter().enumerate() {
            if let Err(_e) = handle.join() {
                #[cfg(feature = "logging")]
                tracing::error!("聚合线程 {} panic: {:?}", _i, _e);
            }
        }

        // 收集所有结果
        let mut outcomes: Vec<FileOutcome> = result_rx.try_iter().collect();
        outcomes.sort_by_key(|outcome| outcome.index);

        let mut global = GlobalAggregate::new();
        for outcome in outcomes {
            stats.merge(&outcome.stats);
            global.merge(outcome.aggregate);
        }
        stats.finish();

        #[cfg(feature = "logging")]
        tracing::info!("并发聚合完成: {}", stats);

        (global, stats)
    }
}
