//! 聚合工作线程

use super::types::{AggregateTask, FileOutcome};
use crate::accesslog::utils::line_to_str;
use crate::accesslog::{ChunkedLines, RequestRecord};
use crate::analytics::{Classifier, PartialAggregate, RunStats};
use std::collections::VecDeque;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex, mpsc};

/// 共享任务队列
pub type TaskQueue = Arc<Mutex<VecDeque<AggregateTask>>>;

/// 逐行解析、分类并累加到部分聚合
///
/// 解析失败的行被丢弃并计数；读取出错时返回错误，已累加的结果由调用方丢弃。
pub fn aggregate_lines<R: Read>(
    lines: ChunkedLines<R>,
    classifier: &Classifier,
    stats: &mut RunStats,
) -> std::io::Result<PartialAggregate> {
    let mut aggregate = PartialAggregate::new();

    for line in lines {
        let line = line?;
        stats.lines_read += 1;

        let text = line_to_str(&line);
        if text.trim().is_empty() {
            continue;
        }

        match RequestRecord::from_line(&text) {
            Ok(record) => {
                stats.lines_parsed += 1;
                match classifier.classify(&record) {
                    Some(classification) => aggregate.record(classification),
                    None => stats.records_outside_window += 1,
                }
            }
            Err(_failure) => {
                stats.parse_failures += 1;
                #[cfg(feature = "logging")]
                tracing::trace!("丢弃无法解析的行: {}", _failure);
            }
        }
    }

    Ok(aggregate)
}

/// 处理单个文件；文件无法读取时返回空聚合并计入 `files_skipped`
pub fn aggregate_file(
    index: usize,
    file_path: &Path,
    chunk_size: usize,
    classifier: &Classifier,
) -> FileOutcome {
    let mut stats = RunStats::new();

    let result = ChunkedLines::open(file_path, chunk_size)
        .and_then(|lines| aggregate_lines(lines, classifier, &mut stats));

    let aggregate = match result {
        Ok(aggregate) => {
            stats.files_processed = 1;
            aggregate
        }
        Err(_e) => {
            #[cfg(feature = "logging")]
            tracing::warn!("无法读取日志文件 {}，已跳过: {}", file_path.display(), _e);
            stats.files_skipped = 1;
            PartialAggregate::new()
        }
    };
    stats.finish();

    FileOutcome {
        index,
        file_path: file_path.to_path_buf(),
        aggregate,
        stats,
    }
}

/// 工作线程主循环：从共享队列取文件，处理后把结果发送给汇总端
#[cfg_attr(not(feature = "logging"), allow(unused_variables, unused_assignments))]
pub fn aggregate_worker(
    thread_id: usize,
    queue: TaskQueue,
    result_tx: mpsc::Sender<FileOutcome>,
    classifier: Classifier,
    chunk_size: usize,
) {
    #[cfg(feature = "logging")]
    tracing::debug!("聚合线程 {} 启动", thread_id);

    let mut handled = 0usize;
    loop {
        // 获取下一个文件
        let task = {
            let mut queue = match queue.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            queue.pop_front()
        };
        let Some(task) = task else { break };

        #[cfg(feature = "logging")]
        tracing::debug!("线程 {} 开始处理文件: {}", thread_id, task.file_path.display());

        let outcome = aggregate_file(task.index, &task.file_path, chunk_size, &classifier);

        #[cfg(feature = "logging")]
        tracing::debug!(
            "线程 {} 完成文件 {}: {}",
            thread_id,
            task.file_path.display(),
            outcome.stats
        );

        handled += 1;
        if result_tx.send(outcome).is_err() {
            #[cfg(feature = "logging")]
            tracing::error!("线程 {} 发送结果失败，接收端已关闭", thread_id);
            break;
        }
    }

    #[cfg(feature = "logging")]
    tracing::debug!("聚合线程 {} 退出，共处理 {} 个文件", thread_id, handled);
}
