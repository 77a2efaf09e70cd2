//! 并发聚合相关的数据类型定义

use crate::analytics::{PartialAggregate, RunStats};
use std::path::PathBuf;

/// 聚合任务：一个文件
#[derive(Debug, Clone)]
pub struct AggregateTask {
    /// 任务序号（发现顺序）
    pub index: usize,
    /// 文件路径
    pub file_path: PathBuf,
}

/// 单个文件的处理结果
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// 任务序号
    pub index: usize,
    /// 源文件路径
    pub file_path: PathBuf,
    /// 该文件的部分聚合；文件无法读取时为空
    pub aggregate: PartialAggregate,
    /// 该文件的处理统计
    pub stats: RunStats,
}
