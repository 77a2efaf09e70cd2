//! 并发聚合功能
//!
//! 有界线程池从共享队列中取文件，每个线程产出独立的部分聚合，
//! 通过 mpsc 通道汇总后合并。

pub mod concurrent_aggregator;
pub mod types;
pub mod workers;

pub use concurrent_aggregator::ConcurrentAggregator;
pub use types::{AggregateTask, FileOutcome};
pub use workers::{aggregate_file, aggregate_lines};
