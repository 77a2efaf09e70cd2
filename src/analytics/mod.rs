//! 流量统计核心
//!
//! 分类 → 单线程部分聚合 → 合并 → 报告生成。

pub mod aggregate;
pub mod classify;
pub mod stats;
pub mod summary;
pub mod tally;
pub mod window;

pub use aggregate::{GlobalAggregate, PartialAggregate, TrafficAggregate};
pub use classify::{Classification, Classifier, PathCategory, PathMatcher};
pub use stats::RunStats;
pub use summary::{CountryShare, RankedEntry, Report, summarize};
pub use tally::{BucketSet, Tally};
pub use window::{AnalysisWindow, MAX_LOOKBACK_DAYS};
