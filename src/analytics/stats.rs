//! 运行统计信息模块

use serde::Serialize;
use std::time::{Duration, Instant};

/// 一次运行（或一个文件）的处理统计
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct RunStats {
    /// 发现的候选文件数
    pub files_discovered: usize,
    /// 成功处理的文件数
    pub files_processed: usize,
    /// 因无法读取而跳过的文件数
    pub files_skipped: usize,
    /// 读取的行数
    pub lines_read: u64,
    /// 解析成功的行数
    pub lines_parsed: u64,
    /// 解析失败的行数
    pub parse_failures: u64,
    /// 超出回溯窗口而被丢弃的记录数
    pub records_outside_window: u64,
    /// 处理开始时间
    #[serde(skip)]
    pub start_time: Option<Instant>,
    /// 处理完成时间
    #[serde(skip)]
    pub end_time: Option<Instant>,
}

impl RunStats {
    /// 创建新的统计信息，记录开始时间
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// 标记处理完成，记录结束时间
    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// 计算处理持续时间
    pub fn duration(&self) -> Option<Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end.saturating_duration_since(start)),
            _ => None,
        }
    }

    /// 处理耗时（毫秒），未完成时为 0
    pub fn elapsed_ms(&self) -> u128 {
        self.duration().map_or(0, |d| d.as_millis())
    }

    /// 计算每秒处理行数
    pub fn lines_per_second(&self) -> Option<f64> {
        self.duration().map(|d| {
            if d.as_secs_f64() > 0.0 {
                self.lines_read as f64 / d.as_secs_f64()
            } else {
                0.0
            }
        })
    }

    /// 合并其他统计信息：计数相加，保留最早的开始时间和最晚的结束时间
    pub fn merge(&mut self, other: &RunStats) {
        self.files_discovered += other.files_discovered;
        self.files_processed += other.files_processed;
        self.files_skipped += other.files_skipped;
        self.lines_read += other.lines_read;
        self.lines_parsed += other.lines_parsed;
        self.parse_failures += other.parse_failures;
        self.records_outside_window += other.records_outside_window;

        self.start_time = match (self.start_time, other.start_time) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.end_time = match (self.end_time, other.end_time) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "文件: {}/{} (跳过 {}), 行: {}, 解析成功: {}, 解析失败: {}, 窗口外: {}",
            self.files_processed,
            self.files_discovered,
            self.files_skipped,
            self.lines_read,
            self.lines_parsed,
            self.parse_failures,
            self.records_outside_window
        )?;

        if let Some(duration) = self.duration() {
            write!(f, ", 耗时: {:.2}s", duration.as_secs_f64())?;

            if let Some(lps) = self.lines_per_second() {
                write!(f, ", 速度: {:.2} 行/秒", lps)?;
            }
        }
        Ok(())
    }
}
