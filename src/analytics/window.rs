//! 统计时间窗口
//!
//! 回溯截止时间与订阅源 24 小时截止时间在一次运行开始时计算一次，
//! 之后所有工作线程共享同一个只读窗口，截止点不会随处理时间漂移。
//!
//! 回溯截止时刻是报告日期序列第一天的零点（窗口时区），
//! 因此保留下来的每条记录都落在某个报告日期里。

use crate::error::{AnalyticsError, Result};
use chrono::{DateTime, Days, Duration, FixedOffset, Local, NaiveDate};

/// 订阅源 User-Agent 统计只看最近 24 小时
const FEED_WINDOW_HOURS: i64 = 24;

/// 回溯天数上限
pub const MAX_LOOKBACK_DAYS: u32 = 3650;

/// 一次运行的统计窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisWindow {
    now: DateTime<FixedOffset>,
    lookback_days: u32,
    cutoff: DateTime<FixedOffset>,
    feed_cutoff: DateTime<FixedOffset>,
}

impl AnalysisWindow {
    /// 以给定时刻为终点创建窗口
    ///
    /// # Errors
    /// `lookback_days` 为 0、超过 [`MAX_LOOKBACK_DAYS`] 或截止时间超出可表示范围时返回配置错误
    pub fn ending_at(now: DateTime<FixedOffset>, lookback_days: u32) -> Result<Self> {
        if lookback_days == 0 || lookback_days > MAX_LOOKBACK_DAYS {
            return Err(AnalyticsError::config(format!(
                "lookback_days 必须在 1..={MAX_LOOKBACK_DAYS} 之间: {lookback_days}"
            )));
        }

        let out_of_range = || AnalyticsError::config(format!("回溯窗口超出时间范围: {now}"));
        let cutoff = now
            .date_naive()
            .checked_sub_days(Days::new(u64::from(lookback_days - 1)))
            .and_then(|first| first.and_hms_opt(0, 0, 0))
            .and_then(|midnight| midnight.and_local_timezone(*now.offset()).single())
            .ok_or_else(out_of_range)?;
        let feed_cutoff = now
            .checked_sub_signed(Duration::hours(FEED_WINDOW_HOURS))
            .ok_or_else(out_of_range)?;

        Ok(Self {
            now,
            lookback_days,
            cutoff,
            feed_cutoff,
        })
    }

    /// 以当前本地时间为终点创建窗口
    pub fn current(lookback_days: u32) -> Result<Self> {
        Self::ending_at(Local::now().fixed_offset(), lookback_days)
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }

    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    /// 回溯截止时刻（包含）
    pub fn cutoff(&self) -> DateTime<FixedOffset> {
        self.cutoff
    }

    /// 订阅源统计截止时刻（包含）
    pub fn feed_cutoff(&self) -> DateTime<FixedOffset> {
        self.feed_cutoff
    }

    /// 记录时间是否落在回溯窗口内，恰好等于截止时刻的记录保留
    pub fn contains(&self, ts: &DateTime<FixedOffset>) -> bool {
        *ts >= self.cutoff
    }

    /// 记录时间是否落在订阅源 24 小时窗口内
    pub fn in_feed_window(&self, ts: &DateTime<FixedOffset>) -> bool {
        *ts >= self.feed_cutoff
    }

    /// 换算到窗口时区，日期与小时分桶都以此为准
    pub fn local(&self, ts: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        ts.with_timezone(self.now.offset())
    }

    /// 报告序列的最后一天
    pub fn end_date(&self) -> NaiveDate {
        self.now.date_naive()
    }

    /// 报告序列的第一天，即截止时刻所在的日期
    pub fn cutoff_date(&self) -> NaiveDate {
        self.cutoff.date_naive()
    }

    /// 报告使用的连续日期序列，从旧到新，共 `lookback_days` 天，以 `end_date` 结束
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.cutoff_date()
            .iter_days()
            .take(self.lookback_days as usize)
            .collect()
    }
}
