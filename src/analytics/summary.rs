//! 报告生成
//!
//! 把全局聚合投影为固定形状的报告：按日期的稠密序列、24 小时数组、
//! 排序后的榜单以及国家分布。

use crate::analytics::aggregate::GlobalAggregate;
use crate::analytics::stats::RunStats;
use crate::analytics::tally::Tally;
use crate::analytics::AnalysisWindow;
use serde::Serialize;

/// 日期在报告中的格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 榜单条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub name: String,
    pub count: u64,
}

/// 国家分布条目，字段名与前端饼图约定一致
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryShare {
    pub name: String,
    pub value: u64,
}

/// 最终报告，生成后不再修改
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// 生成时间（窗口终点）
    pub generated_at: String,
    pub lookback_days: u32,
    /// 连续日期序列，从旧到新
    pub daily_dates: Vec<String>,
    pub daily_visitors: Vec<u64>,
    pub daily_pageviews: Vec<u64>,
    pub daily_feed_unique: Vec<u64>,
    pub daily_scraper_pageviews: Vec<u64>,
    pub hourly: [u64; 24],
    pub top_posts: Vec<RankedEntry>,
    pub browsers: Vec<RankedEntry>,
    pub operating_systems: Vec<RankedEntry>,
    pub utm_sources: Vec<RankedEntry>,
    pub feed_user_agents: Vec<RankedEntry>,
    pub referrers: Vec<RankedEntry>,
    /// 按名称排序输出，使用方应视为无序
    pub countries: Vec<CountryShare>,
    pub stats: RunStats,
    pub elapsed_ms: u128,
}

impl Report {
    /// 所有序列与榜单均为空的报告
    pub fn is_empty(&self) -> bool {
        self.hourly.iter().all(|&n| n == 0)
            && self.top_posts.is_empty()
            && self.browsers.is_empty()
            && self.countries.is_empty()
    }
}

fn ranked(tally: &Tally<String>) -> Vec<RankedEntry> {
    tally
        .ranked()
        .into_iter()
        .map(|(name, count)| RankedEntry { name, count })
        .collect()
}

/// 由全局聚合生成报告
pub fn summarize(
    agg: &GlobalAggregate,
    window: &AnalysisWindow,
    top_posts: usize,
    stats: RunStats,
) -> Report {
    let dates = window.dates();

    let mut top = ranked(&agg.blog_post_views);
    top.truncate(top_posts);

    let mut countries: Vec<CountryShare> = agg
        .countries
        .iter()
        .map(|(name, value)| CountryShare { name: name.clone(), value })
        .collect();
    countries.sort_by(|a, b| a.name.cmp(&b.name));

    Report {
        generated_at: window.now().format("%Y-%m-%d %H:%M:%S %:z").to_string(),
        lookback_days: window.lookback_days(),
        daily_dates: dates.iter().map(|d| d.format(DATE_FORMAT).to_string()).collect(),
        daily_visitors: dates
            .iter()
            .map(|d| agg.daily_visitors.count(d) as u64)
            .collect(),
        daily_pageviews: dates.iter().map(|d| agg.daily_pageviews.get(d)).collect(),
        daily_feed_unique: dates
            .iter()
            .map(|d| agg.daily_feed_hosts.count(d) as u64)
            .collect(),
        daily_scraper_pageviews: dates
            .iter()
            .map(|d| agg.daily_scraper_pageviews.get(d))
            .collect(),
        hourly: agg.hourly,
        top_posts: top,
        browsers: ranked(&agg.browsers),
        operating_systems: ranked(&agg.operating_systems),
        utm_sources: ranked(&agg.utm_sources),
        feed_user_agents: ranked(&agg.feed_user_agents),
        referrers: ranked(&agg.referrers),
        countries,
        elapsed_ms: stats.elapsed_ms(),
        stats,
    }
}
