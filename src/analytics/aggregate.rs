//! 流量聚合
//!
//! 每个工作线程持有一个 [`PartialAggregate`]，只做计数累加和集合插入；
//! 全部线程结束后按字段合并为 [`GlobalAggregate`]。合并满足结合律和交换律。

use crate::analytics::classify::Classification;
use crate::analytics::tally::{BucketSet, Tally};
use crate::enrichment::UNKNOWN;
use chrono::NaiveDate;

/// 流量聚合结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficAggregate {
    /// 每日去重访客（人类、非排除路径）
    pub daily_visitors: BucketSet<NaiveDate, String>,
    /// 每日浏览量（人类、非排除路径）
    pub daily_pageviews: Tally<NaiveDate>,
    /// 每日爬虫访问量（非排除路径）
    pub daily_scraper_pageviews: Tally<NaiveDate>,
    /// 每日订阅源去重地址（人类）
    pub daily_feed_hosts: BucketSet<NaiveDate, String>,
    pub blog_post_views: Tally<String>,
    pub countries: Tally<String>,
    pub browsers: Tally<String>,
    pub operating_systems: Tally<String>,
    pub utm_sources: Tally<String>,
    /// 最近 24 小时订阅源 User-Agent（包括爬虫）
    pub feed_user_agents: Tally<String>,
    pub referrers: Tally<String>,
    pub hourly: [u64; 24],
}

/// 单个工作线程的部分聚合
pub type PartialAggregate = TrafficAggregate;
/// 合并后的全局聚合
pub type GlobalAggregate = TrafficAggregate;

impl Default for TrafficAggregate {
    fn default() -> Self {
        Self {
            daily_visitors: BucketSet::new(),
            daily_pageviews: Tally::new(),
            daily_scraper_pageviews: Tally::new(),
            daily_feed_hosts: BucketSet::new(),
            blog_post_views: Tally::new(),
            countries: Tally::new(),
            browsers: Tally::new(),
            operating_systems: Tally::new(),
            utm_sources: Tally::new(),
            feed_user_agents: Tally::new(),
            referrers: Tally::new(),
            hourly: [0; 24],
        }
    }
}

impl TrafficAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 累加一条已分类的记录
    ///
    /// 浏览器、系统、小时和 UTM 来源对窗口内所有记录计数（包括爬虫和排除路径），
    /// 其余统计只针对未排除的路径。
    pub fn record(&mut self, c: Classification) {
        self.browsers.increment(c.browser);
        self.operating_systems.increment(c.os);
        if let Some(slot) = self.hourly.get_mut(c.hour as usize) {
            *slot += 1;
        }
        if let Some(source) = c.utm_source {
            self.utm_sources.increment(source);
        }

        if c.excluded {
            return;
        }

        if c.is_bot {
            self.daily_scraper_pageviews.increment(c.date);
        } else {
            self.daily_pageviews.increment(c.date);
            self.daily_visitors.insert(c.date, c.remote_host.clone());
            if let Some(slug) = c.slug {
                self.blog_post_views.increment(slug);
            }
            if let Some(country) = c.country.filter(|name| name != UNKNOWN) {
                self.countries.increment(country);
            }
            if let Some(host) = c.referrer_host {
                self.referrers.increment(host);
            }
        }

        if c.feed {
            if c.in_feed_window {
                let agent = if c.user_agent.is_empty() {
                    UNKNOWN.to_string()
                } else {
                    c.user_agent
                };
                self.feed_user_agents.increment(agent);
            }
            if !c.is_bot {
                self.daily_feed_hosts.insert(c.date, c.remote_host);
            }
        }
    }

    /// 合并另一个聚合：计数相加、集合取并集
    pub fn merge(&mut self, other: TrafficAggregate) {
        let TrafficAggregate {
            daily_visitors,
            daily_pageviews,
            daily_scraper_pageviews,
            daily_feed_hosts,
            blog_post_views,
            countries,
            browsers,
            operating_systems,
            utm_sources,
            feed_user_agents,
            referrers,
            hourly,
        } = other;

        self.daily_visitors.merge(daily_visitors);
        self.daily_pageviews.merge(daily_pageviews);
        self.daily_scraper_pageviews.merge(daily_scraper_pageviews);
        self.daily_feed_hosts.merge(daily_feed_hosts);
        self.blog_post_views.merge(blog_post_views);
        self.countries.merge(countries);
        self.browsers.merge(browsers);
        self.operating_systems.merge(operating_systems);
        self.utm_sources.merge(utm_sources);
        self.feed_user_agents.merge(feed_user_agents);
        self.referrers.merge(referrers);
        for (slot, n) in self.hourly.iter_mut().zip(hourly) {
            *slot += n;
        }
    }

    /// 合并任意数量的部分聚合
    pub fn merged<I: IntoIterator<Item = PartialAggregate>>(partials: I) -> GlobalAggregate {
        partials.into_iter().fold(Self::new(), |mut acc, partial| {
            acc.merge(partial);
            acc
        })
    }

    /// 没有任何记录时为 true
    pub fn is_empty(&self) -> bool {
        self.hourly.iter().all(|&n| n == 0)
    }
}
