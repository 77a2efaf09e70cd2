//! 请求分类
//!
//! 把一条 [`RequestRecord`] 结合窗口、路径规则和外部解析器，
//! 转换为聚合所需的只读 [`Classification`]。

use crate::accesslog::RequestRecord;
use crate::accesslog::utils::{blog_slug, referrer_host, utm_source};
use crate::analytics::AnalysisWindow;
use crate::config::PathRules;
use crate::enrichment::{GeoLookup, GeoResolver, UNKNOWN, UaClassifier};
use chrono::{NaiveDate, Timelike};
use std::collections::HashSet;
use std::sync::Arc;

/// 编译后的路径规则
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    excluded_prefixes: Vec<String>,
    blog_post_prefixes: Vec<String>,
    feed_paths: HashSet<String>,
    own_hosts: HashSet<String>,
}

impl PathMatcher {
    pub fn new(rules: &PathRules) -> Self {
        Self {
            excluded_prefixes: rules.excluded_prefixes.clone(),
            blog_post_prefixes: rules.blog_post_prefixes.clone(),
            feed_paths: rules.feed_paths.iter().cloned().collect(),
            own_hosts: rules
                .own_hosts
                .iter()
                .map(|h| h.trim().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }

    /// 首个匹配的文章前缀生效
    pub fn blog_slug(&self, path: &str) -> Option<String> {
        blog_slug(path, &self.blog_post_prefixes)
    }

    /// 订阅源路径精确匹配
    pub fn is_feed(&self, path: &str) -> bool {
        self.feed_paths.contains(path)
    }

    pub fn is_own_host(&self, host: &str) -> bool {
        self.own_hosts.contains(host)
    }
}

/// 路径类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCategory {
    Excluded,
    BlogPost,
    Feed,
    Other,
}

/// 单条记录的分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// 日期桶（窗口时区）
    pub date: NaiveDate,
    /// 小时 0-23（窗口时区）
    pub hour: u32,
    pub remote_host: String,
    pub user_agent: String,
    pub is_bot: bool,
    pub browser: String,
    pub os: String,
    pub excluded: bool,
    /// 博客文章标识，不是文章时为 None
    pub slug: Option<String>,
    pub feed: bool,
    pub utm_source: Option<String>,
    /// 外部来源主机，本站域名和无法解析的 referrer 为 None
    pub referrer_host: Option<String>,
    pub in_feed_window: bool,
    /// 国家名；只对未排除的人类访问解析，Unknown 为 None
    pub country: Option<String>,
}

impl Classification {
    pub fn category(&self) -> PathCategory {
        if self.excluded {
            PathCategory::Excluded
        } else if self.slug.is_some() {
            PathCategory::BlogPost
        } else if self.feed {
            PathCategory::Feed
        } else {
            PathCategory::Other
        }
    }

    /// 计入访客与浏览量的人类内容访问
    pub fn is_human_content(&self) -> bool {
        !self.excluded && !self.is_bot
    }
}

/// 分类器，每个工作线程持有一个
pub struct Classifier {
    window: AnalysisWindow,
    matcher: Arc<PathMatcher>,
    geo: Box<dyn GeoResolver>,
    ua: Box<dyn UaClassifier>,
}

impl Classifier {
    pub fn new(
        window: AnalysisWindow,
        matcher: Arc<PathMatcher>,
        geo: Box<dyn GeoResolver>,
        ua: Box<dyn UaClassifier>,
    ) -> Self {
        Self { window, matcher, geo, ua }
    }

    pub fn window(&self) -> &AnalysisWindow {
        &self.window
    }

    /// 分类一条记录；早于回溯截止时间的记录返回 None
    pub fn classify(&self, record: &RequestRecord) -> Option<Classification> {
        if !self.window.contains(&record.timestamp) {
            return None;
        }

        let ua = self.ua.classify(&record.user_agent);
        let path = record.path.as_str();
        let excluded = self.matcher.is_excluded(path);
        let human_content = !excluded && !ua.is_bot;

        let country = if human_content {
            self.resolve_country(&record.remote_host)
        } else {
            None
        };

        let referrer_host = if human_content {
            record
                .referrer
                .as_deref()
                .and_then(referrer_host)
                .filter(|host| !self.matcher.is_own_host(host))
        } else {
            None
        };

        let local = self.window.local(&record.timestamp);
        Some(Classification {
            date: local.date_naive(),
            hour: local.hour(),
            remote_host: record.remote_host.clone(),
            user_agent: record.user_agent.clone(),
            is_bot: ua.is_bot,
            browser: ua.browser,
            os: ua.os,
            excluded,
            slug: self.matcher.blog_slug(path),
            feed: self.matcher.is_feed(path),
            utm_source: record.query.as_deref().and_then(utm_source),
            referrer_host,
            in_feed_window: self.window.in_feed_window(&record.timestamp),
            country,
        })
    }

    fn resolve_country(&self, host: &str) -> Option<String> {
        match self.geo.country(host) {
            GeoLookup::Found(name) if name != UNKNOWN => Some(name),
            GeoLookup::Failed(_reason) => {
                #[cfg(feature = "logging")]
                tracing::trace!("GeoIP 查询失败 {}: {}", host, _reason);
                None
            }
            _ => None,
        }
    }
}
