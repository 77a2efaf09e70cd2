//! 集成测试公共模块

#![allow(dead_code)]

use accesslog_analysis::analytics::AnalysisWindow;
use accesslog_analysis::config::Config;
use accesslog_analysis::enrichment::{GeoLookup, GeoResolver, ResolverFactory, UaClassifier, UaInfo};
use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// 测试窗口的终点：2025-03-10 12:00:00 UTC
pub fn now() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2025, 3, 10, 12, 0, 0)
        .unwrap()
}

/// 30 天回溯窗口
pub fn window() -> AnalysisWindow {
    AnalysisWindow::ending_at(now(), 30).unwrap()
}

/// 相对窗口终点若干小时前的时间
pub fn hours_ago(hours: i64) -> DateTime<FixedOffset> {
    now() - Duration::hours(hours)
}

/// 生成一行 combined 格式日志
pub fn log_line(
    ts: DateTime<FixedOffset>,
    host: &str,
    target: &str,
    referrer: &str,
    user_agent: &str,
) -> String {
    format!(
        "{host} - - [{}] \"GET {target} HTTP/1.1\" 200 512 \"{referrer}\" \"{user_agent}\"",
        ts.format("%d/%b/%Y:%H:%M:%S %z")
    )
}

/// 写入测试日志文件
pub fn write_log(dir: &TempDir, filename: &str, lines: &[String]) -> PathBuf {
    let file_path = dir.path().join(filename);
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(&file_path, content).expect("Failed to write test file");
    file_path
}

/// 测试配置：小分块，固定路径规则
pub fn test_config(thread_count: usize) -> Config {
    let mut config = Config::default();
    config.analytics.thread_count = thread_count;
    config.analytics.chunk_size = 7;
    config.paths.own_hosts = vec!["blog.example.org".to_string()];
    config
}

/// 按地址返回固定国家的 GeoIP 解析器
pub struct StubGeo;

impl GeoResolver for StubGeo {
    fn country(&self, host: &str) -> GeoLookup {
        match host {
            h if h.starts_with("10.") => GeoLookup::Found("Germany".to_string()),
            h if h.starts_with("172.") => GeoLookup::Found("Japan".to_string()),
            h if h.parse::<std::net::IpAddr>().is_err() => GeoLookup::Invalid,
            _ => GeoLookup::NotFound,
        }
    }
}

/// UA 中包含 `bot` 即为爬虫，浏览器名取第一个空格前的部分
pub struct StubUa;

impl UaClassifier for StubUa {
    fn classify(&self, user_agent: &str) -> UaInfo {
        if user_agent.is_empty() {
            return UaInfo::unknown();
        }
        UaInfo {
            browser: user_agent.split(' ').next().unwrap_or("Unknown").to_string(),
            os: "TestOS".to_string(),
            is_bot: user_agent.to_ascii_lowercase().contains("bot"),
        }
    }
}

pub struct StubResolvers;

impl ResolverFactory for StubResolvers {
    fn geo_resolver(&self) -> Box<dyn GeoResolver> {
        Box::new(StubGeo)
    }

    fn ua_classifier(&self) -> Box<dyn UaClassifier> {
        Box::new(StubUa)
    }
}

pub fn stub_resolvers() -> Arc<dyn ResolverFactory> {
    Arc::new(StubResolvers)
}

/// 一组覆盖各类统计的日志行
pub fn sample_lines() -> Vec<String> {
    vec![
        log_line(hours_ago(1), "10.0.0.1", "/blog/first-post?utm_source=hn", "https://news.ycombinator.com/item", "Firefox on linux"),
        log_line(hours_ago(2), "10.0.0.1", "/blog/first-post", "-", "Firefox on linux"),
        log_line(hours_ago(3), "172.16.0.5", "/blog/second%20post", "https://blog.example.org/", "Chrome on mac"),
        log_line(hours_ago(3), "172.16.0.5", "/static/app.css", "-", "Chrome on mac"),
        log_line(hours_ago(4), "66.249.66.1", "/blog/first-post", "-", "Googlebot/2.1"),
        log_line(hours_ago(5), "192.0.2.7", "/feed.xml", "-", "FeedReader 1.0"),
        log_line(hours_ago(6), "66.249.66.2", "/feed.xml", "-", "FeedBot 2.0"),
        log_line(hours_ago(30), "192.0.2.8", "/feed.xml", "-", "FeedReader 1.0"),
        log_line(hours_ago(48), "10.0.0.9", "/about?utm_source=&utm_source=newsletter", "-", ""),
        log_line(hours_ago(24 * 40), "10.0.0.1", "/blog/ancient", "-", "Firefox on linux"),
        "this line is garbage".to_string(),
    ]
}
