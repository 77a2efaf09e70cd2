//! 端到端聚合流水线测试

mod common;

use accesslog_analysis::analytics::{GlobalAggregate, RankedEntry};
use accesslog_analysis::concurrent::ConcurrentAggregator;
use accesslog_analysis::process::aggregate_with;
use chrono::{FixedOffset, NaiveDate};
use common::*;
use tempfile::TempDir;

fn names(entries: &[RankedEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.name.as_str()).collect()
}

fn aggregate_partitioned(parts: &[&[String]], thread_count: usize) -> GlobalAggregate {
    let dir = TempDir::new().unwrap();
    let files: Vec<_> = parts
        .iter()
        .enumerate()
        .map(|(i, lines)| write_log(&dir, &format!("access.log.{i}"), lines))
        .collect();
    let aggregator = ConcurrentAggregator::new(&test_config(thread_count), stub_resolvers());
    aggregator.aggregate_files(&files, &window()).0
}

#[test]
fn test_sample_report() {
    let dir = TempDir::new().unwrap();
    let file = write_log(&dir, "access.log", &sample_lines());
    let report = aggregate_with(&[file], &test_config(2), &window(), stub_resolvers());

    let last = report.daily_dates.len() - 1;
    assert_eq!(report.daily_dates[last], "2025-03-10");
    assert_eq!(report.daily_pageviews[last - 2..], [1, 1, 4]);
    assert_eq!(report.daily_visitors[last - 2..], [1, 1, 3]);
    assert_eq!(report.daily_scraper_pageviews[last], 2);
    assert_eq!(report.daily_feed_unique[last - 1..], [1, 1]);

    assert_eq!(names(&report.top_posts), vec!["first-post", "second post"]);
    assert_eq!(report.top_posts[0].count, 2);
    assert_eq!(
        names(&report.browsers),
        vec!["Chrome", "FeedReader", "Firefox", "FeedBot", "Googlebot/2.1", "Unknown"]
    );
    assert_eq!(names(&report.operating_systems), vec!["TestOS", "Unknown"]);
    assert_eq!(names(&report.utm_sources), vec!["hn", "newsletter"]);
    assert_eq!(names(&report.feed_user_agents), vec!["FeedBot 2.0", "FeedReader 1.0"]);
    assert_eq!(names(&report.referrers), vec!["news.ycombinator.com"]);

    let countries: Vec<_> = report.countries.iter().map(|c| (c.name.as_str(), c.value)).collect();
    assert_eq!(countries, vec![("Germany", 3), ("Japan", 1)]);

    assert_eq!(report.hourly[6], 2);
    assert_eq!(report.hourly[9], 2);
    assert_eq!(report.hourly.iter().sum::<u64>(), 9);

    assert_eq!(report.stats.files_discovered, 1);
    assert_eq!(report.stats.files_processed, 1);
    assert_eq!(report.stats.lines_read, 11);
    assert_eq!(report.stats.lines_parsed, 10);
    assert_eq!(report.stats.parse_failures, 1);
    assert_eq!(report.stats.records_outside_window, 1);
}

#[test]
fn test_partitioning_and_worker_count_do_not_matter() {
    let lines = sample_lines();
    let single = aggregate_partitioned(&[lines.as_slice()], 1);

    let (a, rest) = lines.split_at(3);
    let (b, c) = rest.split_at(4);
    for threads in [0, 1, 2, 8] {
        assert_eq!(aggregate_partitioned(&[a, b, c], threads), single, "threads = {threads}");
        assert_eq!(aggregate_partitioned(&[c, a, b], threads), single, "threads = {threads}");
    }
}

#[test]
fn test_merge_is_associative() {
    let lines = sample_lines();
    let (a, rest) = lines.split_at(4);
    let (b, c) = rest.split_at(3);
    let pa = aggregate_partitioned(&[a], 1);
    let pb = aggregate_partitioned(&[b], 1);
    let pc = aggregate_partitioned(&[c], 1);

    let mut left = pa.clone();
    left.merge(pb.clone());
    left.merge(pc.clone());

    let mut bc = pb;
    bc.merge(pc);
    let mut right = pa;
    right.merge(bc);

    assert_eq!(left, right);
    assert_eq!(left, aggregate_partitioned(&[lines.as_slice()], 1));
}

#[test]
fn test_feed_fixtures() {
    let lines = vec![
        log_line(hours_ago(1), "198.51.100.1", "/feed.xml", "-", "NewsBot 1.0"),
        log_line(hours_ago(2), "198.51.100.2", "/feed.xml", "-", "Reader 2.0"),
        log_line(hours_ago(25), "198.51.100.3", "/rss.xml", "-", "Reader 2.0"),
    ];
    let agg = aggregate_partitioned(&[lines.as_slice()], 1);

    assert_eq!(agg.feed_user_agents.get("NewsBot 1.0"), 1);
    assert_eq!(agg.feed_user_agents.get("Reader 2.0"), 1);

    let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let yesterday = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
    assert_eq!(agg.daily_feed_hosts.count(&today), 1);
    assert!(agg.daily_feed_hosts.contains(&today, &"198.51.100.2".to_string()));
    assert_eq!(agg.daily_feed_hosts.count(&yesterday), 1);
    assert_eq!(agg.daily_scraper_pageviews.get(&today), 1);
}

#[test]
fn test_recency_boundary_in_pipeline() {
    let cutoff = window().cutoff();
    let lines = vec![
        log_line(cutoff, "10.1.1.1", "/", "-", "Firefox"),
        log_line(cutoff - chrono::Duration::seconds(1), "10.1.1.2", "/", "-", "Firefox"),
    ];
    let dir = TempDir::new().unwrap();
    let file = write_log(&dir, "access.log", &lines);
    let report = aggregate_with(&[file], &test_config(1), &window(), stub_resolvers());

    // 截止时刻是日期序列第一天的零点，保留的记录一定出现在日期序列里
    assert_eq!(report.daily_dates[0], "2025-02-09");
    assert_eq!(report.daily_pageviews[0], 1);
    assert_eq!(report.daily_pageviews.iter().sum::<u64>(), 1);
    assert_eq!(report.daily_visitors[0], 1);
    assert_eq!(report.hourly[0], 1);
    assert_eq!(report.stats.records_outside_window, 1);
}

#[test]
fn test_other_offsets_bucket_into_window_dates() {
    // 窗口第一天零点，以 -05:00 书写时是前一天 19 点
    let west = FixedOffset::west_opt(5 * 3600).unwrap();
    let lines = vec![
        log_line(window().cutoff().with_timezone(&west), "10.2.2.1", "/", "-", "Firefox"),
        log_line(now().with_timezone(&west), "10.2.2.2", "/", "-", "Firefox"),
    ];
    let dir = TempDir::new().unwrap();
    let file = write_log(&dir, "access.log", &lines);
    let report = aggregate_with(&[file], &test_config(1), &window(), stub_resolvers());

    assert_eq!(report.daily_pageviews[0], 1);
    assert_eq!(report.daily_pageviews[29], 1);
    assert_eq!(report.hourly[0], 1);
    assert_eq!(report.hourly[12], 1);
}

#[test]
fn test_unreadable_file_is_skipped() {
    let dir = TempDir::new().unwrap();
    let good = write_log(&dir, "access.log", &sample_lines());
    let missing = dir.path().join("access.log.gone");
    let report = aggregate_with(&[missing, good], &test_config(2), &window(), stub_resolvers());

    assert_eq!(report.stats.files_discovered, 2);
    assert_eq!(report.stats.files_skipped, 1);
    assert_eq!(report.stats.files_processed, 1);
    assert_eq!(report.top_posts[0].name, "first-post");
}

#[test]
fn test_empty_input_gives_zero_report() {
    let report = aggregate_with(&[], &test_config(4), &window(), stub_resolvers());
    assert_eq!(report.daily_dates.len(), 30);
    assert!(report.daily_visitors.iter().all(|&n| n == 0));
    assert!(report.daily_scraper_pageviews.iter().all(|&n| n == 0));
    assert_eq!(report.hourly, [0; 24]);
    assert!(report.browsers.is_empty());
    assert!(report.feed_user_agents.is_empty());
    assert!(report.is_empty());

    let dir = TempDir::new().unwrap();
    let blank = write_log(&dir, "access.log", &[]);
    let report = aggregate_with(&[blank], &test_config(1), &window(), stub_resolvers());
    assert!(report.is_empty());
    assert_eq!(report.stats.files_processed, 1);
}

#[test]
fn test_report_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let file = write_log(&dir, "access.log", &sample_lines());
    let first = aggregate_with(&[file.clone()], &test_config(3), &window(), stub_resolvers());
    let second = aggregate_with(&[file], &test_config(1), &window(), stub_resolvers());

    assert_eq!(first.browsers, second.browsers);
    assert_eq!(first.top_posts, second.top_posts);
    assert_eq!(first.countries, second.countries);
    assert_eq!(first.daily_visitors, second.daily_visitors);
}
