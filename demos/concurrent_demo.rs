//! 并发聚合示例
//!
//! 生成几份 access log，用多个工作线程聚合后打印报告摘要。

use accesslog_analysis::analytics::AnalysisWindow;
use accesslog_analysis::config::Config;
use accesslog_analysis::process::aggregate;
use chrono::Duration;
use std::fs;
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== 并发聚合示例 ===\n");

    let window = AnalysisWindow::current(7)?;
    let dir = tempfile::tempdir()?;

    let agents = [
        "Mozilla/5.0 (X11; Linux x86_64; rv:131.0) Gecko/20100101 Firefox/131.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
        "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)",
    ];
    let paths = ["/blog/hello-world", "/blog/rust-threads?utm_source=hn", "/feed.xml", "/static/site.css"];

    let mut files = Vec::new();
    for file_index in 0..4 {
        let mut content = String::new();
        for i in 0..500u32 {
            let ts = window.now() - Duration::minutes(i64::from(i * 17 + file_index * 5));
            content.push_str(&format!(
                "203.0.113.{} - - [{}] \"GET {} HTTP/1.1\" 200 1024 \"https://news.ycombinator.com/\" \"{}\"\n",
                i % 50,
                ts.format("%d/%b/%Y:%H:%M:%S %z"),
                paths[(i as usize) % paths.len()],
                agents[(i as usize + file_index as usize) % agents.len()],
            ));
        }
        let path = dir.path().join(format!("access.log.{file_index}"));
        fs::write(&path, content)?;
        files.push(path);
    }

    let mut config = Config::default();
    config.analytics.lookback_days = 7;
    config.analytics.thread_count = 4;

    let start = Instant::now();
    let report = aggregate(&files, &config, &window);

    println!("处理耗时: {:?}", start.elapsed());
    println!("统计: {}", report.stats);
    println!("日期: {:?}", report.daily_dates);
    println!("每日访客: {:?}", report.daily_visitors);
    println!("每日爬虫访问: {:?}", report.daily_scraper_pageviews);
    for entry in &report.top_posts {
        println!("  {:<24} {}", entry.name, entry.count);
    }
    println!("浏览器: {:?}", report.browsers);

    Ok(())
}
