use accesslog_analysis::config::Config;
use accesslog_analysis::process::run;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// Web 访问日志流量统计
#[derive(Debug, Parser)]
#[command(name = "accesslog-cli", version, about)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// 覆盖回溯天数
    #[arg(short, long)]
    days: Option<u32>,

    /// 覆盖工作线程数（0 表示按可用 CPU 数）
    #[arg(short, long)]
    threads: Option<usize>,

    /// 覆盖报告输出目录
    #[arg(short, long)]
    output: Option<String>,

    /// 打印默认配置并退出
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", toml::to_string_pretty(&Config::default())?);
        return Ok(());
    }

    let mut config = if cli.config.exists() {
        Config::from_file(&cli.config)
            .with_context(|| format!("无法加载配置文件 {}", cli.config.display()))?
    } else {
        eprintln!("配置文件 {} 不存在，使用默认配置", cli.config.display());
        Config::default()
    };

    if let Some(days) = cli.days {
        config.analytics.lookback_days = days;
    }
    if let Some(threads) = cli.threads {
        config.analytics.thread_count = threads;
    }
    if let Some(output) = cli.output {
        config.output.output_dir = output;
    }
    config.validate().context("配置无效")?;

    #[cfg(feature = "logging")]
    accesslog_analysis::logging::init_logging(&config.log).context("日志初始化失败")?;

    let report_path = run(&config).context("分析失败")?;
    println!("报告已生成: {}", report_path.display());
    Ok(())
}
