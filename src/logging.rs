//! 日志初始化和配置模块
//!
//! 这个模块提供了统一的日志初始化功能，使用 tracing 库。
//! 输出到控制台（可关闭）和配置的日志目录，按天滚动。

use crate::config::LogConfig;
use std::io;
use std::sync::Once;
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, time::SystemTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// 日志文件名前缀
const LOG_FILE_PREFIX: &str = "accesslog-analysis";

static INIT_LOGGER: Once = Once::new();

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),
    #[error("日志配置错误: {0}")]
    Config(String),
}

/// 日志初始化结果
pub type LogResult<T> = Result<T, LogError>;

/// 初始化日志系统
///
/// - 环境变量 `RUST_LOG` 优先，否则使用配置中的级别
/// - `enable_stdout` 控制是否输出到控制台
/// - 文件按天滚动写入 `log_dir`
///
/// 重复调用是安全的：只有第一次调用会真正安装订阅者。
///
/// # Examples
///
/// ```no_run
/// use accesslog_analysis::config::LogConfig;
/// use accesslog_analysis::logging::init_logging;
///
/// init_logging(&LogConfig::default()).unwrap();
/// ```
pub fn init_logging(config: &LogConfig) -> LogResult<()> {
    if config.log_dir.trim().is_empty() {
        return Err(LogError::Config("log_dir 不能为空".to_string()));
    }
    std::fs::create_dir_all(&config.log_dir)?;

    let mut result = Ok(());
    INIT_LOGGER.call_once(|| {
        result = install_subscriber(config);
    });
    result
}

fn install_subscriber(config: &LogConfig) -> LogResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let console_layer = config.enable_stdout.then(|| {
        fmt::layer()
            .with_timer(SystemTime)
            .with_target(true)
            .with_thread_names(true)
            .with_ansi(true)
    });

    let file_appender =
        tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_timer(SystemTime)
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_ansi(false); // 文件中不使用颜色

    match Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        Ok(()) => {
            // 进程生命周期内保留 guard，否则后台写线程会提前退出
            std::mem::forget(guard);
            tracing::info!(
                "日志系统初始化完成 - 级别: {}, 目录: {}",
                config.level,
                config.log_dir
            );
            Ok(())
        }
        // 已经被其他地方初始化过了，这不是错误
        Err(_) => Ok(()),
    }
}
