#![cfg(feature = "logging")]

use accesslog_analysis::config::LogConfig;
use accesslog_analysis::logging::init_logging;
use tempfile::TempDir;

/// 测试日志初始化会创建日志目录，重复调用不报错
#[test]
fn test_init_logging_creates_dir_and_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let log_dir = dir.path().join("nested").join("logs");
    let config = LogConfig {
        enable_stdout: false,
        log_dir: log_dir.to_string_lossy().into_owned(),
        level: "debug".to_string(),
    };

    assert!(init_logging(&config).is_ok());
    assert!(log_dir.is_dir());

    // 第二次调用只确保目录存在
    let other = LogConfig {
        log_dir: dir.path().join("other").to_string_lossy().into_owned(),
        ..config.clone()
    };
    assert!(init_logging(&other).is_ok());
    assert!(init_logging(&config).is_ok());
}
