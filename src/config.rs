//! 配置管理模块
//!
//! 提供统一的配置文件读取和管理功能。配置在流水线启动前加载一次，
//! 之后作为只读输入传递给各个阶段。

use crate::analytics::MAX_LOOKBACK_DAYS;
use crate::error::{AnalyticsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 主配置结构体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 日志配置
    pub log: LogConfig,
    /// 统计窗口与并发配置
    pub analytics: AnalyticsConfig,
    /// 日志文件来源配置
    pub sources: SourceConfig,
    /// 请求路径分类规则
    pub paths: PathRules,
    /// GeoIP 等外部查询配置
    pub enrichment: EnrichmentConfig,
    /// 报告输出配置
    pub output: OutputConfig,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// 是否启用控制台输出
    pub enable_stdout: bool,
    /// 日志输出目录
    pub log_dir: String,
    /// 日志级别 (trace, debug, info, warn, error)
    pub level: String,
}

/// 统计窗口与并发配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// 回溯窗口天数
    pub lookback_days: u32,
    /// 并发线程数，0 表示按可用 CPU 数
    pub thread_count: usize,
    /// 读取文件时的分块字节数
    pub chunk_size: usize,
    /// 热门文章榜单长度
    pub top_posts: usize,
}

/// 文件发现时使用的时效策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecencyMode {
    /// 按文件修改时间过滤
    #[serde(rename = "mtime")]
    ModifiedTime,
    /// 按文件名中嵌入的日期过滤
    NameDate,
    /// 不过滤，匹配的文件全部处理
    All,
}

/// 日志文件来源配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// 日志目录
    pub log_dir: String,
    /// 文件名匹配模式（glob，仅匹配文件名）
    pub file_pattern: String,
    /// 时效策略
    pub recency: RecencyMode,
    /// 从文件名提取日期的正则，必须恰好包含一个捕获组
    pub name_date_regex: String,
    /// 文件名日期的 chrono 格式
    pub name_date_format: String,
    /// 显式文件列表，非空时跳过目录扫描
    pub files: Vec<PathBuf>,
}

/// 请求路径分类规则
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathRules {
    /// 排除的路径前缀（静态资源等），按配置顺序匹配
    pub excluded_prefixes: Vec<String>,
    /// 博客文章路径前缀，按配置顺序首个匹配生效
    pub blog_post_prefixes: Vec<String>,
    /// 订阅源路径，精确匹配
    pub feed_paths: Vec<String>,
    /// 本站域名，来自这些域名的 referrer 不计入来源统计
    pub own_hosts: Vec<String>,
}

/// 外部查询配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// GeoIP 国家数据库（.mmdb）路径，未配置时所有地址视为 Unknown
    pub geoip_db: Option<PathBuf>,
}

/// 报告输出配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 报告输出目录
    pub output_dir: String,
    /// 报告文件名
    pub file_name: String,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// 从字符串加载配置
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        match self.log.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(AnalyticsError::config(format!(
                    "无效的日志级别: {}",
                    self.log.level
                )));
            }
        }

        if self.analytics.lookback_days == 0 {
            return Err(AnalyticsError::config("lookback_days 不能为0"));
        }
        if self.analytics.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(AnalyticsError::config(format!(
                "lookback_days 不能超过 {MAX_LOOKBACK_DAYS}: {}",
                self.analytics.lookback_days
            )));
        }
        if self.analytics.chunk_size == 0 {
            return Err(AnalyticsError::config("chunk_size 不能为0"));
        }
        if self.analytics.top_posts == 0 {
            return Err(AnalyticsError::config("top_posts 不能为0"));
        }

        glob::Pattern::new(&self.sources.file_pattern)?;
        if self.sources.recency == RecencyMode::NameDate {
            let re = regex::Regex::new(&self.sources.name_date_regex)?;
            // captures_len 包含整体匹配的第 0 组
            if re.captures_len() != 2 {
                return Err(AnalyticsError::config(format!(
                    "name_date_regex 必须恰好包含一个捕获组: {}",
                    self.sources.name_date_regex
                )));
            }
        }

        for (name, list) in [
            ("blog_post_prefixes", &self.paths.blog_post_prefixes),
            ("feed_paths", &self.paths.feed_paths),
        ] {
            if let Some(bad) = list.iter().find(|p| !p.starts_with('/')) {
                return Err(AnalyticsError::config(format!(
                    "{name} 中的路径必须以 / 开头: {bad:?}"
                )));
            }
        }

        if self.output.file_name.trim().is_empty() {
            return Err(AnalyticsError::config("output.file_name 不能为空"));
        }

        #[cfg(feature = "logging")]
        if self.paths.blog_post_prefixes.is_empty() {
            tracing::warn!("没有配置任何博客文章前缀，热门文章榜单将为空");
        }

        Ok(())
    }
}

impl AnalyticsConfig {
    /// 实际使用的工作线程数，不超过文件数
    pub fn worker_count(&self, file_count: usize) -> usize {
        let threads = match self.thread_count {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            n => n,
        };
        threads.min(file_count)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enable_stdout: true,
            log_dir: "logs".to_string(),
            level: "info".to_string(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            thread_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            chunk_size: 64 * 1024,
            top_posts: 10,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            log_dir: "/var/log/nginx".to_string(),
            file_pattern: "access.log*".to_string(),
            recency: RecencyMode::ModifiedTime,
            name_date_regex: r"(\d{8})".to_string(),
            name_date_format: "%Y%m%d".to_string(),
            files: Vec::new(),
        }
    }
}

impl Default for PathRules {
    fn default() -> Self {
        Self {
            excluded_prefixes: vec![
                "/static/".to_string(),
                "/assets/".to_string(),
                "/favicon.ico".to_string(),
                "/robots.txt".to_string(),
            ],
            blog_post_prefixes: vec!["/blog/".to_string()],
            feed_paths: vec!["/feed.xml".to_string(), "/rss.xml".to_string()],
            own_hosts: Vec::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: "public".to_string(),
            file_name: "report.json".to_string(),
        }
    }
}
