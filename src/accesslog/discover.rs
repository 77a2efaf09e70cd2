//! 日志文件发现
//!
//! 在日志目录中按文件名模式与时效策略筛选候选文件，结果按新到旧排序，
//! 时间相同的按路径升序，保证顺序确定。

use crate::analytics::AnalysisWindow;
use crate::config::{RecencyMode, SourceConfig};
use crate::error::Result;
use chrono::NaiveDate;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// 文件时效策略
#[derive(Debug, Clone)]
pub enum RecencyPolicy {
    /// 文件修改时间不早于 `cutoff` 的保留
    ModifiedTime { cutoff: SystemTime },
    /// 文件名中嵌入的日期不早于 `cutoff` 的保留；
    /// `regex` 的第一个捕获组按 `format` 解析为日期
    NameDate {
        regex: Regex,
        format: String,
        cutoff: NaiveDate,
    },
    /// 全部保留
    All,
}

/// 用于排序的文件时间标记，同一策略下只会出现同一种变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum FileStamp {
    Unstamped,
    Modified(SystemTime),
    Named(NaiveDate),
}

impl RecencyPolicy {
    /// 根据来源配置和本次运行的窗口构建策略
    pub fn from_config(sources: &SourceConfig, window: &AnalysisWindow) -> Result<Self> {
        Ok(match sources.recency {
            RecencyMode::ModifiedTime => RecencyPolicy::ModifiedTime {
                cutoff: SystemTime::from(window.cutoff()),
            },
            RecencyMode::NameDate => RecencyPolicy::NameDate {
                regex: Regex::new(&sources.name_date_regex)?,
                format: sources.name_date_format.clone(),
                cutoff: window.cutoff_date(),
            },
            RecencyMode::All => RecencyPolicy::All,
        })
    }

    /// 返回文件的时间标记；文件不满足策略时返回 None
    fn stamp(&self, path: &Path, name: &str) -> Option<FileStamp> {
        match self {
            RecencyPolicy::All => Some(FileStamp::Unstamped),
            RecencyPolicy::ModifiedTime { cutoff } => {
                let modified = match path.metadata().and_then(|m| m.modified()) {
                    Ok(t) => t,
                    Err(_e) => {
                        #[cfg(feature = "logging")]
                        tracing::debug!("无法读取文件修改时间 {}: {}", path.display(), _e);
                        return None;
                    }
                };
                (modified >= *cutoff).then_some(FileStamp::Modified(modified))
            }
            RecencyPolicy::NameDate { regex, format, cutoff } => {
                let date = regex
                    .captures(name)
                    .and_then(|caps| caps.get(1))
                    .and_then(|m| NaiveDate::parse_from_str(m.as_str(), format).ok());
                match date {
                    Some(date) => (date >= *cutoff).then_some(FileStamp::Named(date)),
                    None => {
                        #[cfg(feature = "logging")]
                        tracing::debug!("文件名中没有可解析的日期，跳过: {}", name);
                        None
                    }
                }
            }
        }
    }
}

/// 在 `dir` 中查找文件名匹配 `pattern` 且满足时效策略的文件
///
/// 目录不存在时返回空列表；非普通文件和文件名不是 UTF-8 的条目被忽略。
///
/// # Errors
/// - `AnalyticsError::Pattern` - 文件名模式无效
/// - `AnalyticsError::Io` - 目录存在但无法读取
pub fn discover_files<P: AsRef<Path>>(
    dir: P,
    pattern: &str,
    policy: &RecencyPolicy,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let pattern = glob::Pattern::new(pattern)?;

    if !dir.is_dir() {
        #[cfg(feature = "logging")]
        tracing::warn!("日志目录不存在: {}", dir.display());
        return Ok(Vec::new());
    }

    let mut candidates: Vec<(FileStamp, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !pattern.matches(name) {
            continue;
        }
        if let Some(stamp) = policy.stamp(&path, name) {
            candidates.push((stamp, path));
        }
    }

    candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    #[cfg(feature = "logging")]
    tracing::info!(
        "在 {} 中发现 {} 个候选日志文件",
        dir.display(),
        candidates.len()
    );

    Ok(candidates.into_iter().map(|(_, path)| path).collect())
}
