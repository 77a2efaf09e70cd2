use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use thiserror::Error;

/// 单行解析结果类型
pub type ParseResult<T> = std::result::Result<T, ParseFailure>;

/// 解析失败原因
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailureKind {
    /// 行内容不符合 combined 日志格式
    #[error("不符合 combined 日志格式")]
    Grammar,
    /// 时间戳无法解析
    #[error("时间戳无法解析")]
    Timestamp,
    /// 请求行缺少方法或路径
    #[error("请求行缺少方法或路径")]
    Request,
}

/// 单行解析失败，非致命：该行被丢弃，处理继续
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {content}")]
pub struct ParseFailure {
    pub kind: ParseFailureKind,
    /// 原始内容（截断到前 [`ParseFailure::MAX_CONTENT`] 个字符）
    pub content: String,
}

impl ParseFailure {
    /// 错误中保留的原始内容最大字符数，避免日志膨胀
    pub const MAX_CONTENT: usize = 120;

    pub fn new(kind: ParseFailureKind, line: &str) -> Self {
        let content = match line.char_indices().nth(Self::MAX_CONTENT) {
            Some((idx, _)) => format!("{}...", &line[..idx]),
            None => line.to_string(),
        };
        Self { kind, content }
    }
}

/// 单条访问记录，解析完成后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestRecord {
    /// 请求时间（保留原始时区偏移）
    pub timestamp: DateTime<FixedOffset>,
    /// 客户端地址
    pub remote_host: String,
    /// 请求方法
    pub method: String,
    /// 请求路径（不含查询串）
    pub path: String,
    /// 查询串（不含 `?`），为空时为 None
    pub query: Option<String>,
    /// 协议版本
    pub protocol: Option<String>,
    /// 响应状态码
    pub status: Option<u16>,
    /// 响应字节数
    pub size: Option<u64>,
    /// Referer 头
    pub referrer: Option<String>,
    /// User-Agent 头，缺失时为空字符串
    pub user_agent: String,
}
