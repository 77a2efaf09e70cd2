//! combined 格式访问日志解析器
//!
//! 解析的行格式（nginx `combined` / Apache `%h %l %u %t \"%r\" %>s %b \"%{Referer}i\" \"%{User-Agent}i\"`）：
//!
//! ```text
//! 203.0.113.9 - - [19/Oct/2024:13:55:36 +0800] "GET /blog/hello?utm_source=hn HTTP/1.1" 200 5120 "https://news.ycombinator.com/" "Mozilla/5.0 ..."
//! ```
//!
//! 不符合格式的行返回 [`ParseFailure`]，调用方丢弃该行并继续处理。

use crate::accesslog::types::{ParseFailure, ParseFailureKind, ParseResult, RequestRecord};
use crate::accesslog::utils::{split_request_target, unescape_field};
use chrono::DateTime;
use lazy_static::lazy_static;
use regex::Regex;

/// 访问日志时间戳格式
pub const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

impl RequestRecord {
    /// 从单行文本解析出 `RequestRecord`。
    ///
    /// 行尾的换行符会被忽略；combined 字段之后的附加字段（如 `$request_time`）会被忽略。
    pub fn from_line(line: &str) -> ParseResult<Self> {
        lazy_static! {
            static ref COMBINED_RE: Regex = Regex::new(
                r#"^(\S+) \S+ \S+ \[([^\]]+)\] "((?:[^"\\]|\\.)*)" (\d{3}|-) (\d+|-) "((?:[^"\\]|\\.)*)" "((?:[^"\\]|\\.)*)""#
            ).unwrap();
        }

        let line = line.trim_end_matches(['\r', '\n']);
        let caps = COMBINED_RE
            .captures(line)
            .ok_or_else(|| ParseFailure::new(ParseFailureKind::Grammar, line))?;

        // 以下捕获组在正则匹配成功时必定存在
        let field = |i: usize| caps.get(i).map_or("", |m| m.as_str());

        let timestamp = DateTime::parse_from_str(field(2), TIMESTAMP_FORMAT)
            .map_err(|_| ParseFailure::new(ParseFailureKind::Timestamp, line))?;

        let request = unescape_field(field(3));
        let mut tokens = request.split_whitespace();
        let (Some(method), Some(target)) = (tokens.next(), tokens.next()) else {
            return Err(ParseFailure::new(ParseFailureKind::Request, line));
        };
        let protocol = tokens.next().map(str::to_string);
        let (path, query) = split_request_target(target);

        Ok(Self {
            timestamp,
            remote_host: field(1).to_string(),
            method: method.to_string(),
            path: path.to_string(),
            query: query.map(str::to_string),
            protocol,
            status: field(4).parse().ok(),
            size: field(5).parse().ok(),
            referrer: optional_field(field(6)),
            user_agent: optional_field(field(7)).unwrap_or_default(),
        })
    }
}

/// `-` 或空字段表示该值缺失
fn optional_field(raw: &str) -> Option<String> {
    match raw {
        "" | "-" => None,
        other => Some(unescape_field(other).into_owned()),
    }
}
