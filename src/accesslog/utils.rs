//! 访问日志解析的工具函数

use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use url::{Url, form_urlencoded};

/// 将读取到的行字节转换为字符串，有效 UTF-8 时不分配。
///
/// 无效字节序列被替换为 U+FFFD，不会中断解析流程。
pub fn line_to_str(line_bytes: &[u8]) -> Cow<'_, str> {
    let s = String::from_utf8_lossy(line_bytes);
    #[cfg(feature = "logging")]
    if matches!(s, Cow::Owned(_)) {
        tracing::trace!(len = line_bytes.len(), "发现无效 UTF-8 字节序列");
    }
    s
}

/// 还原日志中被转义的引号字段（`\"`、`\\`、`\xHH`）
pub fn unescape_field(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }

    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 == bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        match bytes[i + 1] {
            b'"' | b'\\' => {
                out.push(bytes[i + 1]);
                i += 2;
            }
            b'x' if i + 3 < bytes.len()
                && bytes[i + 2].is_ascii_hexdigit()
                && bytes[i + 3].is_ascii_hexdigit() =>
            {
                let hex = &raw[i + 2..i + 4];
                // 两位十六进制必定可以解析为 u8
                out.push(u8::from_str_radix(hex, 16).unwrap_or(b'?'));
                i += 4;
            }
            _ => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    Cow::Owned(String::from_utf8_lossy(&out).into_owned())
}

/// 将请求目标拆分为路径和查询串。
///
/// 绝对形式（`http://host/path?q`）只保留路径部分，片段（`#...`）被丢弃。
/// 查询串为空时返回 None。
pub fn split_request_target(target: &str) -> (&str, Option<&str>) {
    let target = target.split_once('#').map_or(target, |(t, _)| t);

    let rest = match authority_start(target) {
        Some(start) => {
            let after = &target[start..];
            after.find(['/', '?']).map_or("", |pos| &after[pos..])
        }
        None => target,
    };

    match rest.split_once('?') {
        Some((path, query)) if !query.is_empty() => (path, Some(query)),
        Some((path, _)) => (path, None),
        None => (rest, None),
    }
}

/// 若目标以 `scheme://` 或 `//` 开头，返回 authority 的起始位置
fn authority_start(target: &str) -> Option<usize> {
    if target.starts_with("//") {
        return Some(2);
    }
    let idx = target.find("://")?;
    let scheme = &target[..idx];
    let valid = scheme
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(idx + 3)
}

/// 去掉首个匹配的文章前缀并做百分号解码，得到文章标识。
///
/// 前缀按配置顺序检查，首个匹配生效（不是最长匹配）。
/// 没有任何前缀匹配时原样返回路径。
///
/// ```
/// use accesslog_analysis::accesslog::clean_slug;
///
/// let prefixes = ["/blog/2024/".to_string(), "/posts/".to_string()];
/// assert_eq!(clean_slug("/blog/2024/my-post%20title", &prefixes), "my-post title");
/// assert_eq!(clean_slug("/about", &["/blog/".to_string()]), "/about");
/// ```
pub fn clean_slug(path: &str, prefixes: &[String]) -> String {
    blog_slug(path, prefixes).unwrap_or_else(|| path.to_string())
}

/// 路径属于博客文章时返回解码后的文章标识，否则返回 None
pub fn blog_slug(path: &str, prefixes: &[String]) -> Option<String> {
    prefixes.iter().find_map(|prefix| {
        path.strip_prefix(prefix.as_str())
            .map(|rest| percent_decode_str(rest).decode_utf8_lossy().into_owned())
    })
}

/// 提取查询串中第一个非空的 `utm_source` 值
pub fn utm_source(query: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, value)| key == "utm_source" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

/// 提取 referrer 的主机名（小写），无法解析时返回 None
pub fn referrer_host(referrer: &str) -> Option<String> {
    Url::parse(referrer)
        .ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
        .filter(|host| !host.is_empty())
}
