//! User-Agent 分类
//!
//! 把 User-Agent 字符串归类为浏览器族、操作系统族以及是否为爬虫。

use woothee::parser::Parser;

/// 无法识别时使用的名称
pub const UNKNOWN: &str = "Unknown";

/// User-Agent 分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UaInfo {
    pub browser: String,
    pub os: String,
    pub is_bot: bool,
}

impl UaInfo {
    /// 无法识别的 User-Agent：非爬虫，浏览器与系统均为 Unknown
    pub fn unknown() -> Self {
        Self {
            browser: UNKNOWN.to_string(),
            os: UNKNOWN.to_string(),
            is_bot: false,
        }
    }
}

/// User-Agent 分类器
pub trait UaClassifier {
    fn classify(&self, user_agent: &str) -> UaInfo;
}

/// 基于 woothee 规则库的分类器
pub struct WootheeClassifier {
    parser: Parser,
}

impl WootheeClassifier {
    pub fn new() -> Self {
        Self { parser: Parser::new() }
    }
}

impl Default for WootheeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl UaClassifier for WootheeClassifier {
    fn classify(&self, user_agent: &str) -> UaInfo {
        if user_agent.trim().is_empty() {
            return UaInfo::unknown();
        }
        let Some(result) = self.parser.parse(user_agent) else {
            return UaInfo::unknown();
        };

        UaInfo {
            browser: family(&result.name),
            os: family(&result.os),
            is_bot: result.category == "crawler",
        }
    }
}

/// woothee 用 `UNKNOWN` 表示无法识别
fn family(raw: &str) -> String {
    match raw.trim() {
        "" | "UNKNOWN" => UNKNOWN.to_string(),
        name => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_user_agent_is_unknown_human() {
        let c = WootheeClassifier::new();
        assert_eq!(c.classify(""), UaInfo::unknown());
        assert_eq!(c.classify("   "), UaInfo::unknown());
    }

    #[test]
    fn test_crawler_is_bot() {
        let c = WootheeClassifier::new();
        let info = c.classify(
            "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)",
        );
        assert!(info.is_bot);
    }

    #[test]
    fn test_desktop_browser() {
        let c = WootheeClassifier::new();
        let info = c.classify(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        );
        assert!(!info.is_bot);
        assert_eq!(info.browser, "Chrome");
        assert_ne!(info.os, UNKNOWN);
    }

    #[test]
    fn test_family_normalizes_unknown() {
        assert_eq!(family("UNKNOWN"), UNKNOWN);
        assert_eq!(family("Firefox"), "Firefox");
    }
}
