//! 错误类型定义
//!
//! 这个模块定义了库中使用的所有错误类型，使用 thiserror 提供丰富的错误信息。
//! 单行解析失败与单文件读取失败都在流水线内部被吸收，只有配置错误会终止运行。

/// 访问日志分析的结果类型
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// 访问日志分析错误类型
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// 正则表达式错误
    #[error("正则表达式错误: {0}")]
    Regex(#[from] regex::Error),

    /// 文件名匹配模式错误
    #[error("文件匹配模式错误: {0}")]
    Pattern(#[from] glob::PatternError),

    /// 配置文件解析错误
    #[error("配置文件解析错误: {0}")]
    Toml(#[from] toml::de::Error),

    /// 配置序列化错误
    #[error("配置序列化错误: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON 序列化错误
    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// GeoIP 数据库错误
    #[error("GeoIP 错误: {0}")]
    Geo(String),

    /// 日志错误（仅在启用 logging feature 时可用）
    #[cfg(feature = "logging")]
    #[error("日志错误: {0}")]
    Log(#[from] crate::logging::LogError),

    /// 其他错误
    #[error("未知错误: {0}")]
    Other(String),
}

impl AnalyticsError {
    /// 创建一个配置错误
    pub fn config<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        #[cfg(feature = "logging")]
        tracing::error!("配置错误: {}", message);
        Self::Config(message)
    }

    /// 创建一个 GeoIP 错误
    pub fn geo<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        #[cfg(feature = "logging")]
        tracing::warn!("GeoIP 错误: {}", message);
        Self::Geo(message)
    }

    /// 创建一个其他类型错误
    pub fn other<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        #[cfg(feature = "logging")]
        tracing::error!("未知错误: {}", message);
        Self::Other(message)
    }

    /// 检查是否为 IO 错误
    pub fn is_io_error(&self) -> bool {
        matches!(self, AnalyticsError::Io(_))
    }

    /// 检查是否为配置错误（包括配置文件解析失败）
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            AnalyticsError::Config(_)
                | AnalyticsError::Toml(_)
                | AnalyticsError::Regex(_)
                | AnalyticsError::Pattern(_)
        )
    }

    /// 检查是否为其他错误
    pub fn is_other_error(&self) -> bool {
        matches!(self, AnalyticsError::Other(_))
    }
}
