//! GeoIP 国家解析
//!
//! 解析结果总是显式的 [`GeoLookup`]，调用方据此决定记为国家名还是 Unknown，
//! 不依赖吞掉异常的兜底逻辑。

use std::net::IpAddr;

/// 单次国家查询的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoLookup {
    /// 查到国家名
    Found(String),
    /// 地址合法，但数据库中没有对应国家
    NotFound,
    /// 远端地址不是合法的 IP
    Invalid,
    /// 数据库查询出错
    Failed(String),
}

impl GeoLookup {
    /// 查到的国家名，其余情况为 None
    pub fn country_name(&self) -> Option<&str> {
        match self {
            GeoLookup::Found(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

/// IP → 国家名解析器
pub trait GeoResolver {
    fn country(&self, host: &str) -> GeoLookup;
}

/// 未配置数据库时使用：合法地址一律 NotFound
#[derive(Debug, Default, Clone, Copy)]
pub struct NullGeoResolver;

impl GeoResolver for NullGeoResolver {
    fn country(&self, host: &str) -> GeoLookup {
        match host.parse::<IpAddr>() {
            Ok(_) => GeoLookup::NotFound,
            Err(_) => GeoLookup::Invalid,
        }
    }
}

#[cfg(feature = "geoip")]
pub use maxmind::MaxMindResolver;

#[cfg(feature = "geoip")]
mod maxmind {
    use super::{GeoLookup, GeoResolver};
    use crate::error::{AnalyticsError, Result};
    use maxminddb::PathElement;
    use std::net::IpAddr;
    use std::path::Path;
    use std::sync::Arc;

    /// 基于 MaxMind `.mmdb` 国家/城市数据库的解析器，只读
    ///
    /// 克隆只复制引用，所有工作线程共享同一份内存映射。
    #[derive(Clone)]
    pub struct MaxMindResolver {
        reader: Arc<maxminddb::Reader<maxminddb::Mmap>>,
    }

    impl MaxMindResolver {
        /// 以内存映射方式打开数据库文件
        ///
        /// # Errors
        /// 文件不存在或不是合法的 mmdb 时返回 `AnalyticsError::Geo`
        pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
            let path = path.as_ref();
            // SAFETY: 数据库以只读方式映射，运行期间不会被本进程修改
            let reader = unsafe { maxminddb::Reader::open_mmap(path) }.map_err(|e| {
                AnalyticsError::geo(format!("无法打开 GeoIP 数据库 {}: {}", path.display(), e))
            })?;
            Ok(Self { reader: Arc::new(reader) })
        }
    }

    impl GeoResolver for MaxMindResolver {
        fn country(&self, host: &str) -> GeoLookup {
            let Ok(ip) = host.parse::<IpAddr>() else {
                return GeoLookup::Invalid;
            };

            let lookup = match self.reader.lookup(ip) {
                Ok(lookup) => lookup,
                Err(e) => return GeoLookup::Failed(e.to_string()),
            };

            match lookup.decode_path::<String>(&[
                PathElement::Key("country"),
                PathElement::Key("names"),
                PathElement::Key("en"),
            ]) {
                Ok(Some(name)) if !name.is_empty() => GeoLookup::Found(name),
                Ok(_) => GeoLookup::NotFound,
                Err(e) => GeoLookup::Failed(e.to_string()),
            }
        }
    }

}
