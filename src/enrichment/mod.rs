//! 外部查询：GeoIP 国家解析与 User-Agent 分类
//!
//! 每个工作线程通过共享的只读 [`ResolverFactory`] 构建自己的解析器实例。

pub mod geoip;
pub mod user_agent;

pub use geoip::{GeoLookup, GeoResolver, NullGeoResolver};
#[cfg(feature = "geoip")]
pub use geoip::MaxMindResolver;
pub use user_agent::{UNKNOWN, UaClassifier, UaInfo, WootheeClassifier};

use crate::config::EnrichmentConfig;

/// 为工作线程构建解析器的工厂，在线程间共享
pub trait ResolverFactory: Send + Sync {
    fn geo_resolver(&self) -> Box<dyn GeoResolver>;
    fn ua_classifier(&self) -> Box<dyn UaClassifier>;
}

/// 默认工厂：配置了数据库时使用 MaxMind，否则使用 [`NullGeoResolver`]；UA 使用 woothee
///
/// 数据库在创建工厂时打开一次，各线程的解析器共享同一份映射。
#[derive(Clone, Default)]
pub struct StandardResolvers {
    #[cfg(feature = "geoip")]
    geo: Option<MaxMindResolver>,
}

impl StandardResolvers {
    /// 数据库打不开时记录警告，退回 [`NullGeoResolver`]
    pub fn new(config: &EnrichmentConfig) -> Self {
        #[cfg(feature = "geoip")]
        let geo = config.geoip_db.as_ref().and_then(|path| match MaxMindResolver::open(path) {
            Ok(resolver) => Some(resolver),
            Err(_e) => {
                #[cfg(feature = "logging")]
                tracing::warn!("GeoIP 数据库不可用，所有地址记为 Unknown: {}", _e);
                None
            }
        });

        #[cfg(not(feature = "geoip"))]
        if config.geoip_db.is_some() {
            #[cfg(feature = "logging")]
            tracing::warn!("未启用 geoip feature，忽略 geoip_db 配置");
        }

        Self {
            #[cfg(feature = "geoip")]
            geo,
        }
    }
}

impl ResolverFactory for StandardResolvers {
    fn geo_resolver(&self) -> Box<dyn GeoResolver> {
        #[cfg(feature = "geoip")]
        if let Some(resolver) = &self.geo {
            return Box::new(resolver.clone());
        }
        Box::new(NullGeoResolver)
    }

    fn ua_classifier(&self) -> Box<dyn UaClassifier> {
        Box::new(WootheeClassifier::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_database_falls_back_to_null() {
        let factory = StandardResolvers::new(&EnrichmentConfig {
            geoip_db: Some(PathBuf::from("/no/such/db.mmdb")),
        });
        assert_eq!(factory.geo_resolver().country("8.8.8.8"), GeoLookup::NotFound);
        assert!(!factory.ua_classifier().classify("").is_bot);
    }

    #[test]
    fn test_unconfigured_database_uses_null() {
        let factory = StandardResolvers::new(&EnrichmentConfig::default());
        assert_eq!(factory.geo_resolver().country("not-an-ip"), GeoLookup::Invalid);
    }
}
