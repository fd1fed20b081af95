// ==========================================
// Rebaixa Pro - 配置管理器
// ==========================================
// 职责: 配置加载、覆写、保存
// 存储: kv_store 表，整体 JSON 值
// ==========================================

use crate::config::app_config::{AppConfig, RemoteSource};
use crate::repository::error::RepositoryResult;
use crate::repository::kv_store::KvStore;
use tracing::{info, warn};

/// 配置键
pub mod config_keys {
    pub const APP_CONFIG: &str = "estoque.config";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    store: KvStore,
}

impl ConfigManager {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    /// 读取已保存的配置（不含环境变量覆写）
    ///
    /// 不存在或无法解析时返回默认配置
    pub fn load_stored(&self) -> RepositoryResult<AppConfig> {
        match self.store.get_json::<AppConfig>(config_keys::APP_CONFIG) {
            Ok(Some(config)) => Ok(config),
            Ok(None) => Ok(AppConfig::default()),
            Err(e) => {
                warn!(error = %e, "配置解析失败，使用默认配置");
                Ok(AppConfig::default())
            }
        }
    }

    /// 读取配置并应用环境变量覆写
    pub fn load(&self) -> RepositoryResult<AppConfig> {
        let mut config = self.load_stored()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// 保存配置（密钥字段不序列化）
    pub fn save(&self, config: &AppConfig) -> RepositoryResult<()> {
        self.store.put_json(config_keys::APP_CONFIG, config)?;
        info!(
            remote_source = config.remote_source.as_ref().map(RemoteSource::label).unwrap_or("none"),
            refresh_interval_secs = config.refresh_interval_secs,
            "配置已保存"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_uses_defaults() {
        let manager = ConfigManager::new(KvStore::in_memory().unwrap());
        let config = manager.load_stored().unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_drops_access_key() {
        let store = KvStore::in_memory().unwrap();
        let manager = ConfigManager::new(store.clone());
        let config = AppConfig {
            remote_source: Some(RemoteSource::AppSheet {
                app_id: "app".to_string(),
                table_name: "Produtos".to_string(),
                access_key: "V2-secret".to_string(),
            }),
            ..AppConfig::default()
        };

        manager.save(&config).unwrap();

        let raw = store.get(config_keys::APP_CONFIG).unwrap().unwrap();
        assert!(!raw.contains("V2-secret"));
        match manager.load_stored().unwrap().remote_source {
            Some(RemoteSource::AppSheet { app_id, access_key, .. }) => {
                assert_eq!(app_id, "app");
                assert!(access_key.is_empty());
            }
            other => panic!("unexpected source: {:?}", other),
        }
    }
}
