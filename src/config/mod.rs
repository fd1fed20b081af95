// ==========================================
// Rebaixa Pro - 配置层
// ==========================================
// 职责: 应用配置读写 + 环境变量覆写
// 存储: kv_store 表（键 estoque.config）
// ==========================================

pub mod app_config;
pub mod config_manager;

// 重导出核心配置类型
pub use app_config::{env_keys, AccountConfig, AppConfig, RemoteSource};
pub use config_manager::{config_keys, ConfigManager};
