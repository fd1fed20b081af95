// ==========================================
// Rebaixa Pro - 应用配置
// ==========================================
// 存储: kv_store 表中键 estoque.config 的 JSON 值
// 红线: 密钥与密码只来自环境变量/运行时设置，从不写入存储
// ==========================================

use crate::domain::types::UserRole;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

/// 环境变量名
pub mod env_keys {
    pub const APPSHEET_ACCESS_KEY: &str = "ESTOQUE_APPSHEET_ACCESS_KEY";
    pub const ADMIN_PASSWORD: &str = "ESTOQUE_ADMIN_PASSWORD";
    pub const USER_PASSWORD: &str = "ESTOQUE_USER_PASSWORD";
    pub const ORDER_RECIPIENT: &str = "ESTOQUE_ORDER_RECIPIENT";
    pub const REFRESH_INTERVAL_SECS: &str = "ESTOQUE_REFRESH_INTERVAL_SECS";
    pub const DB_PATH: &str = "ESTOQUE_DB_PATH";
}

// ==========================================
// RemoteSource - 远程目录来源
// ==========================================
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RemoteSource {
    SharedLink {
        shared_link: String,
    },
    #[serde(rename = "appsheet")]
    AppSheet {
        app_id: String,
        table_name: String,
        #[serde(default, skip_serializing)]
        access_key: String,
    },
}

impl RemoteSource {
    pub fn label(&self) -> &'static str {
        match self {
            RemoteSource::SharedLink { .. } => "shared_link",
            RemoteSource::AppSheet { .. } => "appsheet",
        }
    }
}

// 不输出 access_key
impl fmt::Debug for RemoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteSource::SharedLink { shared_link } => f
                .debug_struct("SharedLink")
                .field("shared_link", shared_link)
                .finish(),
            RemoteSource::AppSheet {
                app_id,
                table_name,
                access_key,
            } => f
                .debug_struct("AppSheet")
                .field("app_id", app_id)
                .field("table_name", table_name)
                .field("access_key", &if access_key.is_empty() { "<unset>" } else { "****" })
                .finish(),
        }
    }
}

// ==========================================
// AccountConfig - 登录账户
// ==========================================
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountConfig {
    pub login: String,
    pub nome: String,
    pub perfil: UserRole,
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("login", &self.login)
            .field("nome", &self.nome)
            .field("perfil", &self.perfil)
            .finish_non_exhaustive()
    }
}

fn default_accounts() -> Vec<AccountConfig> {
    vec![
        AccountConfig {
            login: "admin".to_string(),
            nome: "Administrador Master".to_string(),
            perfil: UserRole::Admin,
            password: String::new(),
        },
        AccountConfig {
            login: "user".to_string(),
            nome: "Usuário Padrão".to_string(),
            perfil: UserRole::User,
            password: String::new(),
        },
    ]
}

fn default_refresh_interval_secs() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

// ==========================================
// AppConfig - 应用配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_source: Option<RemoteSource>,
    #[serde(default)]
    pub order_recipient: String,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_accounts")]
    pub accounts: Vec<AccountConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote_source: None,
            order_recipient: String::new(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            accounts: default_accounts(),
        }
    }
}

impl AppConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    /// 从进程环境变量应用覆写
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// 应用覆写（查找函数便于测试注入）
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(env_keys::APPSHEET_ACCESS_KEY) {
            if let Some(RemoteSource::AppSheet { access_key, .. }) = self.remote_source.as_mut() {
                *access_key = key;
            }
        }

        for account in &mut self.accounts {
            let env_key = match account.perfil {
                UserRole::Admin => env_keys::ADMIN_PASSWORD,
                UserRole::User => env_keys::USER_PASSWORD,
            };
            if let Some(password) = non_empty(env_key) {
                account.password = password;
            }
        }

        if let Some(recipient) = non_empty(env_keys::ORDER_RECIPIENT) {
            self.order_recipient = recipient.trim().to_string();
        }

        if let Some(secs) = non_empty(env_keys::REFRESH_INTERVAL_SECS)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
        {
            self.refresh_interval_secs = secs;
        }
    }
}
