// ==========================================
// Rebaixa Pro - 核心库
// ==========================================
// 技术栈: Rust + SQLite + tokio
// 系统定位: 零售门店商品查询 / 补货清单 / 盘点计数
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "pt-BR");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 查询与清单累加
pub mod engine;

// 导入层 - 外部表格
pub mod importer;

// 远程目录层 - 共享链接 / 托管表格 API
pub mod remote;

// 导出层 - 表格文件 / 邮件草稿
pub mod export;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 应用层 - 会话控制器
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CatalogKind, Confirmation, ListState, ReportingPolicy, UserRole};

// 领域实体
pub use domain::{Catalog, InventoryCountItem, Notification, OrderItem, Product, User};

// 引擎
pub use engine::{CountList, KeyPolicy, LookupOutcome, OrderDraft, OrderList};

// 导入
pub use importer::{CatalogImporter, ImportError, ImportProfile};

// 应用
pub use app::{AppError, AppState};

// ==========================================
// 版本信息
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "Rebaixa Pro";
