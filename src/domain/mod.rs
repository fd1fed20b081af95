// ==========================================
// Rebaixa Pro - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod notification;
pub mod product;
pub mod types;
pub mod user;

// 重导出核心类型
pub use notification::{Notification, NotificationLevel};
pub use product::{Catalog, CatalogRecord, InventoryCountItem, OrderItem, Product, RawProductRecord};
pub use types::{CatalogKind, Confirmation, ListState, ReportingPolicy, UserRole};
pub use user::User;
