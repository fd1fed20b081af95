// ==========================================
// Rebaixa Pro - 领域类型定义
// ==========================================
// 职责: 跨模块共享的枚举与值类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 目录类型 (Catalog Kind)
// ==========================================
// 商品目录: 用于查询/补货清单，主键 codigo
// 盘点目录: 用于盘点计数，主键 codigo（为空时回退 ean）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Products,
    Inventory,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogKind::Products => write!(f, "produtos"),
            CatalogKind::Inventory => write!(f, "inventario"),
        }
    }
}

// ==========================================
// 用户角色 (User Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::User => write!(f, "user"),
        }
    }
}

// ==========================================
// 上报策略 (Reporting Policy)
// ==========================================
// Loud: 用户手动触发，结果需展示给用户
// Silent: 后台定时刷新，结果仅记录日志
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingPolicy {
    Loud,
    Silent,
}

impl ReportingPolicy {
    pub fn is_silent(&self) -> bool {
        matches!(self, ReportingPolicy::Silent)
    }
}

// ==========================================
// 清单状态 (List State)
// ==========================================
// Empty → Populated: 首次追加
// Populated → Empty: 清空 / 删除最后一项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListState {
    Empty,
    Populated,
}

impl fmt::Display for ListState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListState::Empty => write!(f, "EMPTY"),
            ListState::Populated => write!(f, "POPULATED"),
        }
    }
}

// ==========================================
// 操作确认 (Confirmation)
// ==========================================
// 批量清空类操作必须由调用方显式确认
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Confirmation::Confirmed)
    }
}

impl From<bool> for Confirmation {
    fn from(value: bool) -> Self {
        if value {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}
