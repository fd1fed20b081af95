// ==========================================
// Rebaixa Pro - 用户领域模型
// ==========================================

use crate::domain::types::UserRole;
use serde::{Deserialize, Serialize};

/// 已登录用户（会话内保存，无过期）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    pub nome: String,
    pub perfil: UserRole,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.perfil == UserRole::Admin
    }
}
