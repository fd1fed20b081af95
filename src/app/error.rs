// ==========================================
// Rebaixa Pro - 应用层错误类型
// ==========================================
// 职责: 汇总各层错误，转换为用户可见的提示
// ==========================================

use crate::domain::notification::Notification;
use crate::engine::error::AccumulatorError;
use crate::export::error::ExportError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ===== 各层错误 =====
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Accumulator(#[from] AccumulatorError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== 登录 =====
    #[error("Credenciais inválidas. Tente novamente.")]
    InvalidCredentials,

    #[error("Senha não configurada para o usuário {0}")]
    AccountNotConfigured(String),

    // ===== 查询 =====
    #[error("Produto não encontrado: {0}")]
    ProductNotFound(String),

    #[error("Nenhuma planilha de inventário carregada. Importe a base de inventário primeiro.")]
    InventoryNotLoaded,

    // ===== 通用错误 =====
    #[error("Falha ao obter trava do estado: {0}")]
    LockError(String),
}

impl AppError {
    /// 转换为界面提示
    pub fn notification(&self) -> Notification {
        Notification::error(self.to_string())
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
