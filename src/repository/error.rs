// ==========================================
// Rebaixa Pro - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("Registro não encontrado: {key}")]
    NotFound { key: String },

    #[error("Falha ao conectar ao banco de dados: {0}")]
    DatabaseConnectionError(String),

    #[error("Falha ao obter trava do banco de dados: {0}")]
    LockError(String),

    #[error("Falha na consulta ao banco de dados: {0}")]
    DatabaseQueryError(String),

    // ===== 序列化错误 =====
    #[error("Valor armazenado inválido (key={key}): {message}")]
    Deserialize { key: String, message: String },

    #[error("Falha ao serializar valor: {0}")]
    Serialize(String),
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => RepositoryError::DatabaseQueryError(msg),
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                key: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialize(err.to_string())
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
