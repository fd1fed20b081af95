// ==========================================
// Rebaixa Pro - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 所有导入/同步错误在操作边界返回，目录保持不变
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("Arquivo não encontrado: {0}")]
    FileNotFound(String),

    #[error("Formato de arquivo não suportado: {0} (use .xlsx/.xls/.ods/.csv)")]
    UnsupportedFormat(String),

    #[error("Falha ao ler arquivo: {0}")]
    FileReadError(String),

    // ===== 解析错误 =====
    #[error("Erro ao processar planilha: {0}")]
    Parse(String),

    #[error("A planilha está vazia ou não possui linhas válidas")]
    EmptyCatalog,

    #[error("Planilha inválida. Colunas ausentes: {}", missing.join(", "))]
    ColumnMismatch { missing: Vec<String> },

    // ===== 远程同步错误 =====
    #[error("Falha na sincronização remota: {0}")]
    RemoteFetch(String),

    #[error("Credenciais rejeitadas pela API remota (HTTP {status})")]
    Credential { status: u16 },

    #[error("Chave de acesso da API remota não configurada")]
    MissingCredential,

    #[error("Nenhuma fonte remota configurada")]
    NoRemoteSource,

    // ===== 并发控制 =====
    #[error("Já existe uma importação em andamento")]
    ImportInProgress,

    // ===== 通用错误 =====
    #[error("Erro interno: {0}")]
    InternalError(String),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            ImportError::FileNotFound(err.to_string())
        } else {
            ImportError::FileReadError(err.to_string())
        }
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::Parse(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::Parse(err.to_string())
    }
}

// 实现 From<reqwest::Error>
impl From<reqwest::Error> for ImportError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if status.as_u16() == 401 || status.as_u16() == 403 => {
                ImportError::Credential {
                    status: status.as_u16(),
                }
            }
            _ => ImportError::RemoteFetch(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_mismatch_message_lists_fields() {
        let err = ImportError::ColumnMismatch {
            missing: vec!["estoque".to_string(), "preco".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Planilha inválida. Colunas ausentes: estoque, preco"
        );
    }

    #[test]
    fn test_io_not_found_maps_to_file_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "x.csv");
        assert!(matches!(ImportError::from(io), ImportError::FileNotFound(_)));
    }
}
