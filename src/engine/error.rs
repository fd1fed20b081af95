// ==========================================
// Rebaixa Pro - 清单累加器错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 均为行内非致命错误，不清除其他表单状态
// ==========================================

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccumulatorError {
    #[error("Quantidade deve ser um número positivo.")]
    InvalidQuantity(String),

    #[error("Preço inválido: {0}")]
    InvalidPrice(String),

    #[error("Índice fora do intervalo: {index} (tamanho {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Operação requer confirmação explícita")]
    NotConfirmed,

    #[error("Nenhum produto selecionado")]
    NoProductSelected,
}

/// Result 类型别名
pub type AccumulatorResult<T> = Result<T, AccumulatorError>;
