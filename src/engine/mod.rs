// ==========================================
// Rebaixa Pro - 引擎层
// ==========================================
// 职责: 目录查询 + 清单累加（纯内存，不做持久化）
// 红线: 查询不修改目录；清单修改只通过累加器接口
// ==========================================

pub mod count_list;
pub mod error;
pub mod lookup;
pub mod order_list;

// 重导出核心引擎
pub use count_list::CountList;
pub use error::{AccumulatorError, AccumulatorResult};
pub use lookup::{lookup, sanitize_scanner_input, KeyPolicy, LookupOutcome};
pub use order_list::{OrderDraft, OrderList};
