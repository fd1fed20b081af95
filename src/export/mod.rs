// ==========================================
// Rebaixa Pro - 导出层
// ==========================================
// 职责: 清单 → 表格文件字节 / 邮件草稿
// 说明: 文件保存与邮件客户端打开由外部协作者完成
// ==========================================

pub mod email;
pub mod error;
pub mod spreadsheet;

pub use email::EmailDraft;
pub use error::{ExportError, ExportResult};
pub use spreadsheet::{export_count_list, export_order_list, ExportFile};
