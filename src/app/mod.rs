// ==========================================
// Rebaixa Pro - 应用层
// ==========================================
// 职责: 会话控制器，连接导入/查询/清单/导出/持久化
// ==========================================

pub mod auth;
pub mod background;
pub mod error;
pub mod session;
pub mod state;

// 重导出
pub use background::spawn_background_refresh;
pub use error::{AppError, AppResult};
pub use session::Session;
pub use state::{get_default_db_path, AppState, PreparedImport};
