// ==========================================
// Rebaixa Pro - 远程目录层
// ==========================================
// 职责: 共享链接下载 / 托管表格 API 查询 / 导入闸门
// ==========================================

pub mod appsheet;
pub mod client;
pub mod drive_link;
pub mod sync_service;

pub use client::{check_status, HttpRemoteClient, RemoteCatalogClient, RemotePayload};
pub use drive_link::resolve_download_url;
pub use sync_service::{ImportGate, ImportGuard, RemoteSyncService, SyncOutcome, SyncReport};
