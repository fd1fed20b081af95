// ==========================================
// Rebaixa Pro - 远程同步服务
// ==========================================
// 职责: 导入闸门 + 远程拉取 → 规范化
// 并发: 同一时刻最多一个导入在途；后台同步遇到在途导入时跳过（不排队）
// ==========================================

use crate::config::RemoteSource;
use crate::domain::notification::Notification;
use crate::domain::product::CatalogRecord;
use crate::domain::types::ReportingPolicy;
use crate::i18n::{t, t_with_args};
use crate::importer::catalog_importer::{CatalogImporter, ImportOutcome, ImportProfile};
use crate::importer::error::ImportResult;
use crate::remote::client::{RemoteCatalogClient, RemotePayload};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, instrument};

// ==========================================
// ImportGate - 导入闸门
// ==========================================
#[derive(Debug, Default)]
pub struct ImportGate {
    in_flight: AtomicBool,
}

impl ImportGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 尝试占用闸门；已被占用时返回 None
    pub fn try_acquire(&self) -> Option<ImportGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ImportGuard { gate: self })
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// 闸门占用凭证，Drop 时无条件释放（成功/失败/panic）
#[derive(Debug)]
pub struct ImportGuard<'a> {
    gate: &'a ImportGate,
}

impl Drop for ImportGuard<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.store(false, Ordering::Release);
    }
}

// ==========================================
// SyncOutcome / SyncReport - 同步结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Updated {
        batch_id: String,
        accepted: usize,
        rejected: usize,
        last_update: DateTime<Utc>,
    },
    /// 已有导入在途，本次跳过
    Skipped,
}

#[derive(Debug)]
pub struct SyncReport {
    pub policy: ReportingPolicy,
    pub result: ImportResult<SyncOutcome>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        matches!(self.result, Ok(SyncOutcome::Updated { .. }))
    }

    /// 需要展示给用户的提示；Silent 策略下始终为 None
    pub fn notification(&self) -> Option<Notification> {
        if self.policy.is_silent() {
            return None;
        }
        Some(match &self.result {
            Ok(SyncOutcome::Updated { accepted, .. }) => Notification::success(t_with_args(
                "sync.success",
                &[("count", &accepted.to_string())],
            )),
            Ok(SyncOutcome::Skipped) => Notification::info(t("sync.skipped")),
            Err(e) => {
                Notification::error(t_with_args("sync.failed", &[("error", &e.to_string())]))
            }
        })
    }
}

// ==========================================
// RemoteSyncService - 远程拉取 + 规范化
// ==========================================
pub struct RemoteSyncService {
    client: Arc<dyn RemoteCatalogClient>,
    importer: CatalogImporter,
}

impl RemoteSyncService {
    pub fn new(client: Arc<dyn RemoteCatalogClient>) -> Self {
        Self {
            client,
            importer: CatalogImporter::default(),
        }
    }

    /// 拉取远程目录并规范化（不提交到会话）
    #[instrument(skip(self, source, profile), fields(source_type = source.label(), profile_name = profile.name))]
    pub async fn fetch_catalog<T: CatalogRecord>(
        &self,
        source: &RemoteSource,
        profile: &ImportProfile,
    ) -> ImportResult<ImportOutcome<T>> {
        let payload = self.client.fetch(source).await?;
        let outcome = match payload {
            RemotePayload::Bytes(bytes) => self.importer.import_bytes(&bytes, profile)?,
            RemotePayload::Rows(rows) => self.importer.import_rows(rows, profile)?,
        };
        info!(
            batch_id = %outcome.batch_id,
            accepted = outcome.accepted_rows(),
            rejected = outcome.rejected_rows,
            "远程目录拉取完成"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::error::ImportError;

    #[test]
    fn test_gate_rejects_second_acquire_and_releases_on_drop() {
        let gate = ImportGate::new();

        let guard = gate.try_acquire();
        assert!(guard.is_some());
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());

        drop(guard);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }

    #[test]
    fn test_gate_released_after_panic() {
        let gate = ImportGate::new();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = gate.try_acquire();
            panic!("falha durante importação");
        }));

        assert!(result.is_err());
        assert!(!gate.is_busy());
    }

    #[test]
    fn test_silent_report_has_no_notification() {
        let report = SyncReport {
            policy: ReportingPolicy::Silent,
            result: Err(ImportError::RemoteFetch("timeout".to_string())),
        };
        assert!(report.notification().is_none());

        let report = SyncReport {
            policy: ReportingPolicy::Loud,
            result: Err(ImportError::RemoteFetch("timeout".to_string())),
        };
        assert!(report.notification().map(|n| n.is_error()).unwrap_or(false));
    }
}
