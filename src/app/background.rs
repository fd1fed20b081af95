// ==========================================
// Rebaixa Pro - 后台定时刷新
// ==========================================
// 按配置周期以 Silent 策略同步远程目录
// 首个 tick 跳过（启动时不立即同步）
// ==========================================

use crate::app::state::AppState;
use crate::domain::types::ReportingPolicy;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

/// 启动后台刷新任务
///
/// 任务在返回的 JoinHandle 被 abort 或运行时关闭时结束
pub fn spawn_background_refresh(state: Arc<AppState>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(period_secs = period.as_secs(), "后台刷新已启动");
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval.tick().await;

        loop {
            interval.tick().await;
            debug!("后台刷新触发");
            let report = state.sync(ReportingPolicy::Silent).await;
            debug!(success = report.is_success(), "后台刷新结束");
        }
    })
}
