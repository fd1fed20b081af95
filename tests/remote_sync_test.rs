// ==========================================
// 远程同步集成测试
// ==========================================
// 测试目标: 远程拉取替换目录 / 导入闸门 / Silent 与 Loud 策略
// ==========================================


use estoque_pro::app::spawn_background_refresh;
use estoque_pro::domain::{NotificationLevel, ReportingPolicy};
use estoque_pro::importer::{ImportError, ImportProfile};
use estoque_pro::remote::SyncOutcome;
use std::sync::Arc;
use std::time::Duration;
use test_helpers::{BlockingClient, StaticClient, PRODUCTS_CSV};

#[tokio::test]
async fn test_sync_replaces_catalog_from_rows() {
    let client = Arc::new(StaticClient::rows(test_helpers::remote_rows(&[
        ("900", "Café 500g", 15.0),
        ("", "sem código", 1.0),
    ])));
    let state = test_helpers::memory_state(client.clone());
    state
        .import_bytes(PRODUCTS_CSV.as_bytes(), &ImportProfile::products())
        .unwrap();
    state.set_remote_source(Some(test_helpers::shared_link_source())).unwrap();

    let report = state.sync(ReportingPolicy::Loud).await;

    match &report.result {
        Ok(SyncOutcome::Updated { accepted, rejected, .. }) => {
            assert_eq!(*accepted, 1);
            assert_eq!(*rejected, 1);
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(
        report.notification().map(|n| n.level),
        Some(NotificationLevel::Success)
    );
    assert_eq!(client.call_count(), 1);
    assert!(state.lookup_product("100").unwrap().is_none());
    assert_eq!(state.lookup_product("900").unwrap().unwrap().preco, 15.0);
}

#[tokio::test]
async fn test_sync_from_downloaded_bytes() {
    let state = test_helpers::memory_state(Arc::new(StaticClient::bytes(PRODUCTS_CSV.as_bytes())));
    state.set_remote_source(Some(test_helpers::shared_link_source())).unwrap();

    let report = state.sync(ReportingPolicy::Silent).await;

    assert!(report.is_success());
    assert!(report.notification().is_none());
    assert_eq!(state.session_snapshot().unwrap().products.len(), 3);
}

#[tokio::test]
async fn test_credential_failure_keeps_catalog() {
    let state = test_helpers::memory_state(Arc::new(StaticClient::rejecting(401)));
    state
        .import_bytes(PRODUCTS_CSV.as_bytes(), &ImportProfile::products())
        .unwrap();
    state.set_remote_source(Some(test_helpers::shared_link_source())).unwrap();

    let loud = state.sync(ReportingPolicy::Loud).await;
    assert!(matches!(loud.result, Err(ImportError::Credential { status: 401 })));
    assert!(loud.notification().map(|n| n.is_error()).unwrap_or(false));

    let silent = state.sync(ReportingPolicy::Silent).await;
    assert!(silent.result.is_err());
    assert!(silent.notification().is_none());

    assert_eq!(state.session_snapshot().unwrap().products.len(), 3);
    assert!(!state.is_import_running());
}

#[tokio::test]
async fn test_concurrent_imports_are_serialized() {
    let client = Arc::new(BlockingClient::new(test_helpers::remote_rows(&[(
        "900", "Café 500g", 15.0,
    )])));
    let state = Arc::new(test_helpers::memory_state(client.clone()));
    state.set_remote_source(Some(test_helpers::shared_link_source())).unwrap();

    let first = {
        let state = Arc::clone(&state);
        tokio::spawn(async move { state.sync(ReportingPolicy::Loud).await })
    };
    client.started.notified().await;
    assert!(state.is_import_running());

    // 后台刷新: 跳过，不报错
    let silent = state.sync(ReportingPolicy::Silent).await;
    assert!(matches!(silent.result, Ok(SyncOutcome::Skipped)));
    assert!(silent.notification().is_none());

    // 用户触发: 拒绝
    let loud = state.sync(ReportingPolicy::Loud).await;
    assert!(matches!(loud.result, Err(ImportError::ImportInProgress)));
    assert!(matches!(
        state.import_bytes(PRODUCTS_CSV.as_bytes(), &ImportProfile::products()),
        Err(estoque_pro::AppError::Import(ImportError::ImportInProgress))
    ));

    client.release.notify_one();
    let report = first.await.unwrap();
    assert!(report.is_success());
    assert!(!state.is_import_running());
    assert!(state.lookup_product("900").unwrap().is_some());
}

#[tokio::test]
async fn test_sync_without_remote_source() {
    let client = Arc::new(StaticClient::rows(Vec::new()));
    let state = test_helpers::memory_state(client.clone());

    let report = state.sync(ReportingPolicy::Loud).await;

    assert!(matches!(report.result, Err(ImportError::NoRemoteSource)));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_background_refresh_skips_first_tick() {
    let client = Arc::new(StaticClient::rows(test_helpers::remote_rows(&[(
        "900", "Café 500g", 15.0,
    )])));
    let state = Arc::new(test_helpers::memory_state(client.clone()));
    state.set_remote_source(Some(test_helpers::shared_link_source())).unwrap();

    let handle = spawn_background_refresh(Arc::clone(&state), Duration::from_millis(200));

    // 启动时不立即同步
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(client.call_count(), 0);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(client.call_count() >= 1);
    assert!(state.lookup_product("900").unwrap().is_some());

    handle.abort();
}
