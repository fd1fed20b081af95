// ==========================================
// Rebaixa Pro - 应用状态
// ==========================================
// 职责: 会话控制器，持有目录/清单并在每次变更后持久化
// 并发: 会话锁不跨 await 持有；导入由 ImportGate 串行化
// ==========================================

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, TimeZone, Utc};
use tracing::{error, info, instrument, warn};

use crate::app::auth::authenticate;
use crate::app::error::{AppError, AppResult};
use crate::app::session::Session;
use crate::config::{env_keys, AppConfig, ConfigManager, RemoteSource};
use crate::db::DEFAULT_DB_FILE;
use crate::domain::product::{Catalog, InventoryCountItem, OrderItem, Product};
use crate::domain::types::{CatalogKind, Confirmation, ReportingPolicy};
use crate::domain::user::User;
use crate::engine::{
    lookup, sanitize_scanner_input, AccumulatorError, CountList, KeyPolicy, OrderDraft, OrderList,
};
use crate::export::{export_count_list, export_order_list, EmailDraft, ExportFile};
use crate::importer::data_cleaner::parse_integer_text;
use crate::importer::{CatalogImporter, ImportError, ImportOutcome, ImportProfile, ImportResult};
use crate::remote::{
    HttpRemoteClient, ImportGate, RemoteCatalogClient, RemoteSyncService, SyncOutcome, SyncReport,
};
use crate::repository::{KvStore, SessionRepository};

// ==========================================
// PreparedImport - 已解析待确认的导入
// ==========================================
#[derive(Debug, Clone)]
pub enum PreparedImport {
    Products(ImportOutcome<Product>),
    Inventory(ImportOutcome<InventoryCountItem>),
}

impl PreparedImport {
    pub fn kind(&self) -> CatalogKind {
        match self {
            PreparedImport::Products(_) => CatalogKind::Products,
            PreparedImport::Inventory(_) => CatalogKind::Inventory,
        }
    }

    pub fn batch_id(&self) -> &str {
        match self {
            PreparedImport::Products(o) => &o.batch_id,
            PreparedImport::Inventory(o) => &o.batch_id,
        }
    }

    pub fn accepted_rows(&self) -> usize {
        match self {
            PreparedImport::Products(o) => o.accepted_rows(),
            PreparedImport::Inventory(o) => o.accepted_rows(),
        }
    }

    pub fn rejected_rows(&self) -> usize {
        match self {
            PreparedImport::Products(o) => o.rejected_rows,
            PreparedImport::Inventory(o) => o.rejected_rows,
        }
    }
}

/// 应用状态
///
/// 持有唯一的会话实例；界面/命令行只通过这里的方法修改状态
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    session_repo: SessionRepository,
    config_manager: ConfigManager,
    config: Mutex<AppConfig>,
    session: Mutex<Session>,
    importer: CatalogImporter,
    sync_service: RemoteSyncService,
    gate: ImportGate,
}

impl AppState {
    /// 打开数据库并加载配置与会话
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: String) -> AppResult<Self> {
        info!("初始化AppState，数据库路径: {}", db_path);

        let store = KvStore::open(&db_path)?;
        let config_manager = ConfigManager::new(store.clone());
        let config = config_manager.load()?;
        let client = HttpRemoteClient::new(config.http_timeout())?;

        let mut state = Self::build(store, config_manager, config, Arc::new(client));
        state.db_path = db_path;
        Ok(state)
    }

    /// 使用指定存储与远程客户端构建（测试注入假客户端）
    pub fn with_client(store: KvStore, client: Arc<dyn RemoteCatalogClient>) -> AppResult<Self> {
        let config_manager = ConfigManager::new(store.clone());
        let config = config_manager.load()?;
        Ok(Self::build(store, config_manager, config, client))
    }

    fn build(
        store: KvStore,
        config_manager: ConfigManager,
        config: AppConfig,
        client: Arc<dyn RemoteCatalogClient>,
    ) -> Self {
        let session_repo = SessionRepository::new(store);
        let session = Session::from_snapshot(session_repo.load_snapshot());

        info!(
            products = session.products.len(),
            count_items = session.count_list.len(),
            order_items = session.order_list.len(),
            remote_source = config.remote_source.as_ref().map(RemoteSource::label).unwrap_or("none"),
            "会话已恢复"
        );

        Self {
            db_path: String::new(),
            session_repo,
            config_manager,
            config: Mutex::new(config),
            session: Mutex::new(session),
            importer: CatalogImporter::default(),
            sync_service: RemoteSyncService::new(client),
            gate: ImportGate::new(),
        }
    }

    fn lock_session(&self) -> AppResult<MutexGuard<'_, Session>> {
        self.session
            .lock()
            .map_err(|e| AppError::LockError(e.to_string()))
    }

    fn lock_config(&self) -> AppResult<MutexGuard<'_, AppConfig>> {
        self.config
            .lock()
            .map_err(|e| AppError::LockError(e.to_string()))
    }

    /// 会话只读快照
    pub fn session_snapshot(&self) -> AppResult<Session> {
        Ok(self.lock_session()?.clone())
    }

    pub fn is_import_running(&self) -> bool {
        self.gate.is_busy()
    }

    // ==========================================
    // 登录
    // ==========================================

    pub fn login(&self, login: &str, password: &str) -> AppResult<User> {
        let user = {
            let config = self.lock_config()?;
            authenticate(&config.accounts, login, password)?
        };
        let mut session = self.lock_session()?;
        self.session_repo.save_user(&user)?;
        session.user = Some(user.clone());
        Ok(user)
    }

    /// 登出只清除用户，目录与清单保留
    pub fn logout(&self) -> AppResult<()> {
        let mut session = self.lock_session()?;
        self.session_repo.clear_user()?;
        if let Some(user) = session.user.take() {
            info!(login = %user.login, "已登出");
        }
        Ok(())
    }

    pub fn current_user(&self) -> AppResult<Option<User>> {
        Ok(self.lock_session()?.user.clone())
    }

    // ==========================================
    // 本地导入
    // ==========================================

    /// 解析并规范化文件，不提交
    pub fn preview_import(&self, path: &Path, profile: &ImportProfile) -> AppResult<PreparedImport> {
        let _guard = self.gate.try_acquire().ok_or(ImportError::ImportInProgress)?;
        let prepared = match profile.kind {
            CatalogKind::Products => {
                PreparedImport::Products(self.importer.import_file(path, profile)?)
            }
            CatalogKind::Inventory => {
                PreparedImport::Inventory(self.importer.import_file(path, profile)?)
            }
        };
        Ok(prepared)
    }

    /// 解析并规范化内存中的文件内容，不提交
    pub fn preview_bytes(&self, bytes: &[u8], profile: &ImportProfile) -> AppResult<PreparedImport> {
        let _guard = self.gate.try_acquire().ok_or(ImportError::ImportInProgress)?;
        let prepared = match profile.kind {
            CatalogKind::Products => {
                PreparedImport::Products(self.importer.import_bytes(bytes, profile)?)
            }
            CatalogKind::Inventory => {
                PreparedImport::Inventory(self.importer.import_bytes(bytes, profile)?)
            }
        };
        Ok(prepared)
    }

    /// 用已解析的结果整体替换目录
    ///
    /// # 返回
    /// - 新目录的记录数
    pub fn commit_import(&self, prepared: PreparedImport) -> AppResult<usize> {
        let mut session = self.lock_session()?;
        let batch_id = prepared.batch_id().to_string();
        let count = match prepared {
            PreparedImport::Products(outcome) => {
                let catalog = outcome.into_catalog();
                self.session_repo.save_products(&catalog)?;
                let count = catalog.len();
                session.products = catalog;
                count
            }
            PreparedImport::Inventory(outcome) => {
                let catalog = outcome.into_catalog();
                self.session_repo.save_count_list(&catalog)?;
                let count = catalog.len();
                session.count_last_update = catalog.last_update;
                session.count_list = CountList::from_items(catalog.items);
                count
            }
        };
        info!(batch_id = %batch_id, count, "目录已替换");
        Ok(count)
    }

    pub fn import_file(&self, path: &Path, profile: &ImportProfile) -> AppResult<usize> {
        let prepared = self.preview_import(path, profile)?;
        self.commit_import(prepared)
    }

    pub fn import_bytes(&self, bytes: &[u8], profile: &ImportProfile) -> AppResult<usize> {
        let prepared = self.preview_bytes(bytes, profile)?;
        self.commit_import(prepared)
    }

    /// 清空目录（需确认）
    pub fn clear_catalog(&self, kind: CatalogKind, confirmation: Confirmation) -> AppResult<usize> {
        if !confirmation.is_confirmed() {
            return Err(AccumulatorError::NotConfirmed.into());
        }
        let mut session = self.lock_session()?;
        let removed = match kind {
            CatalogKind::Products => {
                let empty = Catalog::default();
                self.session_repo.save_products(&empty)?;
                std::mem::replace(&mut session.products, empty).len()
            }
            CatalogKind::Inventory => {
                self.session_repo.save_count_list(&Catalog::default())?;
                session.count_last_update = None;
                std::mem::take(&mut session.count_list).len()
            }
        };
        warn!(kind = %kind, removed, "目录已清空");
        Ok(removed)
    }

    // ==========================================
    // 远程同步
    // ==========================================

    /// 从配置的远程来源刷新商品目录
    ///
    /// Silent 策略下遇到在途导入直接跳过；Loud 策略下返回 ImportInProgress
    #[instrument(skip(self))]
    pub async fn sync(&self, policy: ReportingPolicy) -> SyncReport {
        let result = self.run_sync(policy).await;
        match &result {
            Ok(SyncOutcome::Updated { accepted, .. }) => info!(accepted, "远程同步成功"),
            Ok(SyncOutcome::Skipped) => info!("已有导入在途，跳过远程同步"),
            Err(e) if policy.is_silent() => warn!(error = %e, "后台同步失败"),
            Err(e) => error!(error = %e, "远程同步失败"),
        }
        SyncReport { policy, result }
    }

    async fn run_sync(&self, policy: ReportingPolicy) -> ImportResult<SyncOutcome> {
        let _guard = match self.gate.try_acquire() {
            Some(guard) => guard,
            None if policy.is_silent() => return Ok(SyncOutcome::Skipped),
            None => return Err(ImportError::ImportInProgress),
        };

        let source = {
            let config = self
                .config
                .lock()
                .map_err(|e| ImportError::InternalError(e.to_string()))?;
            config.remote_source.clone().ok_or(ImportError::NoRemoteSource)?
        };

        let outcome = self
            .sync_service
            .fetch_catalog::<Product>(&source, &ImportProfile::products())
            .await?;

        let batch_id = outcome.batch_id.clone();
        let rejected = outcome.rejected_rows;
        let catalog = outcome.into_catalog();
        let accepted = catalog.len();
        let last_update = catalog.last_update.unwrap_or_else(Utc::now);

        {
            let mut session = self
                .session
                .lock()
                .map_err(|e| ImportError::InternalError(e.to_string()))?;
            self.session_repo
                .save_products(&catalog)
                .map_err(|e| ImportError::InternalError(e.to_string()))?;
            session.products = catalog;
        }

        Ok(SyncOutcome::Updated {
            batch_id,
            accepted,
            rejected,
            last_update,
        })
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 在商品目录中查找（空查询或未命中返回 None）
    pub fn lookup_product(&self, query: &str) -> AppResult<Option<Product>> {
        let session = self.lock_session()?;
        let policy = KeyPolicy::for_kind(CatalogKind::Products);
        let found = lookup(session.products.items.as_slice(), query, policy)
            .found()
            .cloned();
        Ok(found)
    }

    /// 扫码输入：只保留数字后查找
    pub fn lookup_scanned(&self, raw: &str) -> AppResult<Option<Product>> {
        self.lookup_product(&sanitize_scanner_input(raw))
    }

    fn require_product(&self, query: &str) -> AppResult<Product> {
        self.lookup_product(query)?
            .ok_or_else(|| AppError::ProductNotFound(query.trim().to_string()))
    }

    pub fn products_last_update(&self) -> AppResult<Option<DateTime<Utc>>> {
        Ok(self.lock_session()?.products.last_update)
    }

    pub fn count_last_update(&self) -> AppResult<Option<DateTime<Utc>>> {
        Ok(self.lock_session()?.count_last_update)
    }

    // ==========================================
    // 补货清单
    // ==========================================

    /// 为查询到的商品生成录入草稿
    pub fn order_draft(&self, query: &str) -> AppResult<OrderDraft> {
        Ok(OrderDraft::from_product(&self.require_product(query)?))
    }

    pub fn order_add(&self, draft: &OrderDraft) -> AppResult<OrderItem> {
        self.with_order_list(|list| list.append_draft(draft).cloned())
    }

    /// 数量 1，建议价 = 目录价
    pub fn order_quick_add(&self, query: &str) -> AppResult<OrderItem> {
        let product = self.require_product(query)?;
        self.with_order_list(|list| Ok(list.quick_add(&product).clone()))
    }

    pub fn order_items(&self) -> AppResult<Vec<OrderItem>> {
        Ok(self.lock_session()?.order_list.items().to_vec())
    }

    pub fn order_total(&self) -> AppResult<f64> {
        Ok(self.lock_session()?.order_list.total_value())
    }

    pub fn order_edit_quantity(&self, index: usize, text: &str) -> AppResult<()> {
        self.with_order_list(|list| list.edit_quantity(index, text))
    }

    pub fn order_edit_price(&self, index: usize, text: &str) -> AppResult<()> {
        self.with_order_list(|list| list.edit_price(index, text))
    }

    pub fn order_commit_quantity(&self, index: usize, text: &str) -> AppResult<u32> {
        self.with_order_list(|list| list.commit_quantity(index, text))
    }

    pub fn order_commit_price(&self, index: usize, text: &str) -> AppResult<f64> {
        self.with_order_list(|list| list.commit_price(index, text))
    }

    pub fn order_remove(&self, index: usize) -> AppResult<OrderItem> {
        self.with_order_list(|list| list.remove(index))
    }

    pub fn order_clear(&self, confirmation: Confirmation) -> AppResult<usize> {
        self.with_order_list(|list| list.clear(confirmation))
    }

    /// 在副本上执行变更，持久化成功后再替换会话中的清单
    fn with_order_list<R>(
        &self,
        op: impl FnOnce(&mut OrderList) -> Result<R, AccumulatorError>,
    ) -> AppResult<R> {
        let mut session = self.lock_session()?;
        let mut list = session.order_list.clone();
        let result = op(&mut list)?;
        self.session_repo.save_order_list(list.items())?;
        session.order_list = list;
        Ok(result)
    }

    // ==========================================
    // 盘点清单
    // ==========================================

    /// 在盘点清单中查找（返回含累计数量的记录）
    pub fn count_select(&self, query: &str) -> AppResult<InventoryCountItem> {
        let session = self.lock_session()?;
        if session.count_list.is_empty() {
            return Err(AppError::InventoryNotLoaded);
        }
        let policy = KeyPolicy::for_kind(CatalogKind::Inventory);
        let key = sanitize_scanner_input(query);
        let found = lookup(session.count_list.items(), &key, policy)
            .found()
            .cloned();
        found.ok_or_else(|| AppError::ProductNotFound(query.trim().to_string()))
    }

    /// 扫码计数: 查找后累加数量
    ///
    /// # 返回
    /// - 该商品累加后的数量
    pub fn count_add(&self, query: &str, quantity_text: &str) -> AppResult<u32> {
        let quantidade = parse_integer_text(quantity_text)
            .filter(|q| *q > 0)
            .and_then(|q| u32::try_from(q).ok())
            .ok_or_else(|| AccumulatorError::InvalidQuantity(quantity_text.to_string()))?;

        let mut item = self.count_select(query)?;
        item.quantidade = quantidade;

        self.with_count_list(|list| Ok(list.append(item)))
    }

    pub fn count_items(&self) -> AppResult<Vec<InventoryCountItem>> {
        Ok(self.lock_session()?.count_list.items().to_vec())
    }

    pub fn count_set_quantity(&self, index: usize, text: &str) -> AppResult<u32> {
        self.with_count_list(|list| list.set_quantity(index, text))
    }

    pub fn count_remove(&self, index: usize) -> AppResult<InventoryCountItem> {
        self.with_count_list(|list| list.remove(index))
    }

    /// 盘点完成: 所有数量归零，记录保留
    pub fn count_finalize(&self, confirmation: Confirmation) -> AppResult<usize> {
        self.with_count_list(|list| list.finalize(confirmation))
    }

    /// 在副本上执行变更，持久化成功后再替换会话中的清单
    fn with_count_list<R>(
        &self,
        op: impl FnOnce(&mut CountList) -> Result<R, AccumulatorError>,
    ) -> AppResult<R> {
        let mut session = self.lock_session()?;
        let mut list = session.count_list.clone();
        let result = op(&mut list)?;
        self.session_repo.save_count_list(&Catalog {
            items: list.items().to_vec(),
            last_update: session.count_last_update,
        })?;
        session.count_list = list;
        Ok(result)
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 补货清单 → 表格文件 + 邮件草稿
    pub fn export_order(&self) -> AppResult<(ExportFile, EmailDraft)> {
        let recipient = self.lock_config()?.order_recipient.clone();
        if recipient.is_empty() {
            warn!("未配置收件人（{}），邮件草稿收件人为空", env_keys::ORDER_RECIPIENT);
        }
        let session = self.lock_session()?;
        let file = export_order_list(&session.order_list)?;
        let draft = EmailDraft::for_order(&recipient, &session.order_list)?;
        info!(file = %file.file_name, items = session.order_list.len(), "补货清单已导出");
        Ok((file, draft))
    }

    /// 盘点清单 → 表格文件（仅数量 > 0 的记录）
    pub fn export_count<Tz>(&self, now: DateTime<Tz>) -> AppResult<ExportFile>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let session = self.lock_session()?;
        let file = export_count_list(&session.count_list, now)?;
        info!(file = %file.file_name, "盘点清单已导出");
        Ok(file)
    }

    // ==========================================
    // 配置
    // ==========================================

    pub fn config(&self) -> AppResult<AppConfig> {
        Ok(self.lock_config()?.clone())
    }

    /// 保存配置（密钥只保留在内存中）
    pub fn update_config(&self, config: AppConfig) -> AppResult<()> {
        let mut current = self.lock_config()?;
        self.config_manager.save(&config)?;
        *current = config;
        Ok(())
    }

    pub fn set_remote_source(&self, source: Option<RemoteSource>) -> AppResult<()> {
        let mut config = self.config()?;
        config.remote_source = source;
        config.apply_env_overrides();
        self.update_config(config)
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - ESTOQUE_DB_PATH 环境变量（非空时）
/// - 用户本地数据目录/estoque-pro/estoque_pro.db
/// - 无法获取数据目录时: ./estoque_pro.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(env_keys::DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    match dirs::data_local_dir() {
        Some(data_dir) => {
            let dir = data_dir.join("estoque-pro");
            // 确保目录存在
            std::fs::create_dir_all(&dir).ok();
            dir.join(DEFAULT_DB_FILE).to_string_lossy().to_string()
        }
        None => format!("./{}", DEFAULT_DB_FILE),
    }
}
