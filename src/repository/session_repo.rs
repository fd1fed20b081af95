// ==========================================
// Rebaixa Pro - 会话仓储
// ==========================================
// 职责: 会话各切片的整体读写（用户/商品目录/盘点清单/补货清单）
// 说明: 启动时读取一次，每次相关状态变更后整体重写
// ==========================================

use crate::domain::product::{Catalog, InventoryCountItem, OrderItem, Product};
use crate::domain::user::User;
use crate::repository::error::RepositoryResult;
use crate::repository::kv_store::KvStore;
use tracing::{debug, warn};

/// 存储键
pub mod session_keys {
    pub const USER: &str = "estoque.user";
    pub const PRODUCTS: &str = "estoque.produtos";
    pub const COUNT_LIST: &str = "estoque.inventario";
    pub const ORDER_LIST: &str = "estoque.pedido";
}

/// 启动时读取的会话快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub products: Catalog<Product>,
    pub count_list: Catalog<InventoryCountItem>,
    pub order_list: Vec<OrderItem>,
}

#[derive(Clone)]
pub struct SessionRepository {
    store: KvStore,
}

impl SessionRepository {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &KvStore {
        &self.store
    }

    /// 读取全部切片
    ///
    /// 单个切片损坏时记录告警并以空值启动，不影响其他切片
    pub fn load_snapshot(&self) -> SessionSnapshot {
        let snapshot = SessionSnapshot {
            user: self.load_or_default(session_keys::USER),
            products: self.load_or_default(session_keys::PRODUCTS).unwrap_or_default(),
            count_list: self.load_or_default(session_keys::COUNT_LIST).unwrap_or_default(),
            order_list: self.load_or_default(session_keys::ORDER_LIST).unwrap_or_default(),
        };
        debug!(
            logged_in = snapshot.user.is_some(),
            products = snapshot.products.len(),
            count_items = snapshot.count_list.len(),
            order_items = snapshot.order_list.len(),
            "会话快照已读取"
        );
        snapshot
    }

    fn load_or_default<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get_json(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "会话切片读取失败，使用空值");
                None
            }
        }
    }

    // ===== 用户 =====
    pub fn save_user(&self, user: &User) -> RepositoryResult<()> {
        self.store.put_json(session_keys::USER, user)
    }

    pub fn clear_user(&self) -> RepositoryResult<()> {
        self.store.delete(session_keys::USER).map(|_| ())
    }

    // ===== 商品目录 =====
    pub fn save_products(&self, catalog: &Catalog<Product>) -> RepositoryResult<()> {
        self.store.put_json(session_keys::PRODUCTS, catalog)
    }

    // ===== 盘点清单 =====
    pub fn save_count_list(&self, catalog: &Catalog<InventoryCountItem>) -> RepositoryResult<()> {
        self.store.put_json(session_keys::COUNT_LIST, catalog)
    }

    // ===== 补货清单 =====
    pub fn save_order_list(&self, items: &[OrderItem]) -> RepositoryResult<()> {
        self.store.put_json(session_keys::ORDER_LIST, items)
    }
}
