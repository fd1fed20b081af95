// ==========================================
// Rebaixa Pro - 会话状态
// ==========================================
// 职责: 当前用户 + 商品目录 + 盘点清单 + 补货清单
// 说明: 由 AppState 独占持有，每次变更后整体持久化
// ==========================================

use crate::domain::product::{Catalog, Product};
use crate::domain::user::User;
use crate::engine::{CountList, OrderList};
use crate::repository::SessionSnapshot;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub products: Catalog<Product>,
    pub count_list: CountList,
    pub count_last_update: Option<DateTime<Utc>>,
    pub order_list: OrderList,
}

impl Session {
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            user: snapshot.user,
            products: snapshot.products,
            count_list: CountList::from_items(snapshot.count_list.items),
            count_last_update: snapshot.count_list.last_update,
            order_list: OrderList::from_items(snapshot.order_list),
        }
    }
}
