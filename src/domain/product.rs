// ==========================================
// Rebaixa Pro - 商品领域模型
// ==========================================
// 职责: 商品目录记录、盘点记录、补货清单记录
// 用途: 导入层写入，查询/累加层只读或按索引修改
// ==========================================

use crate::domain::types::CatalogKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// RawProductRecord - 字段映射后的中间结构体
// ==========================================
// 所有规范字段均已完成类型转换，尚未做主键校验
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProductRecord {
    pub codigo: String,
    pub ean: String,
    pub descricao: String,
    pub estoque: u32,
    pub preco: f64,
    pub quantidade: u32,

    // 元信息
    pub row_number: usize,
}

// ==========================================
// CatalogRecord - 可从中间结构体构建的目录记录
// ==========================================
pub trait CatalogRecord: Clone + Send + Sync + 'static {
    const KIND: CatalogKind;

    /// 从映射结果构建；主键为空时返回 None（该行被剔除）
    fn from_raw(raw: RawProductRecord) -> Option<Self>;

    /// 主键（目录内唯一性不做强制）
    fn primary_key(&self) -> &str;

    fn codigo(&self) -> &str;

    fn ean(&self) -> Option<&str>;

    fn descricao(&self) -> &str;
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

// ==========================================
// Product - 商品目录记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub codigo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ean: Option<String>,
    pub descricao: String,
    #[serde(default)]
    pub estoque: u32,
    #[serde(default)]
    pub preco: f64,
}

impl CatalogRecord for Product {
    const KIND: CatalogKind = CatalogKind::Products;

    fn from_raw(raw: RawProductRecord) -> Option<Self> {
        if raw.codigo.is_empty() {
            return None;
        }
        Some(Product {
            codigo: raw.codigo,
            ean: non_empty(raw.ean),
            descricao: raw.descricao,
            estoque: raw.estoque,
            preco: raw.preco,
        })
    }

    fn primary_key(&self) -> &str {
        &self.codigo
    }

    fn codigo(&self) -> &str {
        &self.codigo
    }

    fn ean(&self) -> Option<&str> {
        self.ean.as_deref()
    }

    fn descricao(&self) -> &str {
        &self.descricao
    }
}

// ==========================================
// InventoryCountItem - 盘点记录
// ==========================================
// quantidade 为累计的实盘数量，与目录库存无关
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryCountItem {
    pub codigo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ean: Option<String>,
    pub descricao: String,
    #[serde(default)]
    pub quantidade: u32,
}

impl InventoryCountItem {
    /// 以目录商品为模板创建盘点记录
    pub fn from_product(product: &Product, quantidade: u32) -> Self {
        Self {
            codigo: product.codigo.clone(),
            ean: product.ean.clone(),
            descricao: product.descricao.clone(),
            quantidade,
        }
    }
}

impl CatalogRecord for InventoryCountItem {
    const KIND: CatalogKind = CatalogKind::Inventory;

    fn from_raw(raw: RawProductRecord) -> Option<Self> {
        if raw.codigo.is_empty() && raw.ean.is_empty() {
            return None;
        }
        Some(InventoryCountItem {
            codigo: raw.codigo,
            ean: non_empty(raw.ean),
            descricao: raw.descricao,
            quantidade: raw.quantidade,
        })
    }

    fn primary_key(&self) -> &str {
        if self.codigo.is_empty() {
            self.ean.as_deref().unwrap_or_default()
        } else {
            &self.codigo
        }
    }

    fn codigo(&self) -> &str {
        &self.codigo
    }

    fn ean(&self) -> Option<&str> {
        self.ean.as_deref()
    }

    fn descricao(&self) -> &str {
        &self.descricao
    }
}

// ==========================================
// OrderItem - 补货/降价清单记录
// ==========================================
// 不做去重: 同一 codigo 可多次出现
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub codigo: String,
    pub descricao: String,
    pub quantidade: u32,
    pub preco_original: f64, // 加入时的目录价格快照
    pub preco_sugerido: f64, // 用户可编辑
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        f64::from(self.quantidade) * self.preco_sugerido
    }
}

// ==========================================
// Catalog - 有序目录
// ==========================================
// 每次导入成功后整体替换，不做增量合并
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog<T> {
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            last_update: None,
        }
    }
}

impl<T> Catalog<T> {
    pub fn new(items: Vec<T>, last_update: DateTime<Utc>) -> Self {
        Self {
            items,
            last_update: Some(last_update),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(codigo: &str, ean: &str) -> RawProductRecord {
        RawProductRecord {
            codigo: codigo.to_string(),
            ean: ean.to_string(),
            descricao: "Arroz".to_string(),
            estoque: 5,
            preco: 9.9,
            quantidade: 2,
            row_number: 1,
        }
    }

    #[test]
    fn test_product_requires_codigo() {
        assert!(Product::from_raw(raw("", "789")).is_none());
        let product = Product::from_raw(raw("100", "")).unwrap();
        assert_eq!(product.codigo, "100");
        assert_eq!(product.ean, None);
        assert_eq!(product.estoque, 5);
    }

    #[test]
    fn test_count_item_falls_back_to_ean() {
        let item = InventoryCountItem::from_raw(raw("", "789")).unwrap();
        assert_eq!(item.primary_key(), "789");
        assert_eq!(item.quantidade, 2);

        assert!(InventoryCountItem::from_raw(raw("", "")).is_none());
    }

    #[test]
    fn test_order_item_serializes_camel_case() {
        let item = OrderItem {
            codigo: "100".to_string(),
            descricao: "Arroz".to_string(),
            quantidade: 2,
            preco_original: 10.0,
            preco_sugerido: 8.5,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["precoSugerido"], 8.5);
        assert_eq!(item.line_total(), 17.0);
    }
}
