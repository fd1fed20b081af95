// ==========================================
// Rebaixa Pro - 补货/降价清单累加器
// ==========================================
// 职责: 追加 / 按索引修改 / 按索引删除 / 确认后清空
// 规则: 同一 codigo 可重复出现，追加从不合并
// 编辑: 输入过程中容忍临时无效值，提交（失焦）时回退到安全默认值
// ==========================================

use crate::domain::product::{OrderItem, Product};
use crate::domain::types::{Confirmation, ListState};
use crate::engine::error::{AccumulatorError, AccumulatorResult};
use crate::importer::data_cleaner::{parse_decimal_text, parse_integer_text};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ==========================================
// OrderDraft - 待加入清单的表单
// ==========================================
// 数量与价格保持原始文本，validate 时才转换
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub codigo: String,
    pub descricao: String,
    pub preco_original: f64,
    pub quantidade: String,
    pub preco_sugerido: String,
}

impl OrderDraft {
    /// 以查询命中的商品为模板，价格默认取目录价
    pub fn from_product(product: &Product) -> Self {
        Self {
            codigo: product.codigo.clone(),
            descricao: product.descricao.clone(),
            preco_original: product.preco,
            quantidade: String::new(),
            preco_sugerido: format!("{:.2}", product.preco),
        }
    }

    pub fn with_quantity(mut self, quantidade: impl Into<String>) -> Self {
        self.quantidade = quantidade.into();
        self
    }

    pub fn with_price(mut self, preco: impl Into<String>) -> Self {
        self.preco_sugerido = preco.into();
        self
    }

    /// 校验并生成清单记录
    ///
    /// - 数量必须为正整数
    /// - 价格必须为数值（非负）
    pub fn validate(&self) -> AccumulatorResult<OrderItem> {
        if self.codigo.trim().is_empty() {
            return Err(AccumulatorError::NoProductSelected);
        }

        let quantidade = parse_integer_text(&self.quantidade)
            .filter(|q| *q > 0)
            .and_then(|q| u32::try_from(q).ok())
            .ok_or_else(|| AccumulatorError::InvalidQuantity(self.quantidade.clone()))?;

        let preco_sugerido = parse_decimal_text(&self.preco_sugerido)
            .filter(|p| *p >= 0.0)
            .ok_or_else(|| AccumulatorError::InvalidPrice(self.preco_sugerido.clone()))?;

        Ok(OrderItem {
            codigo: self.codigo.clone(),
            descricao: self.descricao.clone(),
            quantidade,
            preco_original: self.preco_original,
            preco_sugerido,
        })
    }
}

// ==========================================
// OrderList - 清单
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderList {
    items: Vec<OrderItem>,
}

impl OrderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<OrderItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn state(&self) -> ListState {
        if self.items.is_empty() {
            ListState::Empty
        } else {
            ListState::Populated
        }
    }

    /// 追加（从不合并）
    pub fn append(&mut self, item: OrderItem) {
        debug!(codigo = %item.codigo, quantidade = item.quantidade, "追加清单记录");
        self.items.push(item);
    }

    /// 校验表单后追加；校验失败时清单不变
    pub fn append_draft(&mut self, draft: &OrderDraft) -> AccumulatorResult<&OrderItem> {
        let item = draft.validate()?;
        self.append(item);
        let last = self.items.len() - 1;
        Ok(&self.items[last])
    }

    /// 快速追加: 数量 1，两个价格均取目录价
    pub fn quick_add(&mut self, product: &Product) -> &OrderItem {
        self.append(OrderItem {
            codigo: product.codigo.clone(),
            descricao: product.descricao.clone(),
            quantidade: 1,
            preco_original: product.preco,
            preco_sugerido: product.preco,
        });
        let last = self.items.len() - 1;
        &self.items[last]
    }

    fn item_mut(&mut self, index: usize) -> AccumulatorResult<&mut OrderItem> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(AccumulatorError::IndexOutOfRange { index, len })
    }

    // ==========================================
    // 编辑（输入中）
    // ==========================================

    /// 数量输入: 空串临时为 0；非数值忽略（保持原值）
    pub fn edit_quantity(&mut self, index: usize, text: &str) -> AccumulatorResult<()> {
        let item = self.item_mut(index)?;
        if text.trim().is_empty() {
            item.quantidade = 0;
        } else if let Some(q) = parse_integer_text(text) {
            item.quantidade = u32::try_from(q.max(0)).unwrap_or(u32::MAX);
        }
        Ok(())
    }

    /// 价格输入: 空串临时为 0；非数值忽略（保持原值）
    pub fn edit_price(&mut self, index: usize, text: &str) -> AccumulatorResult<()> {
        let item = self.item_mut(index)?;
        if text.trim().is_empty() {
            item.preco_sugerido = 0.0;
        } else if let Some(p) = parse_decimal_text(text) {
            item.preco_sugerido = p;
        }
        Ok(())
    }

    // ==========================================
    // 提交（失焦）
    // ==========================================

    /// 数量提交: 非正数或非数值 → 1
    pub fn commit_quantity(&mut self, index: usize, text: &str) -> AccumulatorResult<u32> {
        let item = self.item_mut(index)?;
        item.quantidade = parse_integer_text(text)
            .filter(|q| *q > 0)
            .and_then(|q| u32::try_from(q).ok())
            .unwrap_or(1);
        Ok(item.quantidade)
    }

    /// 价格提交: 非数值或负数 → 原始目录价
    pub fn commit_price(&mut self, index: usize, text: &str) -> AccumulatorResult<f64> {
        let item = self.item_mut(index)?;
        item.preco_sugerido = parse_decimal_text(text)
            .filter(|p| *p >= 0.0)
            .unwrap_or(item.preco_original);
        Ok(item.preco_sugerido)
    }

    /// 按索引删除，后续记录下标前移
    pub fn remove(&mut self, index: usize) -> AccumulatorResult<OrderItem> {
        let len = self.items.len();
        if index >= len {
            return Err(AccumulatorError::IndexOutOfRange { index, len });
        }
        Ok(self.items.remove(index))
    }

    /// 清空（需调用方显式确认）
    pub fn clear(&mut self, confirmation: Confirmation) -> AccumulatorResult<usize> {
        if !confirmation.is_confirmed() {
            return Err(AccumulatorError::NotConfirmed);
        }
        let removed = self.items.len();
        self.items.clear();
        Ok(removed)
    }

    /// 清单总额 = Σ 数量 × 建议价（每次实时计算）
    pub fn total_value(&self) -> f64 {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(codigo: &str, preco: f64) -> Product {
        Product {
            codigo: codigo.to_string(),
            ean: None,
            descricao: format!("Produto {}", codigo),
            estoque: 10,
            preco,
        }
    }

    fn item(quantidade: u32, preco_sugerido: f64) -> OrderItem {
        OrderItem {
            codigo: "100".to_string(),
            descricao: "Arroz".to_string(),
            quantidade,
            preco_original: 12.0,
            preco_sugerido,
        }
    }

    #[test]
    fn test_total_value_scenario() {
        let list = OrderList::from_items(vec![item(2, 10.0), item(1, 5.5)]);
        assert_eq!(list.total_value(), 25.5);
    }

    #[test]
    fn test_append_never_merges() {
        let mut list = OrderList::new();
        list.quick_add(&product("100", 3.0));
        list.quick_add(&product("100", 3.0));

        assert_eq!(list.len(), 2);
        assert_eq!(list.total_value(), 6.0);
    }

    #[test]
    fn test_total_recomputed_after_edits() {
        let mut list = OrderList::from_items(vec![item(2, 10.0), item(1, 5.5)]);

        list.commit_quantity(1, "3").unwrap();
        assert_eq!(list.total_value(), 36.5);

        list.commit_price(0, "8").unwrap();
        assert_eq!(list.total_value(), 32.5);

        list.remove(0).unwrap();
        assert_eq!(list.total_value(), 16.5);
    }

    #[test]
    fn test_draft_validation() {
        let p = product("100", 9.9);

        let err = OrderDraft::from_product(&p).with_quantity("0").validate().unwrap_err();
        assert!(matches!(err, AccumulatorError::InvalidQuantity(_)));

        let err = OrderDraft::from_product(&p)
            .with_quantity("2")
            .with_price("abc")
            .validate()
            .unwrap_err();
        assert!(matches!(err, AccumulatorError::InvalidPrice(_)));

        let ok = OrderDraft::from_product(&p)
            .with_quantity("2")
            .with_price("8,50")
            .validate()
            .unwrap();
        assert_eq!(ok.quantidade, 2);
        assert_eq!(ok.preco_original, 9.9);
        assert_eq!(ok.preco_sugerido, 8.5);
    }

    #[test]
    fn test_invalid_draft_leaves_list_unchanged() {
        let mut list = OrderList::from_items(vec![item(1, 1.0)]);
        let draft = OrderDraft::from_product(&product("200", 2.0)).with_quantity("-1");

        assert!(list.append_draft(&draft).is_err());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_transient_edit_then_commit_defaults() {
        let mut list = OrderList::from_items(vec![item(4, 10.0)]);

        list.edit_quantity(0, "").unwrap();
        assert_eq!(list.items()[0].quantidade, 0);
        list.edit_quantity(0, "x").unwrap();
        assert_eq!(list.items()[0].quantidade, 0);
        assert_eq!(list.commit_quantity(0, "").unwrap(), 1);

        list.edit_price(0, "").unwrap();
        assert_eq!(list.items()[0].preco_sugerido, 0.0);
        assert_eq!(list.commit_price(0, "abc").unwrap(), 12.0);

        // 其余字段不受影响
        assert_eq!(list.items()[0].codigo, "100");
    }

    #[test]
    fn test_remove_shifts_indices() {
        let mut list = OrderList::from_items(vec![item(1, 1.0), item(2, 2.0), item(3, 3.0)]);

        let removed = list.remove(1).unwrap();

        assert_eq!(removed.quantidade, 2);
        assert_eq!(list.items()[1].quantidade, 3);
        assert!(matches!(
            list.remove(5),
            Err(AccumulatorError::IndexOutOfRange { index: 5, len: 2 })
        ));
    }

    #[test]
    fn test_clear_requires_confirmation_and_state_machine() {
        let mut list = OrderList::new();
        assert_eq!(list.state(), ListState::Empty);

        list.append(item(1, 1.0));
        assert_eq!(list.state(), ListState::Populated);

        assert_eq!(list.clear(Confirmation::Declined), Err(AccumulatorError::NotConfirmed));
        assert_eq!(list.len(), 1);

        assert_eq!(list.clear(Confirmation::Confirmed), Ok(1));
        assert_eq!(list.state(), ListState::Empty);
    }

    #[test]
    fn test_remove_last_item_returns_to_empty() {
        let mut list = OrderList::from_items(vec![item(1, 1.0)]);
        list.remove(0).unwrap();
        assert_eq!(list.state(), ListState::Empty);
    }
}
