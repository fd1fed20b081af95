// ==========================================
// Rebaixa Pro - 盘点清单累加器
// ==========================================
// 职责: 盘点计数累加 / 按索引修改与删除 / 确认后结束盘点
// 规则: 同一主键重复扫描时数量相加（主键比较大小写不敏感）
// 结束盘点: 所有数量归零，记录本身保留
// ==========================================

use crate::domain::product::{CatalogRecord, InventoryCountItem};
use crate::domain::types::{Confirmation, ListState};
use crate::engine::error::{AccumulatorError, AccumulatorResult};
use crate::importer::data_cleaner::parse_integer_text;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountList {
    items: Vec<InventoryCountItem>,
}

fn same_key(a: &str, b: &str) -> bool {
    !a.is_empty() && a.to_lowercase() == b.to_lowercase()
}

impl CountList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<InventoryCountItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[InventoryCountItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 已计数（数量 > 0）的记录
    pub fn counted_items(&self) -> impl Iterator<Item = &InventoryCountItem> {
        self.items.iter().filter(|i| i.quantidade > 0)
    }

    /// 以已计数记录判定状态（结束盘点后回到 Empty）
    pub fn state(&self) -> ListState {
        if self.counted_items().next().is_some() {
            ListState::Populated
        } else {
            ListState::Empty
        }
    }

    /// 按主键查找下标
    pub fn position(&self, key: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|i| same_key(i.primary_key(), key))
    }

    /// 追加: 主键已存在时数量相加，否则插入新记录
    ///
    /// # 返回
    /// - 该主键累加后的数量
    pub fn append(&mut self, item: InventoryCountItem) -> u32 {
        match self.position(item.primary_key()) {
            Some(idx) => {
                let existing = &mut self.items[idx];
                existing.quantidade = existing.quantidade.saturating_add(item.quantidade);
                debug!(key = %existing.primary_key(), quantidade = existing.quantidade, "盘点数量累加");
                existing.quantidade
            }
            None => {
                let quantidade = item.quantidade;
                debug!(key = %item.primary_key(), quantidade, "新增盘点记录");
                self.items.push(item);
                quantidade
            }
        }
    }

    fn item_mut(&mut self, index: usize) -> AccumulatorResult<&mut InventoryCountItem> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(AccumulatorError::IndexOutOfRange { index, len })
    }

    /// 按索引设置数量（非负整数，否则拒绝且不修改）
    pub fn set_quantity(&mut self, index: usize, text: &str) -> AccumulatorResult<u32> {
        let quantidade = parse_integer_text(text)
            .filter(|q| *q >= 0)
            .and_then(|q| u32::try_from(q).ok())
            .ok_or_else(|| AccumulatorError::InvalidQuantity(text.to_string()))?;
        let item = self.item_mut(index)?;
        item.quantidade = quantidade;
        Ok(quantidade)
    }

    /// 按索引删除，后续记录下标前移
    pub fn remove(&mut self, index: usize) -> AccumulatorResult<InventoryCountItem> {
        let len = self.items.len();
        if index >= len {
            return Err(AccumulatorError::IndexOutOfRange { index, len });
        }
        Ok(self.items.remove(index))
    }

    /// 结束盘点: 所有数量归零（需显式确认）
    pub fn finalize(&mut self, confirmation: Confirmation) -> AccumulatorResult<usize> {
        if !confirmation.is_confirmed() {
            return Err(AccumulatorError::NotConfirmed);
        }
        let reset = self.counted_items().count();
        for item in &mut self.items {
            item.quantidade = 0;
        }
        info!(entries = self.items.len(), reset, "盘点已结束，数量归零");
        Ok(reset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(codigo: &str, quantidade: u32) -> InventoryCountItem {
        InventoryCountItem {
            codigo: codigo.to_string(),
            ean: None,
            descricao: format!("Item {}", codigo),
            quantidade,
        }
    }

    #[test]
    fn test_append_same_key_accumulates() {
        let mut list = CountList::new();

        list.append(count("100", 3));
        let total = list.append(count("100", 2));

        assert_eq!(total, 5);
        assert_eq!(list.len(), 1);
        assert_eq!(list.items()[0].codigo, "100");
        assert_eq!(list.items()[0].quantidade, 5);
    }

    #[test]
    fn test_key_comparison_ignores_case() {
        let mut list = CountList::new();
        list.append(count("ab", 1));
        list.append(count("AB", 1));
        assert_eq!(list.len(), 1);
        assert_eq!(list.items()[0].quantidade, 2);
    }

    #[test]
    fn test_ean_only_items_keyed_by_ean() {
        let mut list = CountList::new();
        let by_ean = InventoryCountItem {
            codigo: String::new(),
            ean: Some("789".to_string()),
            descricao: "Avulso".to_string(),
            quantidade: 1,
        };
        list.append(by_ean.clone());
        list.append(by_ean);
        list.append(count("100", 1));

        assert_eq!(list.len(), 2);
        assert_eq!(list.position("789"), Some(0));
    }

    #[test]
    fn test_finalize_resets_quantities_keeps_entries() {
        let mut list = CountList::from_items(vec![count("100", 5), count("200", 0), count("300", 7)]);
        let before: Vec<(String, String)> = list
            .items()
            .iter()
            .map(|i| (i.codigo.clone(), i.descricao.clone()))
            .collect();

        assert_eq!(list.finalize(Confirmation::Declined), Err(AccumulatorError::NotConfirmed));
        assert_eq!(list.items()[0].quantidade, 5);

        assert_eq!(list.finalize(Confirmation::Confirmed), Ok(2));

        let after: Vec<(String, String)> = list
            .items()
            .iter()
            .map(|i| (i.codigo.clone(), i.descricao.clone()))
            .collect();
        assert_eq!(before, after);
        assert!(list.items().iter().all(|i| i.quantidade == 0));
        assert_eq!(list.state(), ListState::Empty);
    }

    #[test]
    fn test_set_quantity_rejects_invalid() {
        let mut list = CountList::from_items(vec![count("100", 5)]);

        assert!(matches!(
            list.set_quantity(0, "-1"),
            Err(AccumulatorError::InvalidQuantity(_))
        ));
        assert_eq!(list.items()[0].quantidade, 5);

        assert_eq!(list.set_quantity(0, "9"), Ok(9));
        assert!(matches!(
            list.set_quantity(3, "1"),
            Err(AccumulatorError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_counted_items_filter() {
        let list = CountList::from_items(vec![count("100", 0), count("200", 4)]);
        let counted: Vec<&str> = list.counted_items().map(|i| i.codigo.as_str()).collect();
        assert_eq!(counted, vec!["200"]);
        assert_eq!(list.state(), ListState::Populated);
    }
}
