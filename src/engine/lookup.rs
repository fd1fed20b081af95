// ==========================================
// Rebaixa Pro - 查询引擎
// ==========================================
// 职责: 目录精确点查（不修改目录）
// 规则: 大小写不敏感的完全相等；按目录顺序第一条命中
// ==========================================

use crate::domain::product::CatalogRecord;
use crate::domain::types::CatalogKind;
use tracing::debug;

// ==========================================
// KeyPolicy - 查询键策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// 仅匹配 codigo
    CodeOnly,
    /// 匹配 codigo 或 ean
    CodeOrEan,
}

impl KeyPolicy {
    /// 每种目录的默认策略（两类目录均允许扫码查询）
    pub fn for_kind(kind: CatalogKind) -> Self {
        match kind {
            CatalogKind::Products | CatalogKind::Inventory => KeyPolicy::CodeOrEan,
        }
    }

    fn matches<T: CatalogRecord>(&self, record: &T, query: &str) -> bool {
        let code_hit = eq_ignore_case(record.codigo(), query);
        match self {
            KeyPolicy::CodeOnly => code_hit,
            KeyPolicy::CodeOrEan => {
                code_hit || record.ean().map(|ean| eq_ignore_case(ean, query)).unwrap_or(false)
            }
        }
    }
}

// ==========================================
// LookupOutcome - 查询结果
// ==========================================
#[derive(Debug, PartialEq)]
pub enum LookupOutcome<'a, T> {
    /// 查询串为空，未执行扫描
    NoQuery,
    Found(&'a T),
    NotFound,
}

impl<'a, T> LookupOutcome<'a, T> {
    pub fn found(&self) -> Option<&'a T> {
        match self {
            LookupOutcome::Found(record) => Some(*record),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found(_))
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b
}

/// 在目录中查找第一条键值相等的记录
pub fn lookup<'a, T: CatalogRecord>(
    catalog: &'a [T],
    query: &str,
    policy: KeyPolicy,
) -> LookupOutcome<'a, T> {
    let query = query.trim();
    if query.is_empty() {
        return LookupOutcome::NoQuery;
    }

    let needle = query.to_lowercase();
    match catalog.iter().find(|record| policy.matches(*record, &needle)) {
        Some(record) => LookupOutcome::Found(record),
        None => {
            debug!(query = %query, catalog_size = catalog.len(), "查询未命中");
            LookupOutcome::NotFound
        }
    }
}

/// 扫码枪输入预处理: 仅保留数字
pub fn sanitize_scanner_input(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}
