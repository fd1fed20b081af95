// ==========================================
// Rebaixa Pro - 字段映射器实现
// ==========================================
// 职责: 源列名 → 规范字段映射 + 类型转换
// 别名表为声明式数据: 新别名只需追加到表中
// ==========================================

use crate::domain::product::RawProductRecord;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::importer_trait::{DataCleaner as _, FieldMapper as FieldMapperTrait};
use crate::importer::raw_row::{CellValue, RawRow, RowCells};
use std::fmt;

// ==========================================
// CanonicalField - 规范字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Codigo,
    Ean,
    Descricao,
    Estoque,
    Preco,
    Quantidade,
}

impl CanonicalField {
    pub fn name(&self) -> &'static str {
        match self {
            CanonicalField::Codigo => "codigo",
            CanonicalField::Ean => "ean",
            CanonicalField::Descricao => "descricao",
            CanonicalField::Estoque => "estoque",
            CanonicalField::Preco => "preco",
            CanonicalField::Quantidade => "quantidade",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 规范字段 → 列名别名（小写；列表顺序即优先级）
pub type AliasTable = &'static [(CanonicalField, &'static [&'static str])];

pub const DEFAULT_ALIASES: AliasTable = &[
    (
        CanonicalField::Codigo,
        &["codigo", "código", "cod", "cód", "id", "sku"],
    ),
    (
        CanonicalField::Ean,
        &["ean", "gtin", "codigo de barras", "código de barras", "barcode"],
    ),
    (
        CanonicalField::Descricao,
        &["descricao", "descrição", "nome", "produto", "description"],
    ),
    (
        CanonicalField::Estoque,
        &["estoque", "quantidade", "qtd", "stock"],
    ),
    (
        CanonicalField::Preco,
        &["preco", "preço", "valor", "price"],
    ),
    (
        CanonicalField::Quantidade,
        &["quantidade", "qtd", "qtde", "contagem", "qty"],
    ),
];

/// 列名标准化（TRIM + 小写）
fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// 通用解析器: 按别名顺序在行内查找第一个匹配列
///
/// # 返回
/// - Some(&CellValue): 第一个别名命中的列值
/// - None: 无任何别名命中
pub fn resolve_cell<'a>(
    cells: &'a [(String, CellValue)],
    aliases: &[&str],
) -> Option<&'a CellValue> {
    aliases.iter().find_map(|alias| {
        cells
            .iter()
            .find(|(header, _)| normalize_header(header) == *alias)
            .map(|(_, value)| value)
    })
}

pub struct FieldMapper {
    aliases: AliasTable,
    layout: &'static [CanonicalField], // 无表头模式下的列布局
    cleaner: DataCleaner,
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new(DEFAULT_ALIASES, &[])
    }
}

impl FieldMapper {
    pub fn new(aliases: AliasTable, layout: &'static [CanonicalField]) -> Self {
        Self {
            aliases,
            layout,
            cleaner: DataCleaner,
        }
    }

    /// 无表头模式映射器
    pub fn positional(layout: &'static [CanonicalField]) -> Self {
        Self::new(DEFAULT_ALIASES, layout)
    }

    fn aliases_for(&self, field: CanonicalField) -> &'static [&'static str] {
        self.aliases
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, aliases)| *aliases)
            .unwrap_or(&[])
    }

    fn lookup<'a>(&self, row: &'a RawRow, field: CanonicalField) -> Option<&'a CellValue> {
        match &row.cells {
            RowCells::Keyed(cells) => resolve_cell(cells, self.aliases_for(field)),
            RowCells::Positional(cells) => self
                .layout
                .iter()
                .position(|f| *f == field)
                .and_then(|idx| cells.get(idx)),
        }
    }

    fn get_text(&self, row: &RawRow, field: CanonicalField) -> String {
        self.lookup(row, field)
            .map(|v| self.cleaner.clean_text(v))
            .unwrap_or_default()
    }

    fn get_decimal(&self, row: &RawRow, field: CanonicalField) -> f64 {
        self.lookup(row, field)
            .map(|v| self.cleaner.clean_decimal(v))
            .unwrap_or(0.0)
    }

    fn get_count(&self, row: &RawRow, field: CanonicalField) -> u32 {
        self.lookup(row, field)
            .map(|v| self.cleaner.clean_count(v))
            .unwrap_or(0)
    }
}

impl FieldMapperTrait for FieldMapper {
    fn map_row(&self, row: &RawRow) -> RawProductRecord {
        RawProductRecord {
            codigo: self.get_text(row, CanonicalField::Codigo),
            ean: self.get_text(row, CanonicalField::Ean),
            descricao: self.get_text(row, CanonicalField::Descricao),
            estoque: self.get_count(row, CanonicalField::Estoque),
            preco: self.get_decimal(row, CanonicalField::Preco),
            quantidade: self.get_count(row, CanonicalField::Quantidade),
            row_number: row.row_number,
        }
    }

    fn missing_fields(&self, headers: &[String], required: &[CanonicalField]) -> Vec<CanonicalField> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        required
            .iter()
            .copied()
            .filter(|field| {
                !self
                    .aliases_for(*field)
                    .iter()
                    .any(|alias| normalized.iter().any(|h| h.as_str() == *alias))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(cells: &[(&str, &str)]) -> RawRow {
        RawRow::keyed(
            2,
            cells
                .iter()
                .map(|(k, v)| (k.to_string(), CellValue::from(*v)))
                .collect(),
        )
    }

    #[test]
    fn test_field_mapper_basic() {
        let row = keyed(&[
            ("codigo", "100"),
            ("descricao", "Rice"),
            ("estoque", "50"),
            ("preco", "9.9"),
        ]);

        let record = FieldMapper::default().map_row(&row);

        assert_eq!(record.codigo, "100");
        assert_eq!(record.descricao, "Rice");
        assert_eq!(record.estoque, 50);
        assert_eq!(record.preco, 9.9);
        assert_eq!(record.row_number, 2);
    }

    #[test]
    fn test_header_match_is_case_insensitive() {
        let row = keyed(&[("  SKU ", "A-1"), ("Descrição", "Feijão"), ("Preço", "7,50")]);

        let record = FieldMapper::default().map_row(&row);

        assert_eq!(record.codigo, "A-1");
        assert_eq!(record.descricao, "Feijão");
        assert_eq!(record.preco, 7.5);
    }

    #[test]
    fn test_alias_order_is_priority() {
        // "id" 在列顺序上靠前，但 "codigo" 别名优先级更高
        let row = keyed(&[("id", "999"), ("codigo", "100")]);

        let record = FieldMapper::default().map_row(&row);

        assert_eq!(record.codigo, "100");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let row = keyed(&[("codigo", "100")]);

        let record = FieldMapper::default().map_row(&row);

        assert_eq!(record.descricao, "");
        assert_eq!(record.estoque, 0);
        assert_eq!(record.preco, 0.0);
    }

    #[test]
    fn test_positional_layout() {
        const LAYOUT: &[CanonicalField] = &[
            CanonicalField::Ean,
            CanonicalField::Codigo,
            CanonicalField::Descricao,
            CanonicalField::Quantidade,
        ];
        let row = RawRow::positional(
            2,
            vec![
                CellValue::Number(7891000100103.0),
                CellValue::from(" 100 "),
                CellValue::from("Arroz"),
                CellValue::from("4"),
            ],
        );

        let record = FieldMapper::positional(LAYOUT).map_row(&row);

        assert_eq!(record.ean, "7891000100103");
        assert_eq!(record.codigo, "100");
        assert_eq!(record.quantidade, 4);
    }

    #[test]
    fn test_missing_required_headers() {
        let headers = vec!["Codigo".to_string(), "Descricao".to_string()];
        let missing = FieldMapper::default().missing_fields(
            &headers,
            &[
                CanonicalField::Codigo,
                CanonicalField::Descricao,
                CanonicalField::Estoque,
                CanonicalField::Preco,
            ],
        );
        assert_eq!(missing, vec![CanonicalField::Estoque, CanonicalField::Preco]);
    }
}
