// ==========================================
// Rebaixa Pro - 原始行记录
// ==========================================
// 职责: 解析阶段的单元格值与行结构（尚未映射为规范字段）
// ==========================================

use std::fmt;

// ==========================================
// CellValue - 原始单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl CellValue {
    /// 空白判定（空字符串/纯空白视为空）
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 数值单元格直接返回，文本单元格不在此处解析
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            // 整数值不带小数部分（Excel 中以数字保存的条码）
            CellValue::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{:.0}", v),
            CellValue::Number(v) => write!(f, "{}", v),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Empty,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or_else(|| CellValue::Text(n.to_string())),
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

// ==========================================
// GridRow - 网格行（保留源行号）
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub source_row: usize, // 源文件中的行号（1 起）
    pub cells: Vec<CellValue>,
}

impl GridRow {
    pub fn new(source_row: usize, cells: Vec<CellValue>) -> Self {
        Self { source_row, cells }
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_empty)
    }
}

// ==========================================
// RawRow - 原始行
// ==========================================
// Keyed: 表头模式，保留列顺序
// Positional: 无表头模式，按列下标引用
#[derive(Debug, Clone, PartialEq)]
pub enum RowCells {
    Keyed(Vec<(String, CellValue)>),
    Positional(Vec<CellValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub row_number: usize, // 源数据中的行号（1 起，含表头行）
    pub cells: RowCells,
}

impl RawRow {
    pub fn keyed(row_number: usize, cells: Vec<(String, CellValue)>) -> Self {
        Self {
            row_number,
            cells: RowCells::Keyed(cells),
        }
    }

    pub fn positional(row_number: usize, cells: Vec<CellValue>) -> Self {
        Self {
            row_number,
            cells: RowCells::Positional(cells),
        }
    }

    /// 从 JSON 对象构建（远程表格 API 行）
    pub fn from_json_object(
        row_number: usize,
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        let cells = object
            .iter()
            .map(|(k, v)| (k.clone(), CellValue::from(v)))
            .collect();
        Self::keyed(row_number, cells)
    }

    pub fn is_blank(&self) -> bool {
        match &self.cells {
            RowCells::Keyed(cells) => cells.iter().all(|(_, v)| v.is_empty()),
            RowCells::Positional(cells) => cells.iter().all(CellValue::is_empty),
        }
    }

    pub fn len(&self) -> usize {
        match &self.cells {
            RowCells::Keyed(cells) => cells.len(),
            RowCells::Positional(cells) => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_number_renders_without_fraction() {
        assert_eq!(CellValue::Number(7891000100103.0).to_string(), "7891000100103");
        assert_eq!(CellValue::Number(9.9).to_string(), "9.9");
    }

    #[test]
    fn test_json_value_conversion() {
        let value = serde_json::json!({"codigo": 100, "descricao": "Arroz", "extra": null});
        let row = RawRow::from_json_object(1, value.as_object().unwrap());
        match row.cells {
            RowCells::Keyed(cells) => {
                assert!(cells.contains(&("codigo".to_string(), CellValue::Number(100.0))));
                assert!(cells.contains(&("extra".to_string(), CellValue::Empty)));
            }
            RowCells::Positional(_) => panic!("expected keyed row"),
        }
    }

    #[test]
    fn test_blank_row_detection() {
        let row = RawRow::positional(2, vec![CellValue::from("  "), CellValue::Empty]);
        assert!(row.is_blank());
        let row = RawRow::positional(3, vec![CellValue::from("1")]);
        assert!(!row.is_blank());
    }
}
