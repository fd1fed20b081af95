// ==========================================
// Rebaixa Pro - 数据清洗器实现
// ==========================================
// 职责: TRIM / 数值解析 / 非负约束
// ==========================================

use crate::importer::importer_trait::DataCleaner as DataCleanerTrait;
use crate::importer::raw_row::CellValue;

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &CellValue) -> String {
        value.to_string().trim().to_string()
    }

    fn clean_decimal(&self, value: &CellValue) -> f64 {
        let parsed = match value {
            CellValue::Number(v) => Some(*v),
            CellValue::Text(s) => parse_decimal_text(s),
            CellValue::Bool(_) | CellValue::Empty => None,
        };

        match parsed {
            Some(v) if v.is_finite() && v > 0.0 => v,
            _ => 0.0,
        }
    }

    fn clean_count(&self, value: &CellValue) -> u32 {
        let v = self.clean_decimal(value).trunc();
        if v >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            v as u32
        }
    }
}

/// 解析十进制文本
///
/// # 规则
/// - 去除首尾空白与 "R$" 前缀
/// - 仅含逗号: 逗号为小数点（"9,90"）
/// - 同时含点与逗号: 最后出现者为小数点（"1.234,50"、"1,234.50"）
/// - 空串/非数值 → None
pub fn parse_decimal_text(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_prefix("R$").unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = match (trimmed.rfind(','), trimmed.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => trimmed.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => trimmed.replace(',', ""),
        (Some(_), None) => trimmed.replace(',', "."),
        _ => trimmed.to_string(),
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 解析整数文本（前后空白容忍，不接受小数）
pub fn parse_integer_text(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_trims_and_stringifies() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.clean_text(&CellValue::from("  Arroz  ")), "Arroz");
        assert_eq!(cleaner.clean_text(&CellValue::Number(100.0)), "100");
        assert_eq!(cleaner.clean_text(&CellValue::Empty), "");
    }

    #[test]
    fn test_clean_decimal_defaults_to_zero() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.clean_decimal(&CellValue::from("9.9")), 9.9);
        assert_eq!(cleaner.clean_decimal(&CellValue::from("abc")), 0.0);
        assert_eq!(cleaner.clean_decimal(&CellValue::Empty), 0.0);
        assert_eq!(cleaner.clean_decimal(&CellValue::Number(-3.0)), 0.0);
    }

    #[test]
    fn test_parse_decimal_text_brazilian_format() {
        assert_eq!(parse_decimal_text("9,90"), Some(9.9));
        assert_eq!(parse_decimal_text("R$ 1.234,50"), Some(1234.5));
        assert_eq!(parse_decimal_text(" 12.5 "), Some(12.5));
        assert_eq!(parse_decimal_text(""), None);
        assert_eq!(parse_decimal_text("NaN"), None);
    }

    #[test]
    fn test_parse_decimal_text_last_separator_is_decimal() {
        assert_eq!(parse_decimal_text("1,234.50"), Some(1234.5));
        assert_eq!(parse_decimal_text("1,234,567.89"), Some(1234567.89));
        assert_eq!(parse_decimal_text("1.234.567,89"), Some(1234567.89));
        assert_eq!(parse_decimal_text("1.2,3.4"), None);
    }

    #[test]
    fn test_clean_count_truncates() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.clean_count(&CellValue::from("50")), 50);
        assert_eq!(cleaner.clean_count(&CellValue::Number(7.8)), 7);
        assert_eq!(cleaner.clean_count(&CellValue::from("-2")), 0);
    }
}
