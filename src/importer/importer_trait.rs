// ==========================================
// Rebaixa Pro - 导入组件 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 解析 → 映射 → 清洗 → 主键剔除
// ==========================================

use crate::domain::product::RawProductRecord;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::CanonicalField;
use crate::importer::raw_row::{CellValue, GridRow, RawRow};

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 将原始字节解析为单元格网格
    ///
    /// # 返回
    /// - Ok(Vec<GridRow>): 非空行（保持源顺序，携带源行号）
    /// - Err(ImportError::Parse): 负载无法解码为表格
    fn parse_grid(&self, bytes: &[u8]) -> ImportResult<Vec<GridRow>>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 字段映射接口（阶段 1）
// 实现者: FieldMapper
pub trait FieldMapper: Send + Sync {
    /// 将原始行映射为 RawProductRecord
    ///
    /// # 说明
    /// - 缺失字段使用默认值（文本为空串，数值为 0）
    /// - 不做主键校验，由目录记录构建时剔除
    fn map_row(&self, row: &RawRow) -> RawProductRecord;

    /// 返回表头中无法匹配的必填规范字段
    fn missing_fields(&self, headers: &[String], required: &[CanonicalField]) -> Vec<CanonicalField>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 类型转换与清洗接口（阶段 2）
// 实现者: DataCleaner
pub trait DataCleaner: Send + Sync {
    /// 文本字段: 字符串化 + TRIM
    fn clean_text(&self, value: &CellValue) -> String;

    /// 十进制字段: 非数值/缺失 → 0，负数 → 0
    fn clean_decimal(&self, value: &CellValue) -> f64;

    /// 整数字段: 十进制解析后向零截断，非负
    fn clean_count(&self, value: &CellValue) -> u32;
}
