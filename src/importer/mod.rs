// ==========================================
// Rebaixa Pro - 导入层
// ==========================================
// 职责: 外部表格数据导入，生成规范目录记录
// 支持: Excel, CSV, 远程表格 API 行
// ==========================================

// 模块声明
pub mod catalog_importer;
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod raw_row;

// 重导出核心类型
pub use catalog_importer::{CatalogImporter, ImportOutcome, ImportProfile};
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{CanonicalField, FieldMapper as FieldMapperImpl, DEFAULT_ALIASES};
pub use file_parser::{CsvParser, ExcelParser, HeaderMode, SheetFormat, UniversalFileParser};
pub use raw_row::{CellValue, GridRow, RawRow, RowCells};

// 重导出 Trait 接口
pub use importer_trait::{DataCleaner, FieldMapper, FileParser};
