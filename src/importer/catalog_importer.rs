// ==========================================
// Rebaixa Pro - 目录导入器
// ==========================================
// 职责: 整合导入流程，从字节/远程行到目录记录
// 流程: 解析 → 表头校验 → 映射 → 清洗 → 主键剔除
// 说明: 导入器不持有状态，目录替换由会话控制器完成
// ==========================================

use crate::domain::product::{Catalog, CatalogRecord};
use crate::domain::types::CatalogKind;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{CanonicalField, FieldMapper};
use crate::importer::file_parser::{split_rows, HeaderMode, SheetFormat, UniversalFileParser};
use crate::importer::importer_trait::{FieldMapper as _, FileParser};
use crate::importer::raw_row::{RawRow, RowCells};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

const CONSULTATION_LAYOUT: &[CanonicalField] = &[
    CanonicalField::Ean,
    CanonicalField::Codigo,
    CanonicalField::Descricao,
];

const INVENTORY_LAYOUT: &[CanonicalField] = &[
    CanonicalField::Ean,
    CanonicalField::Codigo,
    CanonicalField::Descricao,
    CanonicalField::Quantidade,
];

const PRODUCT_REQUIRED: &[CanonicalField] = &[
    CanonicalField::Codigo,
    CanonicalField::Descricao,
    CanonicalField::Estoque,
    CanonicalField::Preco,
];

// ==========================================
// ImportProfile - 导入配置档
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportProfile {
    pub name: &'static str,
    pub kind: CatalogKind,
    pub header_mode: HeaderMode,
    pub layout: &'static [CanonicalField], // 仅 Positional 模式使用
    pub required_fields: &'static [CanonicalField],
    pub strict_headers: bool,
}

impl ImportProfile {
    /// 商品目录（有表头，宽松别名）
    pub fn products() -> Self {
        Self {
            name: "produtos",
            kind: CatalogKind::Products,
            header_mode: HeaderMode::FirstRow,
            layout: &[],
            required_fields: PRODUCT_REQUIRED,
            strict_headers: false,
        }
    }

    /// 商品目录（有表头，必填列缺失即拒绝）
    pub fn products_strict() -> Self {
        Self {
            name: "produtos_estrito",
            strict_headers: true,
            ..Self::products()
        }
    }

    /// 查询目录（无表头: EAN, 代码, 描述）
    pub fn consultation() -> Self {
        Self {
            name: "consulta",
            kind: CatalogKind::Products,
            header_mode: HeaderMode::Positional,
            layout: CONSULTATION_LAYOUT,
            required_fields: CONSULTATION_LAYOUT,
            strict_headers: true,
        }
    }

    /// 盘点目录（无表头: EAN, 代码, 描述, 数量）
    pub fn inventory() -> Self {
        Self {
            name: "inventario",
            kind: CatalogKind::Inventory,
            header_mode: HeaderMode::Positional,
            layout: INVENTORY_LAYOUT,
            required_fields: INVENTORY_LAYOUT,
            strict_headers: true,
        }
    }

    /// 按名称查找（命令行参数）
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "produtos" | "products" => Some(Self::products()),
            "produtos_estrito" | "strict" => Some(Self::products_strict()),
            "consulta" | "consultation" => Some(Self::consultation()),
            "inventario" | "inventário" | "inventory" => Some(Self::inventory()),
            _ => None,
        }
    }

    fn field_mapper(&self) -> FieldMapper {
        match self.header_mode {
            HeaderMode::FirstRow => FieldMapper::default(),
            HeaderMode::Positional => FieldMapper::positional(self.layout),
        }
    }
}

// ==========================================
// ImportOutcome - 导入结果（尚未提交到会话）
// ==========================================
#[derive(Debug, Clone)]
pub struct ImportOutcome<T> {
    pub batch_id: String,
    pub profile: &'static str,
    pub records: Vec<T>,
    pub total_rows: usize,
    pub rejected_rows: usize,
    pub imported_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl<T> ImportOutcome<T> {
    pub fn accepted_rows(&self) -> usize {
        self.records.len()
    }

    /// 转换为目录（整体替换用）
    pub fn into_catalog(self) -> Catalog<T> {
        Catalog::new(self.records, self.imported_at)
    }
}

// ==========================================
// CatalogImporter - 目录导入器
// ==========================================
pub struct CatalogImporter {
    file_parser: Box<dyn FileParser>,
}

impl Default for CatalogImporter {
    fn default() -> Self {
        Self::new(Box::new(UniversalFileParser::default()))
    }
}

impl CatalogImporter {
    pub fn new(file_parser: Box<dyn FileParser>) -> Self {
        Self { file_parser }
    }

    /// 从本地文件导入（扩展名决定是否支持，内容按魔数解析）
    #[instrument(skip(self, profile), fields(profile_name = profile.name))]
    pub fn import_file<T: CatalogRecord>(
        &self,
        path: &Path,
        profile: &ImportProfile,
    ) -> ImportResult<ImportOutcome<T>> {
        SheetFormat::from_path(path)?;
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ImportError::FileNotFound(path.display().to_string()),
            _ => ImportError::FileReadError(format!("{}: {}", path.display(), e)),
        })?;
        info!(file = %path.display(), size = bytes.len(), "读取导入文件");
        self.import_bytes(&bytes, profile)
    }

    /// 从原始字节导入
    #[instrument(skip(self, bytes, profile), fields(profile_name = profile.name, size = bytes.len()))]
    pub fn import_bytes<T: CatalogRecord>(
        &self,
        bytes: &[u8],
        profile: &ImportProfile,
    ) -> ImportResult<ImportOutcome<T>> {
        let start = Instant::now();

        // === 步骤 1: 解析 ===
        debug!("步骤 1: 解析文件");
        let grid = self.file_parser.parse_grid(bytes)?;
        let (headers, rows) = split_rows(grid, profile.header_mode)?;

        self.normalize(headers, rows, profile, start)
    }

    /// 从远程表格 API 的行对象导入（键即表头）
    #[instrument(skip(self, rows, profile), fields(profile_name = profile.name, row_count = rows.len()))]
    pub fn import_rows<T: CatalogRecord>(
        &self,
        rows: Vec<RawRow>,
        profile: &ImportProfile,
    ) -> ImportResult<ImportOutcome<T>> {
        let start = Instant::now();
        let rows: Vec<RawRow> = rows.into_iter().filter(|r| !r.is_blank()).collect();

        let headers = match rows.first().map(|r| &r.cells) {
            Some(RowCells::Keyed(cells)) => cells.iter().map(|(h, _)| h.clone()).collect(),
            Some(RowCells::Positional(_)) => Vec::new(),
            None => return Err(ImportError::EmptyCatalog),
        };

        self.normalize(headers, rows, profile, start)
    }

    fn normalize<T: CatalogRecord>(
        &self,
        headers: Vec<String>,
        rows: Vec<RawRow>,
        profile: &ImportProfile,
        start: Instant,
    ) -> ImportResult<ImportOutcome<T>> {
        if profile.kind != T::KIND {
            return Err(ImportError::InternalError(format!(
                "perfil {} não gera registros do tipo {}",
                profile.name,
                T::KIND
            )));
        }

        let batch_id = Uuid::new_v4().to_string();
        let total_rows = rows.len();
        let mapper = profile.field_mapper();

        // === 步骤 2: 表头校验 ===
        if profile.strict_headers {
            debug!("步骤 2: 表头校验");
            check_columns(&mapper, &headers, &rows, profile)?;
        }

        // === 步骤 3: 映射 + 清洗 + 主键剔除 ===
        debug!("步骤 3: 字段映射");
        let mut records = Vec::with_capacity(total_rows);
        let mut rejected_rows = 0usize;
        for row in &rows {
            let raw = mapper.map_row(row);
            let row_number = raw.row_number;
            match T::from_raw(raw) {
                Some(record) => records.push(record),
                None => {
                    debug!(row_number, "主键为空，剔除该行");
                    rejected_rows += 1;
                }
            }
        }

        if records.is_empty() {
            warn!(batch_id = %batch_id, total_rows, "所有行均被剔除");
            return Err(ImportError::EmptyCatalog);
        }

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            batch_id = %batch_id,
            total_rows,
            accepted = records.len(),
            rejected = rejected_rows,
            elapsed_ms,
            "目录导入完成"
        );

        Ok(ImportOutcome {
            batch_id,
            profile: profile.name,
            records,
            total_rows,
            rejected_rows,
            imported_at: Utc::now(),
            elapsed_ms,
        })
    }
}

/// 严格模式列校验
///
/// - 有表头: 每个必填字段至少匹配一个别名
/// - 无表头: 第一行数据的列数不少于布局长度
fn check_columns(
    mapper: &FieldMapper,
    headers: &[String],
    rows: &[RawRow],
    profile: &ImportProfile,
) -> ImportResult<()> {
    let missing: Vec<String> = match profile.header_mode {
        HeaderMode::FirstRow => mapper
            .missing_fields(headers, profile.required_fields)
            .iter()
            .map(|f| f.name().to_string())
            .collect(),
        HeaderMode::Positional => {
            let width = rows.first().map(RawRow::len).unwrap_or(0);
            profile
                .layout
                .iter()
                .skip(width)
                .map(|f| f.name().to_string())
                .collect()
        }
    };

    if missing.is_empty() {
        Ok(())
    } else {
        warn!(profile = profile.name, missing = ?missing, "必填列缺失");
        Err(ImportError::ColumnMismatch { missing })
    }
}
