// ==========================================
// Rebaixa Pro - 文件解析器实现
// ==========================================
// 阶段 0: 字节 → 单元格网格 → 原始行
// 支持: Excel (.xlsx/.xls/.ods) / 分隔文本 (.csv)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use crate::importer::raw_row::{CellValue, GridRow, RawRow};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// ==========================================
// 表头模式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMode {
    /// 第一个非空行为表头
    FirstRow,
    /// 无表头，按列下标引用；数据从第 2 行开始（不论内容）
    Positional,
}

// ==========================================
// 文件格式提示
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Excel,
    Auto,
}

impl SheetFormat {
    /// 根据扩展名判断格式
    pub fn from_path(path: &Path) -> ImportResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" | "txt" => Ok(SheetFormat::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SheetFormat::Excel),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }

    /// 根据魔数嗅探格式
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
            SheetFormat::Excel
        } else {
            SheetFormat::Csv
        }
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvParser;

impl CsvParser {
    /// 从第一行非空文本中探测分隔符（, ; \t）
    fn sniff_delimiter(bytes: &[u8]) -> u8 {
        let text = String::from_utf8_lossy(bytes);
        let first_line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");

        let mut in_quotes = false;
        let mut counts = [(b',', 0usize), (b';', 0usize), (b'\t', 0usize)];
        for ch in first_line.bytes() {
            if ch == b'"' {
                in_quotes = !in_quotes;
                continue;
            }
            if in_quotes {
                continue;
            }
            for (delim, count) in counts.iter_mut() {
                if ch == *delim {
                    *count += 1;
                }
            }
        }

        counts
            .iter()
            .filter(|(_, count)| *count > 0)
            .max_by_key(|(_, count)| *count)
            .map(|(delim, _)| *delim)
            .unwrap_or(b',')
    }
}

impl FileParser for CsvParser {
    fn parse_grid(&self, bytes: &[u8]) -> ImportResult<Vec<GridRow>> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let delimiter = Self::sniff_delimiter(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .delimiter(delimiter)
            .from_reader(bytes);

        let mut grid = Vec::new();
        for (idx, result) in reader.byte_records().enumerate() {
            let record = result?;
            let source_row = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 1);
            let cells: Vec<CellValue> = record
                .iter()
                .map(|field| {
                    let value = String::from_utf8_lossy(field).trim().to_string();
                    if value.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(value)
                    }
                })
                .collect();

            // 跳过完全空白的行
            let row = GridRow::new(source_row, cells);
            if !row.is_blank() {
                grid.push(row);
            }
        }

        Ok(grid)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    fn cell_from_data(cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::Int(v) => CellValue::Number(*v as f64),
            Data::Float(v) => CellValue::Number(*v),
            Data::Bool(v) => CellValue::Bool(*v),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Error(_) => CellValue::Empty,
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl FileParser for ExcelParser {
    fn parse_grid(&self, bytes: &[u8]) -> ImportResult<Vec<GridRow>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        // 仅读取第一个工作表
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::Parse("Arquivo sem planilhas".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        // Range 从第一个非空单元格开始；补齐左侧空列，保证列下标与源文件一致
        let (row_offset, col_offset) = range
            .start()
            .map(|(row, col)| (row as usize, col as usize))
            .unwrap_or((0, 0));

        let mut grid = Vec::new();
        for (idx, data_row) in range.rows().enumerate() {
            let mut cells: Vec<CellValue> = Vec::with_capacity(col_offset + data_row.len());
            cells.extend(std::iter::repeat(CellValue::Empty).take(col_offset));
            cells.extend(data_row.iter().map(Self::cell_from_data));

            // 跳过完全空白的行
            let row = GridRow::new(row_offset + idx + 1, cells);
            if !row.is_blank() {
                grid.push(row);
            }
        }

        Ok(grid)
    }
}

// ==========================================
// 通用文件解析器（根据格式提示或魔数选择）
// ==========================================
pub struct UniversalFileParser {
    format: SheetFormat,
}

impl Default for UniversalFileParser {
    fn default() -> Self {
        Self::new(SheetFormat::Auto)
    }
}

impl UniversalFileParser {
    pub fn new(format: SheetFormat) -> Self {
        Self { format }
    }
}

impl FileParser for UniversalFileParser {
    fn parse_grid(&self, bytes: &[u8]) -> ImportResult<Vec<GridRow>> {
        let format = match self.format {
            SheetFormat::Auto => SheetFormat::sniff(bytes),
            explicit => explicit,
        };

        match format {
            SheetFormat::Excel => ExcelParser.parse_grid(bytes),
            _ => CsvParser::default().parse_grid(bytes),
        }
    }
}

/// 将网格切分为原始行
///
/// # 规则
/// - FirstRow: 第一行为表头，表头为空的列忽略
/// - Positional: 第一行跳过（不论内容），其余按列下标保留
///
/// # 返回
/// - Ok((表头, 行列表)): Positional 模式下表头为空
/// - Err(ImportError::EmptyCatalog): 无数据行
pub fn split_rows(
    grid: Vec<GridRow>,
    mode: HeaderMode,
) -> ImportResult<(Vec<String>, Vec<RawRow>)> {
    let mut iter = grid.into_iter();

    let (headers, rows): (Vec<String>, Vec<RawRow>) = match mode {
        HeaderMode::FirstRow => {
            let headers: Vec<String> = match iter.next() {
                Some(header_row) => header_row
                    .cells
                    .iter()
                    .map(|cell| cell.to_string().trim().to_string())
                    .collect(),
                None => return Err(ImportError::EmptyCatalog),
            };

            let rows = iter
                .map(|data_row| {
                    let cells = data_row
                        .cells
                        .into_iter()
                        .enumerate()
                        .filter_map(|(col, value)| {
                            headers
                                .get(col)
                                .filter(|h| !h.is_empty())
                                .map(|h| (h.clone(), value))
                        })
                        .collect();
                    RawRow::keyed(data_row.source_row, cells)
                })
                .filter(|row| !row.is_blank())
                .collect();

            (headers, rows)
        }
        HeaderMode::Positional => {
            let rows = iter
                .skip(1)
                .map(|data_row| RawRow::positional(data_row.source_row, data_row.cells))
                .collect();
            (Vec::new(), rows)
        }
    };

    if rows.is_empty() {
        return Err(ImportError::EmptyCatalog);
    }

    Ok((headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_parser_valid_bytes() {
        let bytes = b"codigo,descricao,estoque,preco\n100,Arroz,50,9.9\n200,Feijao,10,7.5\n";

        let grid = CsvParser::default().parse_grid(bytes).unwrap();

        assert_eq!(grid.len(), 3);
        assert_eq!(grid[1].cells[0], CellValue::from("100"));
        assert_eq!(grid[2].cells[3], CellValue::from("7.5"));
    }

    #[test]
    fn test_csv_parser_sniffs_semicolon() {
        let bytes = "\u{feff}codigo;descricao;preco\n100;Arroz;9,90\n".as_bytes();

        let grid = CsvParser::default().parse_grid(bytes).unwrap();

        assert_eq!(grid[0].cells[0], CellValue::from("codigo"));
        assert_eq!(grid[1].cells[2], CellValue::from("9,90"));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let bytes = b"codigo,preco\n100,2.5\n,\n200,3.0\n";

        let grid = CsvParser::default().parse_grid(bytes).unwrap();

        // 应跳过空行
        assert_eq!(grid.len(), 3);
    }

    #[test]
    fn test_excel_parser_rejects_garbage() {
        let mut bytes = ZIP_MAGIC.to_vec();
        bytes.extend_from_slice(b"not really a workbook");

        let result = UniversalFileParser::default().parse_grid(&bytes);

        assert!(matches!(result, Err(ImportError::Parse(_))));
    }

    #[test]
    fn test_split_rows_first_row_header() {
        let grid = CsvParser::default()
            .parse_grid(b"codigo,descricao\n100,Arroz\n")
            .unwrap();

        let (headers, rows) = split_rows(grid, HeaderMode::FirstRow).unwrap();

        assert_eq!(headers, vec!["codigo".to_string(), "descricao".to_string()]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_number, 2);
    }

    #[test]
    fn test_split_rows_positional_skips_first_row() {
        let grid = CsvParser::default()
            .parse_grid(b"789,100,Arroz\n790,200,Feijao\n")
            .unwrap();

        let (headers, rows) = split_rows(grid, HeaderMode::Positional).unwrap();

        assert!(headers.is_empty());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_number, 2);
    }

    #[test]
    fn test_row_number_follows_source_after_blank_rows() {
        let grid = CsvParser::default()
            .parse_grid(b"codigo,preco\n100,2.5\n,\n200,3.0\n")
            .unwrap();

        let (_, rows) = split_rows(grid, HeaderMode::FirstRow).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[1].row_number, 4);
    }

    #[test]
    fn test_split_rows_header_only_is_empty_catalog() {
        let grid = CsvParser::default().parse_grid(b"codigo,descricao\n").unwrap();

        let result = split_rows(grid, HeaderMode::FirstRow);

        assert!(matches!(result, Err(ImportError::EmptyCatalog)));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            SheetFormat::from_path(Path::new("base.XLSX")).unwrap(),
            SheetFormat::Excel
        );
        assert!(matches!(
            SheetFormat::from_path(Path::new("base.pdf")),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }
}
