// ==========================================
// Rebaixa Pro - 表格导出
// ==========================================
// 补货清单: Código, Descrição, Quantidade, Preço Original, Sugestão de Preço
// 盘点清单: EAN, Código, Descrição, Quantidade（仅数量 > 0）
// ==========================================

use crate::engine::count_list::CountList;
use crate::engine::order_list::OrderList;
use crate::export::error::{ExportError, ExportResult};
use chrono::{DateTime, TimeZone};
use csv::WriterBuilder;
use tracing::info;

pub const ORDER_FILE_NAME: &str = "solicitacao_produtos.csv";
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

const ORDER_HEADERS: [&str; 5] = [
    "Código",
    "Descrição",
    "Quantidade",
    "Preço Original",
    "Sugestão de Preço",
];
const COUNT_HEADERS: [&str; 4] = ["EAN", "Código", "Descrição", "Quantidade"];

// Excel 依赖 BOM 识别 UTF-8
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

fn new_writer() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new().from_writer(UTF8_BOM.to_vec())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> ExportResult<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| ExportError::Write(e.to_string()))
}

/// 导出补货清单
pub fn export_order_list(list: &OrderList) -> ExportResult<ExportFile> {
    if list.is_empty() {
        return Err(ExportError::EmptyList);
    }

    let mut writer = new_writer();
    writer.write_record(ORDER_HEADERS)?;
    for item in list.items() {
        writer.write_record([
            item.codigo.clone(),
            item.descricao.clone(),
            item.quantidade.to_string(),
            format!("{:.2}", item.preco_original),
            format!("{:.2}", item.preco_sugerido),
        ])?;
    }

    let bytes = finish(writer)?;
    info!(rows = list.len(), size = bytes.len(), "补货清单已导出");
    Ok(ExportFile {
        file_name: ORDER_FILE_NAME.to_string(),
        content_type: CSV_CONTENT_TYPE,
        bytes,
    })
}

/// 导出盘点清单（文件名带时间戳）
pub fn export_count_list<Tz>(list: &CountList, now: DateTime<Tz>) -> ExportResult<ExportFile>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let counted: Vec<_> = list.counted_items().collect();
    if counted.is_empty() {
        return Err(ExportError::EmptyList);
    }

    let mut writer = new_writer();
    writer.write_record(COUNT_HEADERS)?;
    for item in &counted {
        writer.write_record([
            item.ean.clone().unwrap_or_default(),
            item.codigo.clone(),
            item.descricao.clone(),
            item.quantidade.to_string(),
        ])?;
    }

    let bytes = finish(writer)?;
    let file_name = format!("inventario_{}.csv", now.format("%Y-%m-%d_%H%M%S"));
    info!(rows = counted.len(), file_name = %file_name, "盘点清单已导出");
    Ok(ExportFile {
        file_name,
        content_type: CSV_CONTENT_TYPE,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::{InventoryCountItem, OrderItem};
    use chrono::Utc;

    fn csv_text(file: &ExportFile) -> String {
        String::from_utf8(file.bytes[UTF8_BOM.len()..].to_vec()).unwrap()
    }

    #[test]
    fn test_export_order_list_columns() {
        let list = OrderList::from_items(vec![OrderItem {
            codigo: "100".to_string(),
            descricao: "Arroz, tipo 1".to_string(),
            quantidade: 2,
            preco_original: 10.0,
            preco_sugerido: 8.5,
        }]);

        let file = export_order_list(&list).unwrap();

        assert_eq!(file.file_name, "solicitacao_produtos.csv");
        assert!(file.bytes.starts_with(UTF8_BOM));
        let text = csv_text(&file);
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Código,Descrição,Quantidade,Preço Original,Sugestão de Preço")
        );
        assert_eq!(lines.next(), Some("100,\"Arroz, tipo 1\",2,10.00,8.50"));
    }

    #[test]
    fn test_export_empty_order_list_fails() {
        assert!(matches!(
            export_order_list(&OrderList::new()),
            Err(ExportError::EmptyList)
        ));
    }

    #[test]
    fn test_export_count_only_counted_items() {
        let list = CountList::from_items(vec![
            InventoryCountItem {
                codigo: "100".to_string(),
                ean: Some("789".to_string()),
                descricao: "Arroz".to_string(),
                quantidade: 3,
            },
            InventoryCountItem {
                codigo: "200".to_string(),
                ean: None,
                descricao: "Feijão".to_string(),
                quantidade: 0,
            },
        ]);
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();

        let file = export_count_list(&list, now).unwrap();

        assert_eq!(file.file_name, "inventario_2024-03-05_140709.csv");
        let text = csv_text(&file);
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("789,100,Arroz,3"));
        assert!(!text.contains("Feijão"));
    }
}
