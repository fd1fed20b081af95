// ==========================================
// Rebaixa Pro - 托管表格 API（AppSheet）请求/响应
// ==========================================
// 请求: POST .../apps/{app_id}/tables/{table}/Action
//       { "Action": "Find", "Properties": { "Locale": "pt-BR" }, "Rows": [] }
// 响应: 行对象数组
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::raw_row::RawRow;
use serde::Serialize;
use serde_json::Value;

pub const API_BASE_URL: &str = "https://api.appsheet.com/api/v2";
pub const ACCESS_KEY_HEADER: &str = "ApplicationAccessKey";
pub const DEFAULT_LOCALE: &str = "pt-BR";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FindProperties {
    #[serde(rename = "Locale")]
    pub locale: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FindRequest {
    #[serde(rename = "Action")]
    pub action: String,
    #[serde(rename = "Properties")]
    pub properties: FindProperties,
    #[serde(rename = "Rows")]
    pub rows: Vec<Value>,
}

impl Default for FindRequest {
    fn default() -> Self {
        Self {
            action: "Find".to_string(),
            properties: FindProperties {
                locale: DEFAULT_LOCALE.to_string(),
            },
            rows: Vec::new(),
        }
    }
}

/// 表格 Action 端点
pub fn action_url(base_url: &str, app_id: &str, table_name: &str) -> String {
    format!(
        "{}/apps/{}/tables/{}/Action",
        base_url.trim_end_matches('/'),
        urlencoding::encode(app_id.trim()),
        urlencoding::encode(table_name.trim())
    )
}

/// 解析 Find 响应为原始行
///
/// 接受行数组，或包含 "Rows" 数组的对象；非对象行忽略
pub fn parse_find_response(body: &str) -> ImportResult<Vec<RawRow>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ImportError::Parse(format!("resposta JSON inválida: {}", e)))?;

    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut obj) => match obj.remove("Rows") {
            Some(Value::Array(rows)) => rows,
            _ => {
                return Err(ImportError::Parse(
                    "resposta sem lista de linhas".to_string(),
                ))
            }
        },
        _ => {
            return Err(ImportError::Parse(
                "resposta sem lista de linhas".to_string(),
            ))
        }
    };

    Ok(rows
        .iter()
        .enumerate()
        .filter_map(|(idx, row)| row.as_object().map(|obj| RawRow::from_json_object(idx + 1, obj)))
        .collect())
}
