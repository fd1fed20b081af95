// ==========================================
// Rebaixa Pro - 云端共享链接解析
// ==========================================
// 职责: 共享链接 → 可直接下载的 URL
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use reqwest::Url;

const SHEETS_HOST: &str = "docs.google.com";
const DRIVE_HOST: &str = "drive.google.com";

/// 解析共享链接
///
/// # 规则
/// - Google Sheets 链接 → 导出为 xlsx
/// - Google Drive 文件链接（/file/d/{id}、?id={id}）→ 直接下载
/// - 其他 http(s) 绝对地址 → 原样使用
/// - 其余 → RemoteFetch（链接格式错误）
///
/// 协议与主机名不区分大小写，默认端口被忽略
pub fn resolve_download_url(shared_link: &str) -> ImportResult<String> {
    let link = shared_link.trim();
    let url = Url::parse(link).map_err(|_| malformed(link))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(malformed(link));
    }
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| malformed(link))?
        .to_string();
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    match (host.as_str(), segments.as_slice()) {
        (SHEETS_HOST, ["spreadsheets", "d", id, ..]) => Ok(format!(
            "https://docs.google.com/spreadsheets/d/{}/export?format=xlsx",
            id
        )),
        (DRIVE_HOST, ["file", "d", id, ..]) => Ok(drive_download_url(id)),
        (DRIVE_HOST, _) => {
            let id = url
                .query_pairs()
                .find(|(k, _)| k == "id")
                .map(|(_, v)| v.into_owned())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| malformed(link))?;
            Ok(drive_download_url(&id))
        }
        _ => Ok(url.to_string()),
    }
}

fn drive_download_url(id: &str) -> String {
    format!("https://drive.google.com/uc?export=download&id={}", id)
}

fn malformed(link: &str) -> ImportError {
    ImportError::RemoteFetch(format!("link inválido: '{}'", link))
}
