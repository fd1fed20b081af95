// ==========================================
// Rebaixa Pro - 远程目录客户端
// ==========================================
// 职责: 按配置来源拉取目录负载（文件字节或行对象）
// 说明: 单次请求，不做自动重试
// ==========================================

use crate::config::RemoteSource;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::raw_row::RawRow;
use crate::remote::appsheet::{self, FindRequest, ACCESS_KEY_HEADER};
use crate::remote::drive_link::resolve_download_url;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, error, info};

// ==========================================
// RemotePayload - 远程负载
// ==========================================
#[derive(Debug, Clone)]
pub enum RemotePayload {
    /// 表格文件字节（共享链接下载）
    Bytes(Vec<u8>),
    /// 行对象（托管表格 API）
    Rows(Vec<RawRow>),
}

// ==========================================
// RemoteCatalogClient Trait
// ==========================================
#[async_trait]
pub trait RemoteCatalogClient: Send + Sync {
    async fn fetch(&self, source: &RemoteSource) -> ImportResult<RemotePayload>;
}

/// 非成功状态码 → 导入错误
pub fn status_error(status: StatusCode, body: &str) -> ImportError {
    match status.as_u16() {
        401 | 403 => ImportError::Credential {
            status: status.as_u16(),
        },
        code => {
            let preview: String = body.chars().take(200).collect();
            ImportError::RemoteFetch(format!("HTTP {}: {}", code, preview))
        }
    }
}

/// HTTP 状态码 → 导入结果
pub fn check_status(status: StatusCode, body: &str) -> ImportResult<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(status_error(status, body))
    }
}

// ==========================================
// HttpRemoteClient - reqwest 实现
// ==========================================
pub struct HttpRemoteClient {
    client: reqwest::Client,
    api_base_url: String,
}

impl HttpRemoteClient {
    pub fn new(timeout: Duration) -> ImportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImportError::InternalError(format!("cliente HTTP: {}", e)))?;
        Ok(Self {
            client,
            api_base_url: appsheet::API_BASE_URL.to_string(),
        })
    }

    /// 替换 API 基础地址（测试或私有部署）
    pub fn with_api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into();
        self
    }

    async fn download(&self, shared_link: &str) -> ImportResult<Vec<u8>> {
        let url = resolve_download_url(shared_link)?;
        info!(url = %url, "下载共享表格");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "共享表格下载失败");
            return Err(status_error(status, &body));
        }

        let bytes = response.bytes().await?;
        debug!(size = bytes.len(), "共享表格下载完成");
        Ok(bytes.to_vec())
    }

    async fn find_rows(
        &self,
        app_id: &str,
        table_name: &str,
        access_key: &str,
    ) -> ImportResult<Vec<RawRow>> {
        if access_key.trim().is_empty() {
            return Err(ImportError::MissingCredential);
        }

        let url = appsheet::action_url(&self.api_base_url, app_id, table_name);
        info!(url = %url, "查询托管表格");

        let response = self
            .client
            .post(&url)
            .header(ACCESS_KEY_HEADER, access_key)
            .header("Accept", "application/json")
            .json(&FindRequest::default())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if let Err(e) = check_status(status, &body) {
            error!(status = %status, "托管表格查询失败");
            return Err(e);
        }

        let rows = appsheet::parse_find_response(&body)?;
        debug!(rows = rows.len(), "托管表格查询完成");
        Ok(rows)
    }
}

#[async_trait]
impl RemoteCatalogClient for HttpRemoteClient {
    async fn fetch(&self, source: &RemoteSource) -> ImportResult<RemotePayload> {
        match source {
            RemoteSource::SharedLink { shared_link } => {
                Ok(RemotePayload::Bytes(self.download(shared_link).await?))
            }
            RemoteSource::AppSheet {
                app_id,
                table_name,
                access_key,
            } => Ok(RemotePayload::Rows(
                self.find_rows(app_id, table_name, access_key).await?,
            )),
        }
    }
}
