pub mod error;
pub mod models;

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, error, info};

use crate::config::ManifestSource;
use error::ManifestError;
use models::ManifestRecord;

/// 按配置读取清单
pub async fn load_manifest(source: &ManifestSource) -> Result<Vec<ManifestRecord>, ManifestError> {
    let records = match source {
        ManifestSource::Remote(url) => fetch_manifest(url).await?,
        ManifestSource::Local(path) => {
            info!("读取本地清单: {:?}", path);
            let text = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ManifestError::Io {
                    path: path.clone(),
                    source,
                })?;
            parse_manifest(&text)?
        }
    };

    info!("成功读取清单，共 {} 条记录", records.len());
    Ok(records)
}

/// 从远程地址下载并解析清单
pub async fn fetch_manifest(url: &str) -> Result<Vec<ManifestRecord>, ManifestError> {
    info!("开始获取清单: {}", url);
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .default_headers(default_headers())
        .build()?;

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        error!("清单请求失败，状态码: {}", status);
        return Err(ManifestError::BadStatus(status));
    }

    let text = response.text().await?;
    debug!("清单大小: {} 字节", text.len());
    parse_manifest(&text)
}

/// 解析清单 JSON，记录顺序保持不变
pub fn parse_manifest(text: &str) -> Result<Vec<ManifestRecord>, ManifestError> {
    Ok(serde_json::from_str(text)?)
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("ytbgm/", env!("CARGO_PKG_VERSION"))),
    );
    headers
}
