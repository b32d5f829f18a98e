use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("网络请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("清单服务返回异常状态: {0}")]
    BadStatus(reqwest::StatusCode),

    #[error("清单解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("读取本地清单失败 {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
