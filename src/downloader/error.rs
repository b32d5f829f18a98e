use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("未找到外部工具: {0}")]
    ToolNotFound(String),

    #[error("{tool} 执行失败: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("无法获取视频标题: {0}")]
    TitleUnavailable(String),
}
