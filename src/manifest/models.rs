use serde::Deserialize;

/// 清单中的一条记录，只取下载需要的字段
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ManifestRecord {
    /// YouTube 视频标识
    pub youtube: String,
    #[serde(default)]
    pub metadata: RecordMetadata,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RecordMetadata {
    #[serde(default)]
    pub title: Option<String>,
}

impl ManifestRecord {
    pub fn title(&self) -> &str {
        self.metadata.title.as_deref().unwrap_or_default()
    }
}
