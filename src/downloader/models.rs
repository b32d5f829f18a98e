use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::manifest::models::ManifestRecord;

// --------------------------------------------------------------------
/// 条目状态，只会单向推进：Pending → Downloading → 终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryStatus {
    Pending,
    Downloading,
    Downloaded,
    Existed,
    Failed,
}

impl EntryStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EntryStatus::Downloaded | EntryStatus::Existed | EntryStatus::Failed
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            EntryStatus::Pending => "PENDING",
            EntryStatus::Downloading => "DOWNLOADING",
            EntryStatus::Downloaded => "DOWNLOADED",
            EntryStatus::Existed => "EXISTED",
            EntryStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 下载耗时
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElapsedTime {
    #[default]
    NotStarted,
    Finished(Duration),
    Skipped, // 文件已存在或下载失败
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElapsedTime::NotStarted => Ok(()),
            ElapsedTime::Finished(d) => write!(f, "{:.3}", d.as_secs_f64()),
            ElapsedTime::Skipped => f.write_str("-"),
        }
    }
}

// --------------------------------------------------------------------
#[derive(Debug, Clone)]
pub struct DownloadEntry {
    /// YouTube 视频标识
    pub reference: String,
    pub audio_only: bool,
    /// 为空时由下载时获取的远程标题补全
    pub title: String,
    pub status: EntryStatus,
    pub elapsed: ElapsedTime,
}

impl DownloadEntry {
    pub fn new(reference: impl Into<String>, title: impl Into<String>, audio_only: bool) -> Self {
        Self {
            reference: reference.into(),
            audio_only,
            title: title.into(),
            status: EntryStatus::Pending,
            elapsed: ElapsedTime::NotStarted,
        }
    }
}

/// 调度器与下载任务共享的条目
pub type SharedEntry = Arc<Mutex<DownloadEntry>>;

/// 构建任务所需的配置子集
#[derive(Debug, Clone)]
pub struct TaskSettings {
    pub video_format: String,
    pub audio_format: String,
    pub output_dir: PathBuf,
    pub parallel_limit: NonZeroUsize,
    pub audio_only: bool,
}

impl From<&Config> for TaskSettings {
    fn from(config: &Config) -> Self {
        Self {
            video_format: config.video_format.clone(),
            audio_format: config.audio_format.clone(),
            output_dir: config.output_dir.clone(),
            parallel_limit: config.parallel_limit,
            audio_only: config.audio_only,
        }
    }
}

/// 一次运行的完整下载任务
#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub video_format: String,
    pub audio_format: String,
    pub output_dir: PathBuf,
    pub parallel_limit: NonZeroUsize,
    pub entries: Vec<SharedEntry>,
}

impl DownloadTask {
    /// 由清单记录构建任务，每条记录对应一个待下载条目，顺序不变
    pub fn from_records(records: &[ManifestRecord], settings: &TaskSettings) -> Self {
        let entries = records
            .iter()
            .map(|record| {
                let entry =
                    DownloadEntry::new(record.youtube.clone(), record.title(), settings.audio_only);
                Arc::new(Mutex::new(entry))
            })
            .collect();

        Self {
            video_format: settings.video_format.clone(),
            audio_format: settings.audio_format.clone(),
            output_dir: settings.output_dir.clone(),
            parallel_limit: settings.parallel_limit,
            entries,
        }
    }

    /// 当前所有条目的快照
    pub async fn snapshot(&self) -> Vec<DownloadEntry> {
        let mut out = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            out.push(entry.lock().await.clone());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
