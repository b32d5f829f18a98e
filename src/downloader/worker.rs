use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use super::error::DownloadError;
use super::fetcher::MediaFetcher;
use super::models::{ElapsedTime, EntryStatus, SharedEntry};
use crate::common::utils::sanitize_filename;

/// 单个条目的下载执行者
///
/// 每次调用只修改传入的那一个条目，结果通过条目状态体现，
/// 错误不会向调度器传播。
pub struct DownloadWorker {
    fetcher: Arc<dyn MediaFetcher>,
    output_dir: PathBuf,
    audio_bitrate_kbps: u32,
}

impl DownloadWorker {
    pub fn new(
        fetcher: Arc<dyn MediaFetcher>,
        output_dir: impl Into<PathBuf>,
        audio_bitrate_kbps: u32,
    ) -> Self {
        Self {
            fetcher,
            output_dir: output_dir.into(),
            audio_bitrate_kbps,
        }
    }

    /// 按条目的 audio_only 选择下载方式
    pub async fn download(&self, entry: SharedEntry, audio_ext: &str, video_ext: &str) -> EntryStatus {
        let audio_only = entry.lock().await.audio_only;
        if audio_only {
            self.download_audio_only(entry, audio_ext).await
        } else {
            self.download_video_audio(entry, video_ext).await
        }
    }

    /// 只下载音频并转码，转码前显式检查目标文件是否存在，
    /// 发布时仍以不覆盖的方式处理检查之后才出现的同名文件
    pub async fn download_audio_only(&self, entry: SharedEntry, extension: &str) -> EntryStatus {
        let start = Instant::now();
        let reference = Self::begin(&entry).await;

        let title = match self.resolve_title(&entry, &reference).await {
            Ok(title) => title,
            Err(e) => return Self::fail(&entry, &reference, &e).await,
        };
        let path = self.target_path(&title, extension);

        match tokio::fs::try_exists(&path).await {
            Ok(true) => return Self::skip_existing(&entry, &title).await,
            Ok(false) => {}
            Err(e) => return Self::fail(&entry, &title, &DownloadError::Io(e)).await,
        }

        // 转码先写入本任务独占的暂存文件，完成后再以不覆盖的方式发布
        let staged = self.staging_path(&reference, &title, extension);
        if let Err(e) = Self::prepare_staging(&staged).await {
            return Self::fail(&entry, &title, &DownloadError::Io(e)).await;
        }

        debug!("开始下载音频: {} -> {:?}", reference, staged);
        if let Err(e) = self
            .fetcher
            .download_audio(&reference, &staged, self.audio_bitrate_kbps)
            .await
        {
            Self::remove_partial(&staged).await;
            return Self::fail(&entry, &title, &e).await;
        }

        let published = Self::publish(&staged, &path).await;
        Self::remove_partial(&staged).await;
        match published {
            Ok(()) => Self::complete(&entry, &title, start).await,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Self::skip_existing(&entry, &title).await
            }
            Err(e) => Self::fail(&entry, &title, &DownloadError::Io(e)).await,
        }
    }

    /// 下载视频+音频，依靠独占创建文件来判断目标是否已存在
    pub async fn download_video_audio(&self, entry: SharedEntry, extension: &str) -> EntryStatus {
        let start = Instant::now();
        let reference = Self::begin(&entry).await;

        let title = match self.resolve_title(&entry, &reference).await {
            Ok(title) => title,
            Err(e) => return Self::fail(&entry, &reference, &e).await,
        };
        let path = self.target_path(&title, extension);

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Self::skip_existing(&entry, &title).await;
            }
            Err(e) => return Self::fail(&entry, &title, &DownloadError::Io(e)).await,
        };

        debug!("开始下载视频: {} -> {:?}", reference, path);
        let result = self.fetcher.download_video(&reference, &mut file).await;
        drop(file);

        match result {
            Ok(()) => Self::complete(&entry, &title, start).await,
            Err(e) => {
                // 文件是本次创建的，失败时删掉残留
                Self::remove_partial(&path).await;
                Self::fail(&entry, &title, &e).await
            }
        }
    }

    fn target_path(&self, title: &str, extension: &str) -> PathBuf {
        self.output_dir.join(format!("{}{}", title, extension))
    }

    fn staging_path(&self, reference: &str, title: &str, extension: &str) -> PathBuf {
        self.output_dir
            .join("tmp")
            .join(format!("{}-{}{}", sanitize_filename(reference), title, extension))
    }

    async fn prepare_staging(staged: &Path) -> std::io::Result<()> {
        if let Some(dir) = staged.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        // 上次中断留下的暂存文件属于本任务，直接清掉
        Self::remove_partial(staged).await;
        Ok(())
    }

    /// 把暂存文件发布到目标路径，目标已存在时返回 `AlreadyExists` 且不做任何修改
    async fn publish(staged: &Path, dest: &Path) -> std::io::Result<()> {
        match tokio::fs::hard_link(staged, dest).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(e),
            Err(e) => {
                // 不支持硬链接的文件系统退回到独占创建后复制
                debug!("硬链接失败，改为复制 {:?}: {}", dest, e);
                let mut target = OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(dest)
                    .await?;
                let mut source = tokio::fs::File::open(staged).await?;
                let copied = tokio::io::copy(&mut source, &mut target).await;
                let flushed = match copied {
                    Ok(_) => target.flush().await,
                    Err(e) => Err(e),
                };
                drop(target);
                if let Err(e) = flushed {
                    // 目标是刚刚独占创建的，可以安全删除
                    Self::remove_partial(dest).await;
                    return Err(e);
                }
                Ok(())
            }
        }
    }

    async fn begin(entry: &SharedEntry) -> String {
        let mut guard = entry.lock().await;
        guard.status = EntryStatus::Downloading;
        guard.reference.clone()
    }

    /// 条目标题为空时取远程标题，结果清洗后写回条目
    async fn resolve_title(&self, entry: &SharedEntry, reference: &str) -> Result<String, DownloadError> {
        let current = entry.lock().await.title.clone();
        let raw = if current.is_empty() {
            self.fetcher.fetch_title(reference).await?
        } else {
            current
        };

        let title = sanitize_filename(&raw);
        entry.lock().await.title = title.clone();
        Ok(title)
    }

    async fn complete(entry: &SharedEntry, title: &str, start: Instant) -> EntryStatus {
        let elapsed = start.elapsed();
        info!("下载完成: {} 用时 {:.3} 秒", title, elapsed.as_secs_f64());
        Self::finish(entry, EntryStatus::Downloaded, ElapsedTime::Finished(elapsed)).await
    }

    async fn skip_existing(entry: &SharedEntry, title: &str) -> EntryStatus {
        info!("{} 已存在，跳过", title);
        Self::finish(entry, EntryStatus::Existed, ElapsedTime::Skipped).await
    }

    async fn fail(entry: &SharedEntry, label: &str, err: &DownloadError) -> EntryStatus {
        error!("❌ 下载失败: {}, 错误: {}", label, err);
        Self::finish(entry, EntryStatus::Failed, ElapsedTime::Skipped).await
    }

    async fn finish(entry: &SharedEntry, status: EntryStatus, elapsed: ElapsedTime) -> EntryStatus {
        let mut guard = entry.lock().await;
        guard.status = status;
        guard.elapsed = elapsed;
        status
    }

    async fn remove_partial(path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            if e.kind() != ErrorKind::NotFound {
                warn!("清理未完成文件失败 {:?}: {}", path, e);
            }
        }
    }
}
