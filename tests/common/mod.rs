#![allow(dead_code)]

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use ytbgm_downloader::downloader::{
    AdmissionPolicy, DownloadError, DownloadTask, MediaFetcher, SchedulerOptions, TaskSettings,
};
use ytbgm_downloader::manifest::models::{ManifestRecord, RecordMetadata};

/// 立即写出文件的假实现
#[derive(Default)]
pub struct InstantFetcher {
    pub title_calls: AtomicUsize,
}

#[async_trait]
impl MediaFetcher for InstantFetcher {
    async fn fetch_title(&self, _reference: &str) -> Result<String, DownloadError> {
        self.title_calls.fetch_add(1, Ordering::SeqCst);
        Ok("Remote: Title".to_string())
    }

    async fn download_audio(
        &self,
        _reference: &str,
        dest: &Path,
        _bitrate_kbps: u32,
    ) -> Result<(), DownloadError> {
        tokio::fs::write(dest, b"fake audio").await?;
        Ok(())
    }

    async fn download_video(&self, _reference: &str, dest: &mut File) -> Result<(), DownloadError> {
        dest.write_all(b"fake video").await?;
        Ok(())
    }
}

/// 永远不会结束的假实现，用来模拟长时间下载
pub struct StalledFetcher;

#[async_trait]
impl MediaFetcher for StalledFetcher {
    async fn fetch_title(&self, _reference: &str) -> Result<String, DownloadError> {
        Ok("Stalled".to_string())
    }

    async fn download_audio(
        &self,
        _reference: &str,
        _dest: &Path,
        _bitrate_kbps: u32,
    ) -> Result<(), DownloadError> {
        std::future::pending::<()>().await;
        Ok(())
    }

    async fn download_video(&self, _reference: &str, _dest: &mut File) -> Result<(), DownloadError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// 写出部分数据后失败的假实现
pub struct FailingFetcher;

#[async_trait]
impl MediaFetcher for FailingFetcher {
    async fn fetch_title(&self, _reference: &str) -> Result<String, DownloadError> {
        Err(DownloadError::TitleUnavailable("gone".to_string()))
    }

    async fn download_audio(
        &self,
        _reference: &str,
        dest: &Path,
        _bitrate_kbps: u32,
    ) -> Result<(), DownloadError> {
        tokio::fs::write(dest, b"half").await?;
        Err(DownloadError::ToolFailed {
            tool: "ffmpeg".to_string(),
            message: "boom".to_string(),
        })
    }

    async fn download_video(&self, _reference: &str, dest: &mut File) -> Result<(), DownloadError> {
        dest.write_all(b"half").await?;
        Err(DownloadError::ToolFailed {
            tool: "yt-dlp".to_string(),
            message: "boom".to_string(),
        })
    }
}

/// 按标识决定快慢的假实现，行为与 ffmpeg -n 一致：目标已存在则报错
pub struct PacedFetcher {
    pub slow_delay: Duration,
}

#[async_trait]
impl MediaFetcher for PacedFetcher {
    async fn fetch_title(&self, reference: &str) -> Result<String, DownloadError> {
        Ok(reference.to_string())
    }

    async fn download_audio(
        &self,
        reference: &str,
        dest: &Path,
        _bitrate_kbps: u32,
    ) -> Result<(), DownloadError> {
        if reference.starts_with("slow") {
            tokio::time::sleep(self.slow_delay).await;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dest)
            .await?;
        file.write_all(format!("audio from {}", reference).as_bytes()).await?;
        Ok(())
    }

    async fn download_video(&self, _reference: &str, _dest: &mut File) -> Result<(), DownloadError> {
        Ok(())
    }
}

/// 下载过程中由"别的写入者"抢先生成最终文件的假实现
pub struct RacingFetcher {
    pub final_path: PathBuf,
}

#[async_trait]
impl MediaFetcher for RacingFetcher {
    async fn fetch_title(&self, _reference: &str) -> Result<String, DownloadError> {
        Ok("Racing".to_string())
    }

    async fn download_audio(
        &self,
        _reference: &str,
        dest: &Path,
        _bitrate_kbps: u32,
    ) -> Result<(), DownloadError> {
        tokio::fs::write(&self.final_path, b"other writer").await?;
        tokio::fs::write(dest, b"ours").await?;
        Ok(())
    }

    async fn download_video(&self, _reference: &str, _dest: &mut File) -> Result<(), DownloadError> {
        Ok(())
    }
}

pub fn create_test_records(count: usize) -> Vec<ManifestRecord> {
    (0..count)
        .map(|i| ManifestRecord {
            youtube: format!("vid{:03}", i),
            metadata: RecordMetadata {
                title: Some(format!("Song {}", i)),
            },
        })
        .collect()
}

pub fn create_test_task(count: usize, parallel: usize, output_dir: &Path) -> DownloadTask {
    let settings = TaskSettings {
        video_format: ".mp4".to_string(),
        audio_format: ".mp3".to_string(),
        output_dir: output_dir.to_path_buf(),
        parallel_limit: NonZeroUsize::new(parallel).expect("并发数必须大于 0"),
        audio_only: true,
    };
    DownloadTask::from_records(&create_test_records(count), &settings)
}

pub fn create_test_options(report_path: PathBuf) -> SchedulerOptions {
    SchedulerOptions {
        tick_interval: Duration::from_millis(5),
        admission: AdmissionPolicy::OnePerTick,
        audio_bitrate_kbps: 320,
        report_path,
        report_title: "Test Progress".to_string(),
        show_progress_bar: false,
    }
}

pub fn instant() -> Arc<dyn MediaFetcher> {
    Arc::new(InstantFetcher::default())
}

pub fn stalled() -> Arc<dyn MediaFetcher> {
    Arc::new(StalledFetcher)
}
