use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use super::error::DownloadError;
use crate::common::utils::youtube_link;
use crate::config::Config;

/// 外部获取与转码能力的抽象，下载任务只依赖这个接口
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// 获取远程视频标题
    async fn fetch_title(&self, reference: &str) -> Result<String, DownloadError>;

    /// 下载音频并转码到 `dest`
    ///
    /// `dest` 是调用方独占的暂存路径，发布到最终位置由调用方负责。
    async fn download_audio(
        &self,
        reference: &str,
        dest: &Path,
        bitrate_kbps: u32,
    ) -> Result<(), DownloadError>;

    /// 下载视频+音频并写入已打开的文件
    async fn download_video(&self, reference: &str, dest: &mut File) -> Result<(), DownloadError>;
}

/// 基于系统 yt-dlp 与 FFmpeg 的实现
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    ytdlp_cmd: String,
    ffmpeg_cmd: String,
}

impl YtDlpFetcher {
    pub fn new(ytdlp_cmd: impl Into<String>, ffmpeg_cmd: impl Into<String>) -> Self {
        Self {
            ytdlp_cmd: ytdlp_cmd.into(),
            ffmpeg_cmd: ffmpeg_cmd.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ytdlp_path.clone(), config.ffmpeg_path.clone())
    }

    /// 检查 yt-dlp 与 ffmpeg 是否可用
    pub async fn check_tools(&self) -> Result<(), DownloadError> {
        debug!("检查系统中是否安装了 yt-dlp 与 ffmpeg...");
        Self::check_tool(&self.ytdlp_cmd, "--version").await?;
        Self::check_tool(&self.ffmpeg_cmd, "-version").await?;
        Ok(())
    }

    async fn check_tool(cmd: &str, version_arg: &str) -> Result<(), DownloadError> {
        let status = Command::new(cmd)
            .arg(version_arg)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => {
                debug!("✅ {} 可用", cmd);
                Ok(())
            }
            _ => {
                error!("❌ 未检测到 {}，请确保已安装并加入 PATH", cmd);
                error!("或者设置环境变量 YTDLP_PATH / FFMPEG_PATH 指向可执行文件路径");
                Err(DownloadError::ToolNotFound(cmd.to_string()))
            }
        }
    }

    /// 运行外部命令并收集输出，退出码非零视为失败
    async fn run_tool(tool: &str, mut command: Command) -> Result<Output, DownloadError> {
        let output = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| spawn_error(tool, e))?;

        if !output.status.success() {
            let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(DownloadError::ToolFailed {
                tool: tool.to_string(),
                message,
            });
        }
        Ok(output)
    }

    /// 原始音频流放在暂存文件旁边
    fn temp_audio_path(dest: &Path) -> PathBuf {
        dest.with_extension("source")
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch_title(&self, reference: &str) -> Result<String, DownloadError> {
        let mut command = Command::new(&self.ytdlp_cmd);
        command
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("--print")
            .arg("title")
            .arg(youtube_link(reference));

        let output = Self::run_tool(&self.ytdlp_cmd, command).await?;
        let title = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if title.is_empty() {
            return Err(DownloadError::TitleUnavailable(reference.to_string()));
        }
        debug!("远程标题: {} -> {}", reference, title);
        Ok(title)
    }

    async fn download_audio(
        &self,
        reference: &str,
        dest: &Path,
        bitrate_kbps: u32,
    ) -> Result<(), DownloadError> {
        let temp_path = Self::temp_audio_path(dest);
        if let Some(dir) = temp_path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        // 先取最佳音频流到临时文件
        let mut fetch = Command::new(&self.ytdlp_cmd);
        fetch
            .arg("--no-playlist")
            .arg("--no-part")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg("--force-overwrites")
            .arg("-f")
            .arg("bestaudio/best")
            .arg("-o")
            .arg(&temp_path)
            .arg(youtube_link(reference));
        let fetched = Self::run_tool(&self.ytdlp_cmd, fetch).await;

        // 再交给 ffmpeg 转码，-n 保证不会覆盖已有文件
        let result = match fetched {
            Ok(_) => {
                let mut transcode = Command::new(&self.ffmpeg_cmd);
                transcode
                    .arg("-hide_banner")
                    .arg("-loglevel")
                    .arg("error")
                    .arg("-n")
                    .arg("-i")
                    .arg(&temp_path)
                    .arg("-vn")
                    .arg("-b:a")
                    .arg(format!("{}k", bitrate_kbps))
                    .arg(dest);
                Self::run_tool(&self.ffmpeg_cmd, transcode).await.map(|_| ())
            }
            Err(e) => Err(e),
        };

        if let Err(e) = tokio::fs::remove_file(&temp_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("清理临时文件失败 {:?}: {}", temp_path, e);
            }
        }

        result
    }

    async fn download_video(&self, reference: &str, dest: &mut File) -> Result<(), DownloadError> {
        let mut child = Command::new(&self.ytdlp_cmd)
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg("-f")
            .arg("best[ext=mp4]/best")
            .arg("-o")
            .arg("-")
            .arg(youtube_link(reference))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&self.ytdlp_cmd, e))?;

        let mut stdout = child.stdout.take().ok_or_else(|| DownloadError::ToolFailed {
            tool: self.ytdlp_cmd.clone(),
            message: "无法获取标准输出".to_string(),
        })?;

        // stderr 需要单独读取，否则管道写满会阻塞子进程
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf).await;
                buf
            })
        });

        let written = tokio::io::copy(&mut stdout, dest).await?;
        dest.flush().await?;
        let status = child.wait().await?;

        let stderr_text = match stderr_reader {
            Some(handle) => handle.await.unwrap_or_default(),
            None => String::new(),
        };

        if !status.success() {
            return Err(DownloadError::ToolFailed {
                tool: self.ytdlp_cmd.clone(),
                message: stderr_text.trim().to_string(),
            });
        }

        info!("视频流写入完成: {} ({} 字节)", reference, written);
        Ok(())
    }
}

fn spawn_error(tool: &str, e: std::io::Error) -> DownloadError {
    if e.kind() == std::io::ErrorKind::NotFound {
        DownloadError::ToolNotFound(tool.to_string())
    } else {
        DownloadError::Io(e)
    }
}
