use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use crate::downloader::scheduler::AdmissionPolicy;

/// 默认的 BGM 清单地址
pub const DEFAULT_MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/maplestory-music/maplebgm-db/master/bgm.json";

/// 进度页面文件名
pub const PROGRESS_FILE_NAME: &str = "progress.html";

/// 清单来源：远程地址或本地文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    Remote(String),
    Local(PathBuf),
}

/// 一次运行的全部配置
#[derive(Debug, Clone)]
pub struct Config {
    pub manifest: ManifestSource,
    /// 视频+音频文件后缀
    pub video_format: String,
    /// 纯音频文件后缀
    pub audio_format: String,
    pub output_dir: PathBuf,
    /// 同时下载的最大数量
    pub parallel_limit: NonZeroUsize,
    /// 调度周期（毫秒）
    pub tick_interval_ms: u64,
    /// 所有条目是否只下载音频
    pub audio_only: bool,
    /// 转码目标码率（kbps）
    pub audio_bitrate_kbps: u32,
    pub admission: AdmissionPolicy,
    /// 进度页面写入输出目录（否则写入当前目录）
    pub report_in_output_dir: bool,
    pub report_title: String,
    pub show_progress_bar: bool,
    pub ytdlp_path: String,
    pub ffmpeg_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest: ManifestSource::Remote(DEFAULT_MANIFEST_URL.to_string()),
            video_format: ".mp4".to_string(),
            audio_format: ".mp3".to_string(),
            output_dir: PathBuf::from("MapleStoryMusic"),
            parallel_limit: NonZeroUsize::new(3).unwrap_or(NonZeroUsize::MIN),
            tick_interval_ms: 1000,
            audio_only: true,
            audio_bitrate_kbps: 320,
            admission: AdmissionPolicy::OnePerTick,
            report_in_output_dir: false,
            report_title: "MapleStory Music YouTube Downloader Progress".to_string(),
            show_progress_bar: true,
            // 支持通过环境变量指定外部工具路径
            ytdlp_path: std::env::var("YTDLP_PATH").unwrap_or_else(|_| "yt-dlp".to_string()),
            ffmpeg_path: std::env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
        }
    }
}

impl Config {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// 进度页面的完整路径
    pub fn report_path(&self) -> PathBuf {
        if self.report_in_output_dir {
            self.output_dir.join(PROGRESS_FILE_NAME)
        } else {
            PathBuf::from(".").join(PROGRESS_FILE_NAME)
        }
    }
}
