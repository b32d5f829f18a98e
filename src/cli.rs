use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::config::{Config, DEFAULT_MANIFEST_URL, ManifestSource};
use crate::downloader::scheduler::AdmissionPolicy;

/// YouTube BGM 批量下载器
#[derive(Parser, Debug)]
#[command(name = "ytbgm")]
#[command(version = "1.0")]
#[command(author = "rpeng252@gmail.com")]
#[command(about = "按 JSON 清单批量下载 YouTube 背景音乐", long_about = None)]
pub struct Cli {
    /// 清单地址
    #[arg(long, value_name = "URL", default_value = DEFAULT_MANIFEST_URL)]
    #[arg(value_hint = clap::ValueHint::Url)]
    pub url: String,

    /// 本地清单文件 (指定后忽略 --url)
    #[arg(long, value_name = "FILE")]
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub manifest: Option<PathBuf>,

    /// 文件保存目录
    #[arg(long, value_name = "DIR", default_value = "MapleStoryMusic")]
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub output_dir: PathBuf,

    #[arg(long, value_name = "并发数", default_value_t = NonZeroUsize::new(3).unwrap_or(NonZeroUsize::MIN))]
    pub parallel: NonZeroUsize,

    /// 调度周期 (毫秒)
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    pub interval_ms: u64,

    /// 下载视频+音频，而不是只下载音频
    #[arg(long)]
    pub video: bool,

    /// 音频码率 (kbps)
    #[arg(long, value_name = "KBPS", default_value_t = 320)]
    pub bitrate: u32,

    /// 每个周期尽量填满并发额度，而不是只启动一个下载
    #[arg(long)]
    pub fill_capacity: bool,

    /// 把 progress.html 写入保存目录
    #[arg(long)]
    pub report_in_output_dir: bool,

    /// 进度页面标题
    #[arg(long, value_name = "TITLE")]
    pub report_title: Option<String>,

    /// 不显示终端进度条
    #[arg(long)]
    pub no_progress: bool,

    /// 输出调试日志
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// 将命令行参数合并到默认配置上
    pub fn into_config(self) -> Config {
        let defaults = Config::default();
        Config {
            manifest: match self.manifest {
                Some(path) => ManifestSource::Local(path),
                None => ManifestSource::Remote(self.url),
            },
            output_dir: self.output_dir,
            parallel_limit: self.parallel,
            tick_interval_ms: self.interval_ms,
            audio_only: !self.video,
            audio_bitrate_kbps: self.bitrate,
            admission: if self.fill_capacity {
                AdmissionPolicy::FillCapacity
            } else {
                AdmissionPolicy::OnePerTick
            },
            report_in_output_dir: self.report_in_output_dir,
            report_title: self.report_title.unwrap_or(defaults.report_title.clone()),
            show_progress_bar: !self.no_progress,
            ..defaults
        }
    }
}
