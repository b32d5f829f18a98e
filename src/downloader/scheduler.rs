use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use super::fetcher::MediaFetcher;
use super::models::{DownloadEntry, DownloadTask, EntryStatus};
use super::progress::TaskProgress;
use super::worker::DownloadWorker;
use crate::config::Config;
use crate::report::{render_progress_html, write_report};

/// 每个周期允许启动多少个下载
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdmissionPolicy {
    /// 每个周期最多启动一个
    #[default]
    OnePerTick,
    /// 每个周期启动到并发上限为止
    FillCapacity,
}

#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    pub tick_interval: Duration,
    pub admission: AdmissionPolicy,
    pub audio_bitrate_kbps: u32,
    pub report_path: PathBuf,
    pub report_title: String,
    pub show_progress_bar: bool,
}

impl From<&Config> for SchedulerOptions {
    fn from(config: &Config) -> Self {
        Self {
            tick_interval: config.tick_interval(),
            admission: config.admission,
            audio_bitrate_kbps: config.audio_bitrate_kbps,
            report_path: config.report_path(),
            report_title: config.report_title.clone(),
            show_progress_bar: config.show_progress_bar,
        }
    }
}

/// 一个调度周期的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// 本周期启动的条目下标
    pub started: Vec<usize>,
    /// 启动之后处于下载中的条目数
    pub downloading: usize,
    /// 启动之后仍在等待的条目数
    pub pending: usize,
    /// 没有等待或下载中的条目，调度应当停止
    pub finished: bool,
    pub report_written: bool,
}

/// 整次运行的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub downloaded: usize,
    pub existed: usize,
    pub failed: usize,
    pub ticks: u64,
    pub reports_written: u64,
}

impl RunSummary {
    fn count_entries(&mut self, entries: &[DownloadEntry]) {
        self.total = entries.len();
        for entry in entries {
            match entry.status {
                EntryStatus::Downloaded => self.downloaded += 1,
                EntryStatus::Existed => self.existed += 1,
                EntryStatus::Failed => self.failed += 1,
                EntryStatus::Pending | EntryStatus::Downloading => {}
            }
        }
    }
}

/// 定时轮询条目状态、控制并发并刷新进度页面的调度器
pub struct DownloadScheduler {
    task: DownloadTask,
    worker: Arc<DownloadWorker>,
    options: SchedulerOptions,
    progress: Option<TaskProgress>,
    ticks: u64,
    reports_written: u64,
}

impl DownloadScheduler {
    pub fn new(task: DownloadTask, fetcher: Arc<dyn MediaFetcher>, options: SchedulerOptions) -> Self {
        let worker = Arc::new(DownloadWorker::new(
            fetcher,
            task.output_dir.clone(),
            options.audio_bitrate_kbps,
        ));
        let progress = options
            .show_progress_bar
            .then(|| TaskProgress::new(task.len() as u64));

        Self {
            task,
            worker,
            options,
            progress,
            ticks: 0,
            reports_written: 0,
        }
    }

    pub fn task(&self) -> &DownloadTask {
        &self.task
    }

    /// 执行一个调度周期：扫描、按需启动下载、判断是否结束、写进度页面
    pub async fn tick(&mut self) -> TickOutcome {
        self.ticks += 1;

        // 扫描：按顺序收集等待中的条目，统计下载中的数量
        let mut candidates = Vec::new();
        let mut downloading = 0usize;
        let mut terminal = 0u64;
        for (index, entry) in self.task.entries.iter().enumerate() {
            match entry.lock().await.status {
                EntryStatus::Pending => candidates.push(index),
                EntryStatus::Downloading => downloading += 1,
                _ => terminal += 1,
            }
        }
        let finished = candidates.is_empty() && downloading == 0;

        let capacity = self.task.parallel_limit.get().saturating_sub(downloading);
        let admit = match self.options.admission {
            AdmissionPolicy::OnePerTick => capacity.min(1),
            AdmissionPolicy::FillCapacity => capacity,
        };

        let mut started = Vec::with_capacity(admit);
        for &index in candidates.iter().take(admit) {
            self.launch(index).await;
            started.push(index);
        }

        let downloading = downloading + started.len();
        let pending = candidates.len() - started.len();
        if !started.is_empty() {
            debug!("启动下载 {:?}，下载中 {}，等待 {}", started, downloading, pending);
        }

        if let Some(progress) = &self.progress {
            progress.update(terminal, downloading);
        }

        if finished {
            info!("全部条目处理完毕，停止调度");
            if let Some(progress) = &self.progress {
                progress.finish();
            }
        }

        let report_written = self.write_progress_report().await;

        TickOutcome {
            started,
            downloading,
            pending,
            finished,
            report_written,
        }
    }

    /// 按固定周期运行，直到所有条目进入终态
    pub async fn run(mut self) -> RunSummary {
        let period = self.options.tick_interval;
        // 第一个周期在一个间隔之后触发
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if self.tick().await.finished {
                break;
            }
        }

        let mut summary = RunSummary {
            ticks: self.ticks,
            reports_written: self.reports_written,
            ..RunSummary::default()
        };
        summary.count_entries(&self.task.snapshot().await);
        summary
    }

    /// 把条目标记为下载中并在后台启动下载
    async fn launch(&self, index: usize) {
        let entry = Arc::clone(&self.task.entries[index]);
        {
            let mut guard = entry.lock().await;
            guard.status = EntryStatus::Downloading;
            debug!("开始处理条目 #{}: {}", index + 1, guard.reference);
        }

        let worker = Arc::clone(&self.worker);
        let audio_ext = self.task.audio_format.clone();
        let video_ext = self.task.video_format.clone();
        tokio::spawn(async move {
            worker.download(entry, &audio_ext, &video_ext).await;
        });
    }

    async fn write_progress_report(&mut self) -> bool {
        let entries = self.task.snapshot().await;
        let html = render_progress_html(
            &self.options.report_title,
            &self.task.video_format,
            &self.task.audio_format,
            &entries,
        );

        match write_report(&self.options.report_path, &html).await {
            Ok(()) => {
                self.reports_written += 1;
                true
            }
            Err(e) => {
                error!("写入进度页面失败 {:?}: {}", self.options.report_path, e);
                false
            }
        }
    }
}
