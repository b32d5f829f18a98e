use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::{debug, error, info};

use ytbgm_downloader::cli::Cli;
use ytbgm_downloader::common::logger::PrettyLogger;
use ytbgm_downloader::config::Config;
use ytbgm_downloader::downloader::{
    DownloadScheduler, DownloadTask, RunSummary, SchedulerOptions, TaskSettings, YtDlpFetcher,
};
use ytbgm_downloader::{log_error, log_info, log_step, log_success, log_warning, manifest};

/// 准备下载环境
async fn prepare_download_env(config: &Config) -> Result<()> {
    info!("创建输出目录: {:?}", config.output_dir);
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("无法创建输出目录 {:?}", config.output_dir))?;
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    PrettyLogger::separator();
    PrettyLogger::completion_summary(vec![
        format!("条目总数: {}", summary.total),
        format!("新下载: {}", summary.downloaded.to_string().green()),
        format!("已存在: {}", summary.existed.to_string().blue()),
        format!("失败: {}", summary.failed.to_string().red()),
        format!("调度周期: {}", summary.ticks),
    ]);
    if summary.failed > 0 {
        log_warning!("{} 个条目下载失败，详情见日志", summary.failed);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // 初始化日志
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = args.into_config();
    debug!("运行配置: {:?}", config);

    log_step!("读取清单");
    let records = match manifest::load_manifest(&config.manifest).await {
        Ok(records) => records,
        Err(e) => {
            error!("获取清单失败: {}", e);
            log_error!("获取清单失败，任务未开始");
            return Err(e.into());
        }
    };
    log_success!("成功读取 {} 条记录", records.len());

    let task = DownloadTask::from_records(&records, &TaskSettings::from(&config));
    debug!("下载任务: {:#?}", task.snapshot().await);

    log_step!("检查外部工具");
    let fetcher = YtDlpFetcher::from_config(&config);
    fetcher.check_tools().await.context("外部工具不可用")?;

    prepare_download_env(&config).await?;
    PrettyLogger::file_info("保存目录", config.output_dir.display().to_string());
    PrettyLogger::file_info("进度页面", config.report_path().display().to_string());

    log_step!("开始下载");
    log_info!(
        "并发上限 {}，调度周期 {} 毫秒",
        config.parallel_limit,
        config.tick_interval_ms
    );
    let scheduler = DownloadScheduler::new(task, Arc::new(fetcher), SchedulerOptions::from(&config));
    let summary = scheduler.run().await;

    print_summary(&summary);
    Ok(())
}
