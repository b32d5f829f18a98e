use indicatif::{ProgressBar, ProgressStyle};

/// 终端里的整体进度条，按已结束的条目数推进
pub struct TaskProgress {
    bar: ProgressBar,
}

impl TaskProgress {
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar }
    }

    pub fn update(&self, finished: u64, downloading: usize) {
        self.bar.set_position(finished);
        self.bar.set_message(format!("下载中: {}", downloading));
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("全部结束");
    }
}
