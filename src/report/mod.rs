use std::fmt::Write as _;
use std::path::Path;

use crate::common::utils::{escape_html, youtube_link};
use crate::downloader::models::{DownloadEntry, EntryStatus};

const HEADER_ROW: &str = r#"<tr style="border-bottom: 4px solid black;">
          <th>#</th>
          <th colspan="2">Link</th>
          <th>File Type</th>
          <th>Title</th>
          <th>Status</th>
          <th>Download Time<br>(seconds)</th>
        </tr>"#;

const STYLE: &str = r#"<style>
      th, td
      {
        border: 2px solid #000000;
      }
      th
      {
        background-color: #D3D3D3;
        padding: 10px;
        font-size: 20px;
      }
      td
      {
        background-color: #ECECEC;
        font-size: 18px;
        padding: 4px 20px;
      }
      .hoverRowHighlight tr:hover
      {
        filter: drop-shadow(0px 0px 20px black);
      }
    </style>"#;

/// 状态单元格的背景色
pub fn status_color(status: EntryStatus) -> &'static str {
    match status {
        EntryStatus::Pending => "red",
        EntryStatus::Downloading => "yellow",
        EntryStatus::Downloaded => "green",
        EntryStatus::Existed => "#1F75FE",
        EntryStatus::Failed => "orange",
    }
}

/// 文件类型说明，如 `Audio (.mp3)`
pub fn file_type_label(audio_only: bool, video_format: &str, audio_format: &str) -> String {
    if audio_only {
        format!("Audio ({})", audio_format)
    } else {
        format!("Video/Audio ({})", video_format)
    }
}

/// 生成进度页面，每 2 秒自动刷新
///
/// 输出只取决于参数，相同的条目列表总是得到相同的页面。
pub fn render_progress_html(
    page_title: &str,
    video_format: &str,
    audio_format: &str,
    entries: &[DownloadEntry],
) -> String {
    let mut rows = String::new();
    for (i, entry) in entries.iter().enumerate() {
        // 写入 String 不会失败
        let _ = write!(
            rows,
            r#"
        <tr>
          <td nowrap style="text-align: center;">{index}</td>
          <td nowrap style="text-align: center;"><a target="_blank" href="{link}">[Link]</a></td>
          <td nowrap style="text-align: center;">{reference}</td>
          <td nowrap style="text-align: center;">{file_type}</td>
          <td nowrap style="text-align: left;">{title}</td>
          <td nowrap style="text-align: center; background-color: {color};">{status}</td>
          <td nowrap style="text-align: right;">{elapsed}</td>
        </tr>"#,
            index = i + 1,
            link = escape_html(&youtube_link(&entry.reference)),
            reference = escape_html(&entry.reference),
            file_type = escape_html(&file_type_label(entry.audio_only, video_format, audio_format)),
            title = escape_html(&entry.title),
            color = status_color(entry.status),
            status = entry.status,
            elapsed = entry.elapsed,
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="UTF-8">
    <meta http-equiv="refresh" content="2"/>
    <title>{title}</title>
    {style}
  </head>
  <body>
    <table align="center" style="border-collapse: collapse;">
      <thead>
        {header}
      </thead>
      <tbody class="hoverRowHighlight">{rows}
      </tbody>
    </table>
  </body>
</html>
"#,
        title = escape_html(page_title),
        style = STYLE,
        header = HEADER_ROW,
        rows = rows,
    )
}

/// 覆盖写入进度页面
pub async fn write_report(path: &Path, html: &str) -> std::io::Result<()> {
    tokio::fs::write(path, html).await
}
