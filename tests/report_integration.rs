use std::time::Duration;

use ytbgm_downloader::downloader::{DownloadEntry, ElapsedTime, EntryStatus};
use ytbgm_downloader::report::{render_progress_html, status_color, write_report};

fn create_test_entries() -> Vec<DownloadEntry> {
    let mut downloaded = DownloadEntry::new("aaa111", "First", true);
    downloaded.status = EntryStatus::Downloaded;
    downloaded.elapsed = ElapsedTime::Finished(Duration::from_millis(12_345));

    let mut existed = DownloadEntry::new("bbb222", "Second", false);
    existed.status = EntryStatus::Existed;
    existed.elapsed = ElapsedTime::Skipped;

    let pending = DownloadEntry::new("ccc333", "Rock & <Roll>", true);
    vec![downloaded, existed, pending]
}

#[test]
fn test_render_is_deterministic() {
    let entries = create_test_entries();
    let first = render_progress_html("Progress", ".mp4", ".mp3", &entries);
    let second = render_progress_html("Progress", ".mp4", ".mp3", &entries);
    assert_eq!(first, second);
}

#[test]
fn test_render_contains_rows_in_order() {
    let html = render_progress_html("Progress", ".mp4", ".mp3", &create_test_entries());

    assert!(html.contains(r#"<meta http-equiv="refresh" content="2"/>"#));
    assert!(html.contains("<title>Progress</title>"));

    let first = html.find("aaa111").unwrap();
    let second = html.find("bbb222").unwrap();
    let third = html.find("ccc333").unwrap();
    assert!(first < second && second < third);

    assert!(html.contains(r#"href="https://www.youtube.com/watch?v=aaa111""#));
    assert!(html.contains("Audio (.mp3)"));
    assert!(html.contains("Video/Audio (.mp4)"));
    assert!(html.contains(">12.345<"));
    assert!(html.contains(">-<"));
    assert!(html.contains("Rock &amp; &lt;Roll&gt;"));
    assert!(html.contains(r#"text-align: center;">3</td>"#));
}

#[test]
fn test_status_colors() {
    assert_eq!(status_color(EntryStatus::Pending), "red");
    assert_eq!(status_color(EntryStatus::Downloading), "yellow");
    assert_eq!(status_color(EntryStatus::Downloaded), "green");
    assert_eq!(status_color(EntryStatus::Existed), "#1F75FE");
    assert_eq!(status_color(EntryStatus::Failed), "orange");

    let html = render_progress_html("Progress", ".mp4", ".mp3", &create_test_entries());
    assert!(html.contains("background-color: green;\">DOWNLOADED</td>"));
    assert!(html.contains("background-color: #1F75FE;\">EXISTED</td>"));
    assert!(html.contains("background-color: red;\">PENDING</td>"));
}

#[tokio::test]
async fn test_write_report_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("progress.html");

    write_report(&path, "old").await.unwrap();
    write_report(&path, "new").await.unwrap();
    assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "new");
}
