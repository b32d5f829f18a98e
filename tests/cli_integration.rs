use std::path::PathBuf;

use clap::Parser;
use ytbgm_downloader::cli::Cli;
use ytbgm_downloader::config::{DEFAULT_MANIFEST_URL, ManifestSource};
use ytbgm_downloader::downloader::AdmissionPolicy;

#[test]
fn test_cli_defaults() {
    let config = Cli::try_parse_from(["ytbgm"]).unwrap().into_config();
    assert_eq!(config.manifest, ManifestSource::Remote(DEFAULT_MANIFEST_URL.to_string()));
    assert_eq!(config.parallel_limit.get(), 3);
    assert_eq!(config.admission, AdmissionPolicy::OnePerTick);
    assert!(config.audio_only);
    assert!(config.show_progress_bar);
}

#[test]
fn test_cli_overrides() {
    let config = Cli::try_parse_from([
        "ytbgm",
        "--manifest",
        "bgm.json",
        "--output-dir",
        "out",
        "--parallel",
        "5",
        "--video",
        "--fill-capacity",
        "--report-in-output-dir",
        "--no-progress",
    ])
    .unwrap()
    .into_config();

    assert_eq!(config.manifest, ManifestSource::Local(PathBuf::from("bgm.json")));
    assert_eq!(config.parallel_limit.get(), 5);
    assert!(!config.audio_only);
    assert_eq!(config.admission, AdmissionPolicy::FillCapacity);
    assert_eq!(config.report_path(), PathBuf::from("out").join("progress.html"));
    assert!(!config.show_progress_bar);
}

#[test]
fn test_cli_rejects_zero_parallel() {
    assert!(Cli::try_parse_from(["ytbgm", "--parallel", "0"]).is_err());
}
