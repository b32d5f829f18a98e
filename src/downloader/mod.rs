pub mod error;
pub mod fetcher;
pub mod models;
pub mod progress;
pub mod scheduler;
pub mod worker;

pub use error::DownloadError;
pub use fetcher::{MediaFetcher, YtDlpFetcher};
pub use models::{DownloadEntry, DownloadTask, ElapsedTime, EntryStatus, SharedEntry, TaskSettings};
pub use scheduler::{AdmissionPolicy, DownloadScheduler, RunSummary, SchedulerOptions, TickOutcome};
pub use worker::DownloadWorker;
