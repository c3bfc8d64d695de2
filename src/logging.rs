//! Dual run log: every event in one file, the provenance audit trail in
//! another.
//!
//! The full log (`scraper.log`) appends across runs. The successes-only
//! log (`scraper_SUCCESS_ONLY.log`) is truncated at the start of each run
//! so it holds exactly the current run's saved images with their source
//! strategy and URL. Log write failures never interrupt scraping.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use tracing::{info, warn};

const FULL_LOG: &str = "scraper.log";
const SUCCESS_LOG: &str = "scraper_SUCCESS_ONLY.log";

/// Log levels as they appear in the bracketed line prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Success => "SUCCESS",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }
}

pub struct DualLog {
    full: Mutex<File>,
    success: Mutex<File>,
    full_path: PathBuf,
    success_path: PathBuf,
}

impl DualLog {
    /// Open the pair of logs in `dir`, creating it if needed. The success
    /// log starts empty every run.
    pub fn open(dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let full_path = dir.join(FULL_LOG);
        let success_path = dir.join(SUCCESS_LOG);

        let full = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&full_path)?;
        let success = File::create(&success_path)?;

        Ok(Self {
            full: Mutex::new(full),
            success: Mutex::new(success),
            full_path,
            success_path,
        })
    }

    /// Open with an explicit full-log path; the success log sits next to
    /// it with a `_SUCCESS_ONLY` stem suffix.
    pub fn open_at(log_path: &Path) -> std::io::Result<Self> {
        let dir = log_path.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir)?;

        let stem = log_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("scraper");
        let ext = log_path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("log");
        let success_path = dir.join(format!("{}_SUCCESS_ONLY.{}", stem, ext));

        let full = OpenOptions::new().create(true).append(true).open(log_path)?;
        let success = File::create(&success_path)?;

        Ok(Self {
            full: Mutex::new(full),
            success: Mutex::new(success),
            full_path: log_path.to_path_buf(),
            success_path,
        })
    }

    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    pub fn success_path(&self) -> &Path {
        &self.success_path
    }

    fn format_line(level: Level, message: &str) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        format!("[{}] [{}] {}\n", timestamp, level.as_str(), message)
    }

    /// Append to the full log at the given level.
    pub fn event(&self, level: Level, message: &str) {
        match level {
            Level::Warning | Level::Error => warn!("{}", message),
            _ => info!("{}", message),
        }
        let line = Self::format_line(level, message);
        if let Ok(mut file) = self.full.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }

    pub fn info(&self, message: &str) {
        self.event(Level::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.event(Level::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.event(Level::Error, message);
    }

    /// Record a successful download in both logs. The message carries the
    /// saved filename plus its originating strategy and source URL, which
    /// makes the success log the provenance record.
    pub fn success(&self, message: &str) {
        info!("{}", message);
        let line = Self::format_line(Level::Success, message);
        if let Ok(mut file) = self.full.lock() {
            let _ = file.write_all(line.as_bytes());
        }
        if let Ok(mut file) = self.success.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_goes_to_both_logs() {
        let dir = tempfile::tempdir().unwrap();
        let log = DualLog::open(dir.path()).unwrap();

        log.info("searching Zappos");
        log.success("Downloaded Nike_Air_Max - 1.jpg via retailer:Zappos from https://c.img/a.jpg");

        let full = std::fs::read_to_string(log.full_path()).unwrap();
        let success = std::fs::read_to_string(log.success_path()).unwrap();

        assert!(full.contains("[INFO] searching Zappos"));
        assert!(full.contains("[SUCCESS] Downloaded Nike_Air_Max - 1.jpg"));
        assert!(!success.contains("searching Zappos"));
        assert!(success.contains("retailer:Zappos"));
        assert!(success.contains("https://c.img/a.jpg"));
    }

    #[test]
    fn test_success_log_truncated_per_run() {
        let dir = tempfile::tempdir().unwrap();
        {
            let log = DualLog::open(dir.path()).unwrap();
            log.success("Downloaded old.jpg");
        }
        let log = DualLog::open(dir.path()).unwrap();
        log.success("Downloaded new.jpg");

        let success = std::fs::read_to_string(log.success_path()).unwrap();
        assert!(!success.contains("old.jpg"));
        assert!(success.contains("new.jpg"));

        // The full log keeps appending across runs.
        let full = std::fs::read_to_string(log.full_path()).unwrap();
        assert!(full.contains("old.jpg"));
        assert!(full.contains("new.jpg"));
    }

    #[test]
    fn test_line_format() {
        let line = DualLog::format_line(Level::Error, "boom");
        // [2026-08-24 12:00:00] [ERROR] boom
        assert!(line.starts_with('['));
        assert!(line.contains("] [ERROR] boom\n"));
        assert_eq!(line.matches('[').count(), 2);
    }
}
