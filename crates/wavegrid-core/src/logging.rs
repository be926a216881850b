//! Logging configuration shared by every WaveGrid binary.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

const LOG_FILE_PREFIX: &str = "wavegrid_";
const LOG_FILE_SUFFIX: &str = ".log";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level name (trace, debug, info, warn, error, off)
    pub level: String,
    /// Directory that holds log files
    pub log_path: PathBuf,
    /// Number of log files kept by [`LogConfig::cleanup_old_logs`]
    pub max_files: usize,
    /// Log to stderr
    pub console_output: bool,
    /// Log to a file in `log_path`
    pub file_output: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_path: PathBuf::from("logs"),
            max_files: 10,
            console_output: true,
            file_output: false,
        }
    }
}

impl LogConfig {
    /// Parse the configured level, defaulting to INFO if invalid.
    pub fn parse_level(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::INFO)
    }

    /// Create the log directory if needed.
    pub fn ensure_log_directory(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.log_path)
    }

    /// Path of today's log file
    pub fn current_log_path(&self) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y-%m-%d");
        self.log_path
            .join(format!("{}{}{}", LOG_FILE_PREFIX, stamp, LOG_FILE_SUFFIX))
    }

    /// Delete the oldest log files beyond `max_files`.
    ///
    /// Returns the number of files removed.
    pub fn cleanup_old_logs(&self) -> io::Result<usize> {
        if !self.log_path.exists() {
            return Ok(0);
        }

        let mut logs: Vec<PathBuf> = std::fs::read_dir(&self.log_path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(LOG_FILE_PREFIX) && n.ends_with(LOG_FILE_SUFFIX))
                    .unwrap_or(false)
            })
            .collect();

        // Date-stamped names sort chronologically; newest first
        logs.sort();
        logs.reverse();

        let mut removed = 0;
        for path in logs.into_iter().skip(self.max_files) {
            std::fs::remove_file(&path)?;
            removed += 1;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        let mut config = LogConfig::default();
        assert_eq!(config.parse_level(), LevelFilter::INFO);

        config.level = "debug".to_string();
        assert_eq!(config.parse_level(), LevelFilter::DEBUG);

        config.level = "loud".to_string();
        assert_eq!(config.parse_level(), LevelFilter::INFO);
    }

    #[test]
    fn test_current_log_path_is_in_log_dir() {
        let config = LogConfig::default();
        let path = config.current_log_path();
        assert!(path.starts_with("logs"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(LOG_FILE_PREFIX));
        assert!(name.ends_with(LOG_FILE_SUFFIX));
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        for day in 1..=5 {
            let name = format!("wavegrid_2026-01-0{}.log", day);
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), b"keep").unwrap();

        let config = LogConfig {
            log_path: dir.path().to_path_buf(),
            max_files: 2,
            ..LogConfig::default()
        };
        assert_eq!(config.cleanup_old_logs().unwrap(), 3);

        assert!(dir.path().join("wavegrid_2026-01-05.log").exists());
        assert!(dir.path().join("wavegrid_2026-01-04.log").exists());
        assert!(!dir.path().join("wavegrid_2026-01-01.log").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_cleanup_missing_directory() {
        let config = LogConfig {
            log_path: PathBuf::from("does/not/exist"),
            ..LogConfig::default()
        };
        assert_eq!(config.cleanup_old_logs().unwrap(), 0);
    }
}
