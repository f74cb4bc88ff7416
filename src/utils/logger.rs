//! Logger utility for application-wide logging
//!
//! This module provides an operation log that works alongside the standard
//! log crate: plain lines appended to a log file, and a `log::Log`
//! implementation so the same file can collect every log record.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use log::{Log, Record, Level, Metadata};

/// Custom logger implementation
pub struct Logger {
    /// File handle for log output, `None` when logging is disabled
    file: Mutex<Option<File>>,
    /// Most verbose level passed on to the log file
    level: Level,
}

impl Logger {
    /// Creates a logger appending to `log_file`
    ///
    /// # Arguments
    ///
    /// * `log_file` - Path to the log file, created when missing
    ///
    /// # Returns
    ///
    /// A new Logger instance or an error if the file cannot be opened
    pub fn new(log_file: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(log_file)?;
        Ok(Logger {
            file: Mutex::new(Some(file)),
            level: Level::Debug,
        })
    }

    /// Creates a logger that discards its messages
    pub fn disabled() -> Self {
        Logger {
            file: Mutex::new(None),
            level: Level::Info,
        }
    }

    /// Sets the most verbose level recorded when installed globally
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.file.lock().map(|file| file.is_some()).unwrap_or(false)
    }

    /// Logs a message to the log file
    ///
    /// # Arguments
    ///
    /// * `message` - The message to log
    pub fn log(&self, message: &str) -> io::Result<()> {
        let mut guard = self.file.lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;

        if let Some(file) = guard.as_mut() {
            writeln!(file, "{} {}", Local::now().format("%Y-%m-%d %H:%M:%S"), message)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Static method to initialize the global logger
    ///
    /// Records go to `log_file` and are echoed to stderr.
    pub fn init_global_logger(log_file: &Path, level: Level) -> io::Result<()> {
        let global_logger = Logger::new(log_file)?.with_level(level);

        if log::set_boxed_logger(Box::new(global_logger)).is_err() {
            eprintln!("Warning: Global logger was already initialized");
        }

        log::set_max_level(level.to_level_filter());
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("[{}] {}", record.level(), record.args());
            let _ = Logger::log(self, &message);

            eprintln!("{}", message);
        }
    }

    fn flush(&self) {
        // Already flushing in the log method
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn messages_are_appended_to_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ops.log");

        let logger = Logger::new(&path).unwrap();
        logger.log("first").unwrap();
        logger.log("second").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" first"));
        assert!(lines[1].ends_with(" second"));
    }

    #[test]
    fn disabled_logger_accepts_messages() {
        let logger = Logger::disabled();
        assert!(!logger.is_enabled());
        assert!(logger.log("dropped").is_ok());
    }
}
