use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::error::StartupError;

/// Log severities, per spec.md §6's log-file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

/// A line-oriented log-file writer.
///
/// Lines are `<weekday month day HH:MM:SS year> <severity>: <message>` (spec.md
/// §6), using `chrono` for the timestamp the way the teacher uses `chrono` to
/// format file metadata timestamps (`src/fs/dir_entry.rs`). One `Mutex`-guarded
/// writer is shared by every worker thread; each call writes and flushes a
/// single line so a crash never loses a half-written log.
pub struct Logger {
    writer: Mutex<BufWriter<File>>,
    verbose: bool,
}

impl Logger {
    /// Opens (creating if necessary) `<log_dir>/chuid_log`.
    pub fn open(log_dir: &Path, verbose: bool) -> Result<Self, StartupError> {
        std::fs::create_dir_all(log_dir).map_err(StartupError::UnwritableLogDir)?;
        let path = log_dir.join("chuid_log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(StartupError::UnwritableLogDir)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            verbose,
        })
    }

    pub fn log(&self, severity: Severity, message: &str) {
        let timestamp = Local::now().format("%a %b %e %H:%M:%S %Y");
        let line = format!("{timestamp} {}: {message}\n", severity.as_str());
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
        drop(writer);
        if self.verbose {
            eprint!("{line}");
        }
    }

    pub fn info(&self, message: &str) {
        self.log(Severity::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(Severity::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Severity::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_formatted_lines() {
        let dir = std::env::temp_dir().join(format!("chuid_logtest_{}", std::process::id()));
        let logger = Logger::open(&dir, false).unwrap();
        logger.info("started");
        logger.warning("stat failed for /tmp/x");
        drop(logger);

        let contents = std::fs::read_to_string(dir.join("chuid_log")).unwrap();
        let _ = std::fs::remove_dir_all(&dir);

        let mut lines = contents.lines();
        let first = lines.next().unwrap();
        assert!(first.contains("INFO: started"));
        let second = lines.next().unwrap();
        assert!(second.contains("WARNING: stat failed for /tmp/x"));
    }
}
