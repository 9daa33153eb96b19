use std::fmt;

/// Errors that abort the run before any worker starts.
///
/// Startup errors are fatal: the process logs nothing (the log file may not even
/// exist yet) and exits with the wrapped errno or, for pure configuration
/// mistakes, `EXIT_FAILURE`.
#[derive(Debug)]
pub enum StartupError {
    MissingMappingFile(std::io::Error),
    MissingRootsFile(std::io::Error),
    MissingExclusionFile(std::io::Error),
    UnwritableLogDir(std::io::Error),
    NoValidRoots,
    InvalidBusyThreshold(f64),
    InvalidWorkerCount,
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMappingFile(e) => write!(f, "cannot read mapping file: {e}"),
            Self::MissingRootsFile(e) => write!(f, "cannot read roots file: {e}"),
            Self::MissingExclusionFile(e) => write!(f, "cannot read exclusion file: {e}"),
            Self::UnwritableLogDir(e) => write!(f, "cannot create log file: {e}"),
            Self::NoValidRoots => write!(f, "no valid filesystem roots were given"),
            Self::InvalidBusyThreshold(b) => {
                write!(f, "busy threshold {b} is not in (0, 1]")
            }
            Self::InvalidWorkerCount => write!(f, "worker count must be at least 1"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MissingMappingFile(e)
            | Self::MissingRootsFile(e)
            | Self::MissingExclusionFile(e)
            | Self::UnwritableLogDir(e) => Some(e),
            Self::NoValidRoots | Self::InvalidBusyThreshold(_) | Self::InvalidWorkerCount => None,
        }
    }
}

impl StartupError {
    /// The errno a startup error should exit the process with, where one exists.
    #[must_use]
    pub const fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::MissingMappingFile(e)
            | Self::MissingRootsFile(e)
            | Self::MissingExclusionFile(e)
            | Self::UnwritableLogDir(e) => e.raw_os_error(),
            Self::NoValidRoots | Self::InvalidBusyThreshold(_) | Self::InvalidWorkerCount => None,
        }
    }
}

/// Errors encountered while processing a single directory entry.
///
/// These never abort traversal: the worker logs a `WARNING` and moves on to the
/// next entry or directory (spec.md §7 per-entry taxonomy).
#[derive(Debug)]
pub enum EntryError {
    OpenDir(std::io::Error),
    ReadDir(std::io::Error),
    Stat(std::io::Error),
    Chown(std::io::Error),
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenDir(e) => write!(f, "failed to open directory: {e}"),
            Self::ReadDir(e) => write!(f, "failed to read directory entry: {e}"),
            Self::Stat(e) => write!(f, "failed to stat entry: {e}"),
            Self::Chown(e) => write!(f, "failed to change ownership: {e}"),
        }
    }
}

impl std::error::Error for EntryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::OpenDir(e) | Self::ReadDir(e) | Self::Stat(e) | Self::Chown(e) => Some(e),
        }
    }
}
