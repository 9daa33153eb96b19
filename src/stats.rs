use std::sync::atomic::{AtomicU64, Ordering};

/// Run-wide counters, incremented by every worker as it classifies and changes
/// entries. Observational only — like the dispatcher's busy-count idleness
/// probe, nothing in the termination protocol depends on these being exact at
/// any instant, so `Relaxed` ordering throughout is sufficient (spec.md §2
/// components 5/6 diagnostic counters; §5 reporter semantics).
#[derive(Debug, Default)]
pub struct Stats {
    pub files: AtomicU64,
    pub symlinks: AtomicU64,
    pub directories: AtomicU64,
    pub others: AtomicU64,
    pub uid_changes: AtomicU64,
    pub gid_changes: AtomicU64,
    pub warnings: AtomicU64,
}

impl Stats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_file(&self) {
        self.files.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_symlink(&self) {
        self.symlinks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_directory(&self) {
        self.directories.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_other(&self) {
        self.others.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_uid_change(&self) {
        self.uid_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_gid_change(&self) {
        self.gid_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_warning(&self) {
        self.warnings.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            files: self.files.load(Ordering::Relaxed),
            symlinks: self.symlinks.load(Ordering::Relaxed),
            directories: self.directories.load(Ordering::Relaxed),
            others: self.others.load(Ordering::Relaxed),
            uid_changes: self.uid_changes.load(Ordering::Relaxed),
            gid_changes: self.gid_changes.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time read of [`Stats`], used by the reporter thread and the final
/// end-of-run summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsSnapshot {
    pub files: u64,
    pub symlinks: u64,
    pub directories: u64,
    pub others: u64,
    pub uid_changes: u64,
    pub gid_changes: u64,
    pub warnings: u64,
}

impl std::fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "files={} symlinks={} dirs={} others={} uid_changes={} gid_changes={} warnings={}",
            self.files,
            self.symlinks,
            self.directories,
            self.others,
            self.uid_changes,
            self.gid_changes,
            self.warnings
        )
    }
}
