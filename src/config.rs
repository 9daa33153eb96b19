use crate::exclude::ExclusionFilter;
use crate::mapping::IdMapping;
use std::path::PathBuf;
use std::time::Duration;

/// The fully-resolved, immutable configuration for one scan (spec.md §4.8).
///
/// Built once in `main` from [`crate::cli::Cli`] plus the three loaded input
/// files, then wrapped in `Arc` and shared by reference with every worker — the
/// same shape as the teacher's `Arc<Finder>`/`Arc<SearchConfig>` handed to each
/// spawned worker closure (`src/walk/finder.rs`).
#[derive(Debug)]
pub struct RunConfig {
    pub roots: Vec<PathBuf>,
    pub exclusions: ExclusionFilter,
    pub uid_map: IdMapping,
    pub gid_map: IdMapping,
    pub worker_count: usize,
    pub busy_threshold: f64,
    pub two_pool: bool,
    pub stack_mode: bool,
    pub dry_run: bool,
    pub verbose: bool,
    pub report_interval: Option<Duration>,
}
