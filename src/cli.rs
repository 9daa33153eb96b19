use clap::Parser;
use std::path::PathBuf;

/// Default worker count, computed at compile time from the number of available
/// threads the way the teacher's `build.rs` stamps `THREAD_COUNT` for its own
/// `-j/--threads` default.
const DEFAULT_WORKERS: &str = env!("CHUID_THREAD_COUNT");

/// Recursively rewrite UID/GID ownership beneath a set of filesystem roots.
///
/// Mirrors the flag set of the original `chuid` tool (spec.md §6): each short
/// flag below is the CLI's only spelling, matching the source's getopt-style
/// surface rather than inventing long-flag aliases it never had.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// UID/GID mapping file (required)
    #[arg(short = 'i', value_name = "PATH")]
    pub mapping_file: PathBuf,

    /// Filesystem-roots file (required)
    #[arg(short = 'd', value_name = "PATH")]
    pub roots_file: PathBuf,

    /// Exclusion file
    #[arg(short = 'e', value_name = "PATH")]
    pub exclusion_file: Option<PathBuf>,

    /// Log directory; `chuid_log` is created inside (required)
    #[arg(short = 'l', value_name = "DIR")]
    pub log_dir: PathBuf,

    /// Worker count, clamped to the process's open-file budget
    #[arg(short = 't', default_value = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Busy threshold in (0, 1]; triggers handover when under-threshold
    #[arg(short = 'b', default_value_t = 0.9)]
    pub busy_threshold: f64,

    /// Progress-print interval in seconds; enables the reporter thread
    #[arg(short = 's', value_name = "SECONDS")]
    pub report_interval: Option<u64>,

    /// Single-pool mode (disable fast/slow split)
    #[arg(short = 'o')]
    pub single_pool: bool,

    /// Breadth-first private work queue (default is depth-first)
    #[arg(short = 'q')]
    pub breadth_first: bool,

    /// Dry run: report intended changes, modify nothing
    #[arg(short = 'n')]
    pub dry_run: bool,

    /// Verbose: mirror log lines to stderr
    #[arg(short = 'v')]
    pub verbose: bool,
}

impl Cli {
    #[must_use]
    pub fn two_pool_mode(&self) -> bool {
        !self.single_pool
    }

    #[must_use]
    pub fn stack_mode(&self) -> bool {
        !self.breadth_first
    }
}
