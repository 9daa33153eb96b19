use crate::logging::Logger;

/// Extra file descriptors the process itself needs (stdio, the log file, and a
/// little slack) on top of one per worker, per spec.md §5's "reduces the worker
/// count if fewer file descriptors than `workers + small_offset` are available".
const SMALL_OFFSET: u64 = 8;

/// glibc's `PTHREAD_THREADS_MAX` (`bits/local_lim.h`). Not something
/// `getrlimit`/`sysconf` exposes at runtime, so it's carried as a literal
/// constant here rather than queried, the ceiling spec.md §6 names for `-t`
/// ("clamped to ≤ `PTHREAD_THREADS_MAX`").
const PTHREAD_THREADS_MAX: usize = 16384;

/// Reads `RLIMIT_NOFILE`, attempts to raise the soft limit to the hard limit
/// (best-effort; failure is logged, not fatal), and returns the resulting soft
/// limit. Mirrors the teacher's comfort with raw `libc` FFI for syscalls the
/// standard library doesn't expose (`src/direntry.rs`'s direct use of `libc`
/// primitives), applied here to resource-limit plumbing instead of dirent
/// parsing.
pub fn raise_and_read_nofile_limit(logger: &Logger) -> u64 {
    let mut limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };

    // SAFETY: `limit` is a valid, exclusively-owned `rlimit` for the duration of
    // this call.
    let got = unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) };
    if got != 0 {
        logger.warning(&format!(
            "getrlimit(RLIMIT_NOFILE) failed: {}",
            std::io::Error::last_os_error()
        ));
        return 256; // conservative fallback
    }

    if limit.rlim_cur < limit.rlim_max {
        let raised = libc::rlimit {
            rlim_cur: limit.rlim_max,
            rlim_max: limit.rlim_max,
        };
        // SAFETY: `raised` is a valid, exclusively-owned `rlimit` for the
        // duration of this call.
        let set = unsafe { libc::setrlimit(libc::RLIMIT_NOFILE, &raised) };
        if set == 0 {
            limit.rlim_cur = limit.rlim_max;
        } else {
            logger.warning(&format!(
                "setrlimit(RLIMIT_NOFILE) failed, continuing with soft limit {}",
                limit.rlim_cur
            ));
        }
    }

    limit.rlim_cur
}

/// Clamps `requested` workers to `PTHREAD_THREADS_MAX` and to what the
/// process's open-file budget allows (spec.md §6: "clamped to ≤
/// `PTHREAD_THREADS_MAX` and to `open_files_limit − small_offset`").
#[must_use]
pub fn clamp_worker_count(requested: usize, open_file_limit: u64, logger: &Logger) -> usize {
    let thread_clamped = requested.min(PTHREAD_THREADS_MAX);
    if thread_clamped < requested {
        logger.warning(&format!(
            "reducing worker count from {requested} to {thread_clamped} to fit PTHREAD_THREADS_MAX"
        ));
    }

    let budget = open_file_limit.saturating_sub(SMALL_OFFSET);
    let clamped = (thread_clamped as u64).min(budget.max(1)) as usize;
    if clamped < thread_clamped {
        logger.warning(&format!(
            "reducing worker count from {thread_clamped} to {clamped} to fit open-file limit {open_file_limit}"
        ));
    }
    clamped.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logger() -> Logger {
        let dir = std::env::temp_dir().join(format!("chuid_rlimit_test_{}", std::process::id()));
        Logger::open(&dir, false).unwrap()
    }

    #[test]
    fn clamps_when_budget_is_small() {
        let logger = logger();
        assert_eq!(clamp_worker_count(20, 10, &logger), 2);
    }

    #[test]
    fn leaves_small_requests_untouched() {
        let logger = logger();
        assert_eq!(clamp_worker_count(4, 1024, &logger), 4);
    }

    #[test]
    fn never_clamps_to_zero() {
        let logger = logger();
        assert_eq!(clamp_worker_count(4, 0, &logger), 1);
    }

    #[test]
    fn clamps_to_pthread_threads_max() {
        let logger = logger();
        assert_eq!(
            clamp_worker_count(PTHREAD_THREADS_MAX + 1000, u64::MAX, &logger),
            PTHREAD_THREADS_MAX
        );
    }
}
