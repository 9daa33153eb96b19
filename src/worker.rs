use crate::config::RunConfig;
use crate::deque::WorkDeque;
use crate::dispatcher::{Acquired, DequeEnd, Dispatcher};
use crate::hardlink::{HardlinkSet, MarkResult};
use crate::logging::Logger;
use crate::ownership::{apply_change, plan_change, OwnershipChange};
use crate::stats::Stats;
use crate::subtree::SubtreeDescriptor;
use std::os::unix::fs::MetadataExt as _;
use std::path::Path;
use std::time::Instant;

/// Everything a worker needs read-only access to: the dispatcher, the hardlink
/// set, the resolved run configuration, the logger, and the shared run
/// statistics (spec.md §4.3's worker contract).
pub struct WorkerContext<'a> {
    pub id: usize,
    pub worker_total: usize,
    pub dispatcher: &'a Dispatcher,
    pub hardlinks: &'a HardlinkSet,
    pub config: &'a RunConfig,
    pub logger: &'a Logger,
    pub stats: &'a Stats,
}

/// spec.md §4.3's outer loop: acquire, walk, release, repeat until completion.
pub fn run(ctx: &WorkerContext<'_>) {
    loop {
        match ctx.dispatcher.acquire() {
            Acquired::Done => break,
            Acquired::Work(root) => {
                let anchor = Instant::now();
                let mut scanned: u64 = 0;
                walk(ctx, root, &mut scanned, anchor);
                ctx.dispatcher.release();
            }
        }
    }
}

/// spec.md §4.3 Walk: drains a private DEQ seeded with one subtree root,
/// spilling backlog to the global pools via handover whenever the idleness
/// probe fires.
fn walk(ctx: &WorkerContext<'_>, root: SubtreeDescriptor, scanned: &mut u64, anchor: Instant) {
    let mut private = WorkDeque::new();
    private.push_back(root);

    while let Some(w) = private.pop_front() {
        process_directory(ctx, w, &mut private, scanned, anchor);
    }
}

/// Processes one subtree descriptor's directory, applying ownership changes to
/// its children and possibly handing its backlog off mid-iteration.
fn process_directory(
    ctx: &WorkerContext<'_>,
    mut w: SubtreeDescriptor,
    private: &mut WorkDeque,
    scanned: &mut u64,
    anchor: Instant,
) {
    let read_dir = match std::fs::read_dir(&w.path) {
        Ok(rd) => rd,
        Err(e) => {
            ctx.logger
                .warning(&format!("failed to open directory {}: {e}", w.path.display()));
            ctx.stats.record_warning();
            return;
        }
    };

    // The resume cursor is an index into this directory's entry snapshot, taken
    // eagerly each time the directory is opened (see SPEC_FULL.md §3). On a
    // stable tree this reproduces the same order on re-open, so resuming at
    // `w.resume_cursor` always starts strictly after the last entry a previous
    // (or this) worker finished.
    let entries: Vec<std::fs::DirEntry> = read_dir.filter_map(Result::ok).collect();

    let mut index = w.resume_cursor;
    let mut handed_over = false;

    while index < entries.len() {
        let entry = &entries[index];
        index += 1;

        let basename = entry.file_name();
        if ctx.config.exclusions.is_excluded(&basename) {
            continue;
        }

        let child_path = entry.path();
        let metadata = match std::fs::symlink_metadata(&child_path) {
            Ok(m) => m,
            Err(e) => {
                ctx.logger
                    .warning(&format!("failed to stat {}: {e}", child_path.display()));
                ctx.stats.record_warning();
                continue;
            }
        };

        classify_and_apply(ctx, &child_path, &metadata, &w.root, private);

        *scanned += 1;

        if ctx.dispatcher.is_idle(ctx.worker_total, ctx.config.busy_threshold) {
            handed_over = true;
            break;
        }
    }

    if handed_over {
        w.resume_cursor = index;
        if index < entries.len() {
            private.push_back(w);
        }
        perform_handover(ctx, private, scanned, anchor);
    }
    // else: w is fully processed and discarded, matching spec.md §4.3 step 4.
}

fn classify_and_apply(
    ctx: &WorkerContext<'_>,
    path: &Path,
    metadata: &std::fs::Metadata,
    root: &std::sync::Arc<std::path::PathBuf>,
    private: &mut WorkDeque,
) {
    let change = plan_change(metadata.uid(), metadata.gid(), &ctx.config.uid_map, &ctx.config.gid_map);

    let file_type = metadata.file_type();
    if file_type.is_dir() {
        apply_to_entry(ctx, path, &change);
        ctx.stats.record_directory();
        let child = SubtreeDescriptor::child(path.to_path_buf(), root);
        match ctx.dispatcher.deque_end() {
            DequeEnd::Front => private.push_front(child),
            DequeEnd::Back => private.push_back(child),
        }
    } else if file_type.is_symlink() {
        apply_to_entry(ctx, path, &change);
        ctx.stats.record_symlink();
    } else if file_type.is_file() {
        let dedup_needed = metadata.nlink() > 1;
        let should_apply = if dedup_needed {
            matches!(ctx.hardlinks.mark(metadata.dev(), metadata.ino()), MarkResult::Fresh)
        } else {
            true
        };
        if should_apply {
            apply_to_entry(ctx, path, &change);
        }
        ctx.stats.record_file();
    } else {
        ctx.stats.record_other();
    }
}

fn apply_to_entry(ctx: &WorkerContext<'_>, path: &Path, change: &OwnershipChange) {
    if change.uid.is_some() {
        ctx.stats.record_uid_change();
    }
    if change.gid.is_some() {
        ctx.stats.record_gid_change();
    }
    if change.is_noop() {
        return;
    }

    if ctx.config.dry_run {
        println!("{}", describe_change(path, change));
        return;
    }

    if let Err(e) = apply_change(path, change) {
        ctx.logger
            .warning(&format!("failed to change ownership of {}: {e}", path.display()));
        ctx.stats.record_warning();
    }
}

fn describe_change(path: &Path, change: &OwnershipChange) -> String {
    let mut parts = Vec::new();
    if let Some((old, new)) = change.uid {
        parts.push(format!("uid {old}->{new}"));
    }
    if let Some((old, new)) = change.gid {
        parts.push(format!("gid {old}->{new}"));
    }
    format!("{}: {}", path.display(), parts.join(", "))
}

/// spec.md §4.3 Handover: compute the observed speed, detach the descriptor the
/// worker keeps, and splice everything else into the global pools.
fn perform_handover(ctx: &WorkerContext<'_>, private: &mut WorkDeque, scanned: &mut u64, anchor: Instant) {
    if private.len() <= 1 {
        return;
    }

    let elapsed = anchor.elapsed().as_secs_f64();
    let speed = if elapsed > 0.0 {
        *scanned as f64 / elapsed
    } else {
        *scanned as f64
    };

    let Some(kept) = private.pop_front() else {
        return;
    };

    let mut remainder = WorkDeque::new();
    std::mem::swap(private, &mut remainder);

    ctx.dispatcher.handover(remainder, speed);

    private.push_back(kept);
}
