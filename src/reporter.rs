use crate::stats::Stats;
use crossbeam_channel::tick;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Spawns the optional progress-reporter thread enabled by `-s <sec>` (spec.md
/// §5: "An optional reporter thread runs in parallel, reading dispatcher
/// counters unsynchronized and printing periodic progress").
///
/// Ticks on `crossbeam_channel::tick`, the idiomatic replacement for a manual
/// sleep loop wherever the pack reaches for `crossbeam-channel` for timing
/// (the teacher itself depends on `crossbeam-channel` for its result-batch
/// pipeline, `src/walk/finder.rs`).
pub fn spawn(stats: Arc<Stats>, interval: Duration, done: Arc<AtomicBool>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let ticker = tick(interval);
        loop {
            ticker.recv().ok();
            if done.load(Ordering::Relaxed) {
                break;
            }
            println!("progress: {}", stats.snapshot());
        }
    })
}
