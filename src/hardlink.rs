use dashmap::DashSet;

/// Result of a [`HardlinkSet::mark`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkResult {
    /// This was the first time the pair was seen; ownership change should proceed.
    Fresh,
    /// The pair was already present; ownership change must be skipped.
    Seen,
}

/// A concurrency-safe set of `(device, inode)` pairs.
///
/// Grounded directly on the teacher's `inode_cache: Option<DashSet<(u64, u64)>>`
/// (`walk/finder.rs`), used there to dedup symlink targets across a parallel
/// walk — the identical concurrency shape this spec asks for with hardlinks.
/// `DashSet::insert` is already the atomic test-and-insert the spec requires, and
/// its sharded-lock implementation handles growth internally without chuid having
/// to manage capacity itself.
#[derive(Debug, Default)]
pub struct HardlinkSet {
    seen: DashSet<(u64, u64)>,
}

impl HardlinkSet {
    #[must_use]
    pub fn new() -> Self {
        Self {
            seen: DashSet::new(),
        }
    }

    /// Atomically test-and-insert `(dev, ino)`. Returns `Fresh` the first time a
    /// given pair is marked, `Seen` on every subsequent call for the same pair.
    pub fn mark(&self, dev: u64, ino: u64) -> MarkResult {
        if self.seen.insert((dev, ino)) {
            MarkResult::Fresh
        } else {
            MarkResult::Seen
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn fresh_then_seen() {
        let set = HardlinkSet::new();
        assert_eq!(set.mark(1, 100), MarkResult::Fresh);
        assert_eq!(set.mark(1, 100), MarkResult::Seen);
        assert_eq!(set.mark(1, 101), MarkResult::Fresh);
    }

    #[test]
    fn exactly_one_fresh_across_threads() {
        let set = Arc::new(HardlinkSet::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let set = Arc::clone(&set);
            handles.push(thread::spawn(move || set.mark(7, 42)));
        }
        let fresh_count = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| *r == MarkResult::Fresh)
            .count();
        assert_eq!(fresh_count, 1);
    }
}
