use std::path::PathBuf;
use std::sync::Arc;

/// Sentinel resume-cursor value meaning "start this directory from the beginning".
pub const RESUME_FROM_START: usize = 0;

/// A directory whose walk has not (yet) fully completed.
///
/// Created when a root is enqueued or a directory child is discovered; dropped
/// once its entry loop runs to completion without a handover (spec.md §3).
#[derive(Debug, Clone)]
pub struct SubtreeDescriptor {
    pub path: PathBuf,
    /// Index into the directory's buffered entry snapshot to resume from.
    /// `RESUME_FROM_START` means "this directory has not been opened yet".
    pub resume_cursor: usize,
    /// The filesystem root this subtree was discovered under.
    pub root: Arc<PathBuf>,
}

impl SubtreeDescriptor {
    #[must_use]
    pub fn root(path: PathBuf) -> Self {
        let root = Arc::new(path.clone());
        Self {
            path,
            resume_cursor: RESUME_FROM_START,
            root,
        }
    }

    #[must_use]
    pub fn child(path: PathBuf, root: &Arc<PathBuf>) -> Self {
        Self {
            path,
            resume_cursor: RESUME_FROM_START,
            root: Arc::clone(root),
        }
    }
}
