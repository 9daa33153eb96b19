use crate::error::EntryError;
use crate::mapping::IdMapping;
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// The ownership change, if any, that applies to one entry (spec.md §4.5).
///
/// UID and GID changes are computed independently: an input table may remap
/// UIDs and GIDs under entirely separate policies, so one call never implies
/// the other (spec.md §4.5 rationale).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnershipChange {
    pub uid: Option<(u32, u32)>,
    pub gid: Option<(u32, u32)>,
}

impl OwnershipChange {
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.uid.is_none() && self.gid.is_none()
    }
}

/// Scans both mapping tables for `st_uid`/`st_gid` and returns the changes that
/// apply, without touching the filesystem (spec.md §4.5, and the dry-run /
/// "observable via counters" requirement of spec.md §8).
#[must_use]
pub fn plan_change(current_uid: u32, current_gid: u32, uid_map: &IdMapping, gid_map: &IdMapping) -> OwnershipChange {
    OwnershipChange {
        uid: uid_map.lookup(current_uid).map(|new| (current_uid, new)),
        gid: gid_map.lookup(current_gid).map(|new| (current_gid, new)),
    }
}

/// Applies a planned ownership change to `path` using `lchown`.
///
/// `lchown` is used uniformly for every entry type, not just symlinks: for a
/// regular file or directory the final path component is never itself a
/// symlink, so `chown` and `lchown` are equivalent there — using `lchown`
/// everywhere collapses what would otherwise be a branch on file type into one
/// code path, while still giving symlinks the link-preserving behaviour spec.md
/// §4.5 requires (the link is never followed).
///
/// `-1` (passed as `u32::MAX`, per `chown(2)`'s "leave unchanged" convention) is
/// substituted for whichever of uid/gid the caller is not changing, so the two
/// changes truly are independent syscalls-worth of effect, even though only one
/// `lchown` call is issued when both apply.
pub fn apply_change(path: &Path, change: &OwnershipChange) -> Result<(), EntryError> {
    if change.is_noop() {
        return Ok(());
    }

    let new_uid = change.uid.map_or(u32::MAX, |(_, new)| new);
    let new_gid = change.gid.map_or(u32::MAX, |(_, new)| new);

    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        EntryError::Chown(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path contains an interior NUL byte",
        ))
    })?;

    // SAFETY: `c_path` is a valid NUL-terminated byte string for the lifetime of
    // this call; `lchown` does not retain the pointer afterward.
    let rc = unsafe { libc::lchown(c_path.as_ptr(), new_uid, new_gid) };
    if rc != 0 {
        return Err(EntryError::Chown(std::io::Error::last_os_error()));
    }
    Ok(())
}
