use std::ffi::OsStr;

/// An immutable ordered collection of basenames/paths excluded from traversal.
///
/// Matched by byte equality against a directory entry's basename (spec.md §4.3
/// step 3a), not by glob or regex — deliberately simpler than the teacher's
/// `SearchConfig` pattern matcher (`src/config.rs`), since the spec never asks for
/// pattern matching here, only literal exclusion.
#[derive(Debug, Default, Clone)]
pub struct ExclusionFilter {
    entries: Vec<Box<OsStr>>,
}

impl ExclusionFilter {
    #[must_use]
    pub fn new(entries: Vec<Box<OsStr>>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn is_excluded(&self, basename: &OsStr) -> bool {
        self.entries.iter().any(|e| e.as_ref() == basename)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_exact_basename_only() {
        let filter = ExclusionFilter::new(vec![
            Box::from(OsStr::new("skip")),
            Box::from(OsStr::new(".cache")),
        ]);
        assert!(filter.is_excluded(OsStr::new("skip")));
        assert!(filter.is_excluded(OsStr::new(".cache")));
        assert!(!filter.is_excluded(OsStr::new("skipped")));
        assert!(!filter.is_excluded(OsStr::new("other")));
    }

    #[test]
    fn empty_filter_excludes_nothing() {
        let filter = ExclusionFilter::default();
        assert!(filter.is_empty());
        assert!(!filter.is_excluded(OsStr::new("anything")));
    }
}
