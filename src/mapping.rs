/// An immutable ordered sequence of `(old, new)` id pairs, queried by linear scan
/// for the first matching `old` (spec.md §3 Mapping tables / §4.4).
///
/// The teacher's design notes (spec.md §9) call for replacing the source's
/// hand-rolled singly-linked list with "a simple contiguous ordered sequence of
/// records" — a plain `Vec` is exactly that, and at the expected table sizes (a
/// handful to a few hundred remaps) a linear scan is both correct and fast enough;
/// no index is worth the complexity.
#[derive(Debug, Default, Clone)]
pub struct IdMapping {
    pairs: Vec<(u32, u32)>,
}

impl IdMapping {
    #[must_use]
    pub fn new(pairs: Vec<(u32, u32)>) -> Self {
        Self { pairs }
    }

    /// Returns the first pair whose `old` equals `id`, if any.
    #[must_use]
    pub fn lookup(&self, id: u32) -> Option<u32> {
        self.pairs
            .iter()
            .find(|(old, _)| *old == id)
            .map(|(_, new)| *new)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Inserts `(old, new)` unless `old` is already present, in which case the
    /// existing pair wins (spec.md §3 invariant: no duplicate `old`, first
    /// occurrence kept) and `false` is returned so the caller can log a warning.
    pub fn try_insert(&mut self, old: u32, new: u32) -> bool {
        if self.pairs.iter().any(|(o, _)| *o == old) {
            return false;
        }
        self.pairs.push((old, new));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_match() {
        let map = IdMapping::new(vec![(1000, 2000), (1001, 2001)]);
        assert_eq!(map.lookup(1000), Some(2000));
        assert_eq!(map.lookup(1001), Some(2001));
        assert_eq!(map.lookup(9999), None);
    }

    #[test]
    fn duplicate_old_keeps_first() {
        let mut map = IdMapping::new(Vec::new());
        assert!(map.try_insert(1000, 2000));
        assert!(!map.try_insert(1000, 3000));
        assert_eq!(map.lookup(1000), Some(2000));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn empty_mapping_matches_nothing() {
        let map = IdMapping::default();
        assert!(map.is_empty());
        assert_eq!(map.lookup(0), None);
    }
}
