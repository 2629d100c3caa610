use hashbrown::hash_table;

/// Outcome of an equality test between a probe key and a stored key.
///
/// Keyed containers usually get by with a boolean here; congruence tables do
/// not, because a binary commutative symbol admits two orientations of the
/// same unordered argument pair and the caller needs to know which one
/// matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyEq {
    /// The keys are unrelated.
    Distinct,
    /// The keys match as-is.
    Equal,
    /// The keys match after swapping a commutative argument pair.
    EqualSwapped,
}

/// Outcome of [`RawSet::insert_if_absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Insertion<K> {
    /// No matching key was present; the probe key is now stored.
    Inserted,
    /// A matching key was already stored and nothing was changed.
    Found {
        /// The stored key.
        key: K,
        /// Whether the match was [`KeyEq::EqualSwapped`].
        swapped: bool,
    },
}

/// A hash set whose hash and equality are supplied by the caller at each
/// operation.
///
/// Keys are opaque handles (the set never hashes or compares them itself),
/// which lets their meaning live in external state that changes over the
/// set's lifetime. The caller guarantees that the hash function is stable for
/// the duration of a single operation; the supplied hash function is also
/// used to re-hash stored keys when the table grows.
#[derive(Clone)]
pub(crate) struct RawSet<K> {
    data: hash_table::HashTable<K>,
}

impl<K> Default for RawSet<K> {
    fn default() -> Self {
        RawSet {
            data: Default::default(),
        }
    }
}

impl<K: Copy> RawSet<K> {
    /// Inserts `key` unless a matching key is already stored, in which case
    /// the stored key is returned unchanged.
    pub(crate) fn insert_if_absent(
        &mut self,
        key: K,
        hash: impl Fn(&K) -> u64,
        mut eq: impl FnMut(&K, &K) -> KeyEq,
    ) -> Insertion<K> {
        let h = hash(&key);
        let mut swapped = false;
        let entry = self.data.entry(
            h,
            |stored| match eq(&key, stored) {
                KeyEq::Distinct => false,
                KeyEq::Equal => {
                    swapped = false;
                    true
                }
                KeyEq::EqualSwapped => {
                    swapped = true;
                    true
                }
            },
            |stored| hash(stored),
        );
        match entry {
            hash_table::Entry::Occupied(entry) => Insertion::Found {
                key: *entry.get(),
                swapped,
            },
            hash_table::Entry::Vacant(entry) => {
                entry.insert(key);
                Insertion::Inserted
            }
        }
    }

    /// Looks up the stored key matching `key`, if any.
    pub(crate) fn find(
        &self,
        key: &K,
        hash: impl Fn(&K) -> u64,
        mut eq: impl FnMut(&K, &K) -> KeyEq,
    ) -> Option<K> {
        self.data
            .find(hash(key), |stored| eq(key, stored) != KeyEq::Distinct)
            .copied()
    }

    /// Removes the stored key matching `key`. Returns whether one was present.
    pub(crate) fn erase(
        &mut self,
        key: &K,
        hash: impl Fn(&K) -> u64,
        mut eq: impl FnMut(&K, &K) -> KeyEq,
    ) -> bool {
        match self
            .data
            .find_entry(hash(key), |stored| eq(key, stored) != KeyEq::Distinct)
        {
            Ok(entry) => {
                entry.remove();
                true
            }
            Err(_) => false,
        }
    }

    /// Whether some stored key matches `key`.
    pub(crate) fn contains(
        &self,
        key: &K,
        hash: impl Fn(&K) -> u64,
        eq: impl FnMut(&K, &K) -> KeyEq,
    ) -> bool {
        self.find(key, hash, eq).is_some()
    }

    /// Removes every key, keeping the allocated capacity.
    pub(crate) fn clear(&mut self) {
        self.data.clear()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &K> {
        self.data.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // unordered-pair keying: equal up to swapping the two halves
    fn pair_hash(&(a, b): &(u8, u8)) -> u64 {
        crate::util::hash_one((a.min(b), a.max(b)))
    }

    fn pair_eq(x: &(u8, u8), y: &(u8, u8)) -> KeyEq {
        if x == y {
            KeyEq::Equal
        } else if (x.1, x.0) == *y {
            KeyEq::EqualSwapped
        } else {
            KeyEq::Distinct
        }
    }

    #[test]
    fn insert_find_erase() {
        let mut set = RawSet::default();
        assert_eq!(
            set.insert_if_absent((1, 2), pair_hash, pair_eq),
            Insertion::Inserted
        );
        assert_eq!(
            set.insert_if_absent((1, 2), pair_hash, pair_eq),
            Insertion::Found {
                key: (1, 2),
                swapped: false
            }
        );
        assert_eq!(
            set.insert_if_absent((2, 1), pair_hash, pair_eq),
            Insertion::Found {
                key: (1, 2),
                swapped: true
            }
        );
        assert_eq!(set.find(&(2, 1), pair_hash, pair_eq), Some((1, 2)));
        assert_eq!(set.find(&(3, 1), pair_hash, pair_eq), None);
        assert!(set.contains(&(2, 1), pair_hash, pair_eq));
        assert!(!set.contains(&(3, 1), pair_hash, pair_eq));
        assert_eq!(set.len(), 1);

        assert!(!set.erase(&(3, 1), pair_hash, pair_eq));
        assert!(set.erase(&(2, 1), pair_hash, pair_eq));
        assert!(!set.erase(&(1, 2), pair_hash, pair_eq));
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn growth_keeps_everything_findable() {
        let mut set = RawSet::default();
        for a in 0..32u8 {
            for b in 0..a {
                assert_eq!(
                    set.insert_if_absent((a, b), pair_hash, pair_eq),
                    Insertion::Inserted
                );
            }
        }
        for a in 0..32u8 {
            for b in 0..a {
                // stored with the larger element first; probe the other way
                assert_eq!(set.find(&(b, a), pair_hash, pair_eq), Some((a, b)));
            }
        }
        assert_eq!(set.len(), 32 * 31 / 2);

        set.clear();
        assert_eq!(set.len(), 0);
        assert!(!set.contains(&(1, 0), pair_hash, pair_eq));
    }
}
