use std::hash::{BuildHasher as _, Hash, Hasher};

pub(crate) type BuildHasher = fxhash::FxBuildHasher;

pub(crate) type HashMap<K, V> = hashbrown::HashMap<K, V, BuildHasher>;

/// Hash a single value with the crate-wide hasher.
#[inline]
pub(crate) fn hash_one(value: impl Hash) -> u64 {
    let mut hasher = BuildHasher::default().build_hasher();
    value.hash(&mut hasher);
    hasher.finish()
}

/// A fresh hasher, for callers that stream several values into one hash.
#[inline]
pub(crate) fn hasher() -> impl Hasher {
    BuildHasher::default().build_hasher()
}
