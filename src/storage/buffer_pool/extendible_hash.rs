//! In-memory extendible hash table used as the buffer pool's page table.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use parking_lot::RwLock;

/// A concurrent hash table using extendible hashing.
///
/// The table keeps a directory of `2^global_depth` slots, each pointing at
/// a bucket of at most `bucket_size` entries. A key lands in the slot
/// selected by the low `global_depth` bits of its hash. When an insert
/// overflows a bucket, the bucket splits: its local depth grows by one,
/// entries redistribute by the newly significant hash bit, and the
/// directory doubles first if the bucket was already at global depth.
/// Removal never merges buckets or shrinks the directory.
///
/// Like `HashMap`, the table is generic over a [`BuildHasher`] so tests
/// can pin the directory geometry with a deterministic hasher.
///
/// `find` runs under a shared directory latch plus a shared latch on the
/// target bucket, so lookups never block one another; `insert` and
/// `remove` hold the directory latch exclusively for the whole operation.
pub struct ExtendibleHashTable<K, V, S = RandomState> {
    /// Maximum number of entries per bucket.
    bucket_size: usize,
    hash_builder: S,
    dir: RwLock<Directory<K, V>>,
}

struct Directory<K, V> {
    /// Number of hash bits the directory indexes on.
    global_depth: u32,
    /// Count of distinct buckets referenced by the slots.
    num_buckets: usize,
    /// Total number of keys in the table.
    len: usize,
    /// Slot array of length `2^global_depth`; multiple slots may share a
    /// bucket.
    slots: Vec<Arc<Bucket<K, V>>>,
}

struct Bucket<K, V> {
    inner: RwLock<BucketInner<K, V>>,
}

struct BucketInner<K, V> {
    /// Number of hash bits distinguishing this bucket.
    local_depth: u32,
    entries: Vec<(K, V)>,
}

impl<K, V> Bucket<K, V> {
    fn new(local_depth: u32) -> Self {
        Self {
            inner: RwLock::new(BucketInner {
                local_depth,
                entries: Vec::new(),
            }),
        }
    }
}

impl<K: Hash + Eq, V: Clone> ExtendibleHashTable<K, V> {
    /// Creates a table whose buckets hold up to `bucket_size` entries.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_size` is 0.
    #[must_use]
    pub fn new(bucket_size: usize) -> Self {
        Self::with_hasher(bucket_size, RandomState::new())
    }
}

impl<K: Hash + Eq, V: Clone, S: BuildHasher> ExtendibleHashTable<K, V, S> {
    /// Creates a table using `hash_builder` to hash keys.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_size` is 0.
    #[must_use]
    pub fn with_hasher(bucket_size: usize, hash_builder: S) -> Self {
        assert!(bucket_size > 0, "bucket_size must be greater than 0");
        Self {
            bucket_size,
            hash_builder,
            dir: RwLock::new(Directory {
                global_depth: 0,
                num_buckets: 1,
                len: 0,
                slots: vec![Arc::new(Bucket::new(0))],
            }),
        }
    }

    fn hash_of(&self, key: &K) -> u64 {
        self.hash_builder.hash_one(key)
    }

    /// Directory slot for a hash under the given global depth: the low
    /// `global_depth` bits.
    fn slot_of(hash: u64, global_depth: u32) -> usize {
        let mask = match global_depth {
            0 => 0,
            64 => u64::MAX,
            d => (1u64 << d) - 1,
        };
        (hash & mask) as usize
    }

    /// Returns the value associated with `key`, if any.
    pub fn find(&self, key: &K) -> Option<V> {
        let dir = self.dir.read();
        let hash = self.hash_of(key);
        let bucket = Arc::clone(&dir.slots[Self::slot_of(hash, dir.global_depth)]);
        let inner = bucket.inner.read();
        // The bucket latch is held; concurrent finds proceed without the
        // directory latch
        drop(dir);

        inner
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Inserts `key` with `value`, overwriting any previous value.
    ///
    /// Splits the target bucket (doubling the directory when required)
    /// until the entry fits.
    ///
    /// # Panics
    ///
    /// Panics if more than `bucket_size` keys share an identical 64-bit
    /// hash, in which case no number of splits can separate them.
    pub fn insert(&self, key: K, value: V) {
        let mut dir = self.dir.write();
        let hash = self.hash_of(&key);

        {
            let bucket = Arc::clone(&dir.slots[Self::slot_of(hash, dir.global_depth)]);
            let mut inner = bucket.inner.write();
            if let Some(entry) = inner.entries.iter_mut().find(|(k, _)| *k == key) {
                entry.1 = value;
                return;
            }
            if inner.entries.len() < self.bucket_size {
                inner.entries.push((key, value));
                dir.len += 1;
                return;
            }
        }

        // Target bucket is full: split until the key's slot has room
        loop {
            let slot = Self::slot_of(hash, dir.global_depth);
            let bucket = Arc::clone(&dir.slots[slot]);
            let mut inner = bucket.inner.write();

            if inner.entries.len() < self.bucket_size {
                inner.entries.push((key, value));
                dir.len += 1;
                return;
            }

            // No sequence of splits can separate the key from a bucket
            // full of entries carrying the same 64-bit hash
            assert!(
                inner.entries.iter().any(|(k, _)| self.hash_of(k) != hash),
                "cannot split bucket: more than {} keys share one hash value",
                self.bucket_size
            );

            let new_depth = inner.local_depth + 1;

            if inner.local_depth == dir.global_depth {
                // Every slot gets mirrored into the new upper half
                dir.slots.extend_from_within(..);
                dir.global_depth += 1;
            }

            inner.local_depth = new_depth;
            let split = Arc::new(Bucket::new(new_depth));
            dir.num_buckets += 1;

            // Slots that shared the old bucket and have the newly
            // significant bit set move to the split bucket
            let bit = 1u64 << (new_depth - 1);
            for (idx, s) in dir.slots.iter_mut().enumerate() {
                if (idx as u64) & bit != 0 && Arc::ptr_eq(s, &bucket) {
                    *s = Arc::clone(&split);
                }
            }

            // Redistribute entries by the same bit
            let mut split_inner = split.inner.write();
            let mut i = 0;
            while i < inner.entries.len() {
                if self.hash_of(&inner.entries[i].0) & bit != 0 {
                    let entry = inner.entries.swap_remove(i);
                    split_inner.entries.push(entry);
                } else {
                    i += 1;
                }
            }
        }
    }

    /// Removes the entry for `key`; returns whether something was removed.
    ///
    /// Directory geometry is left unchanged.
    pub fn remove(&self, key: &K) -> bool {
        let mut dir = self.dir.write();
        let hash = self.hash_of(key);
        let bucket = Arc::clone(&dir.slots[Self::slot_of(hash, dir.global_depth)]);
        let mut inner = bucket.inner.write();

        match inner.entries.iter().position(|(k, _)| k == key) {
            Some(pos) => {
                inner.entries.swap_remove(pos);
                dir.len -= 1;
                true
            }
            None => false,
        }
    }

    /// Returns the number of hash bits the directory indexes on.
    #[must_use]
    pub fn global_depth(&self) -> u32 {
        self.dir.read().global_depth
    }

    /// Returns the local depth of the bucket referenced by directory slot
    /// `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= 2^global_depth`.
    #[must_use]
    pub fn local_depth(&self, slot: usize) -> u32 {
        self.dir.read().slots[slot].inner.read().local_depth
    }

    /// Returns the number of distinct buckets.
    #[must_use]
    pub fn num_buckets(&self) -> usize {
        self.dir.read().num_buckets
    }

    /// Returns the number of keys in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dir.read().len
    }

    /// Returns whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V, S> std::fmt::Debug for ExtendibleHashTable<K, V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dir = self.dir.read();
        f.debug_struct("ExtendibleHashTable")
            .field("bucket_size", &self.bucket_size)
            .field("global_depth", &dir.global_depth)
            .field("num_buckets", &dir.num_buckets)
            .field("len", &dir.len)
            .finish()
    }
}
