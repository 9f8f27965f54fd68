//! Buffer pool management for page caching.
//!
//! This module implements a fixed-capacity buffer pool that mediates
//! between access methods and the disk manager. It provides:
//! - Page pinning and unpinning with reference counting
//! - An extendible-hash page table mapping page ids to frames
//! - LRU eviction with write-back of dirty victims
//!
//! # Architecture
//!
//! The pool owns a pre-allocated array of [`BufferFrame`]s. A frame is
//! either *free* (on the free list), *pinned* (resident with a positive
//! pin count), or *unpinned-resident* (resident, pin count zero, tracked
//! by the [`LruReplacer`] as an eviction candidate). A single pool latch
//! is held across every public operation, so the compound state of page
//! table, replacer, and free list changes atomically per call.
//!
//! # Example
//!
//! ```ignore
//! let pool = BufferPool::new(pool_size, disk_manager)?;
//! let (page_id, frame) = pool.new_page()?.expect("all frames pinned");
//! frame.data_mut()[..4].copy_from_slice(&[1, 2, 3, 4]);
//! pool.unpin_page(page_id, true);
//! ```

mod buffer_frame;
mod extendible_hash;
mod lru_replacer;

pub use buffer_frame::BufferFrame;
pub use extendible_hash::ExtendibleHashTable;
pub use lru_replacer::LruReplacer;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Result, VireoError};
use crate::storage::page::{DiskManager, PageId};

/// Bucket capacity of the page table's extendible hash directory.
const PAGE_TABLE_BUCKET_SIZE: usize = 16;

/// State guarded by the pool latch.
///
/// Only the free list lives here directly; the page table and replacer
/// are thread-safe on their own but are mutated exclusively while this
/// latch is held, which is what makes compound operations linearizable.
struct PoolState {
    /// Frames that have never held a page since pool creation (or were
    /// returned by `delete_page`). Always preferred over eviction.
    free_list: VecDeque<usize>,
}

/// Buffer pool for managing an in-memory page cache.
pub struct BufferPool {
    /// Number of frames in the pool.
    pool_size: usize,
    /// Pre-allocated frames; index is the frame id.
    frames: Vec<Arc<BufferFrame>>,
    /// Maps resident page ids to frame indices.
    page_table: ExtendibleHashTable<PageId, usize>,
    /// Eviction candidates in LRU order.
    replacer: LruReplacer<usize>,
    /// Disk manager for page I/O.
    disk_manager: Mutex<DiskManager>,
    /// Pool latch; held across every public operation.
    latch: Mutex<PoolState>,
    /// Counter for cache hits (page found in buffer pool).
    cache_hits: AtomicU64,
    /// Counter for cache misses (page had to be loaded from disk).
    cache_misses: AtomicU64,
    /// Counter for number of pages evicted.
    evictions: AtomicU64,
    /// Counter for dirty pages written back.
    flushes: AtomicU64,
}

impl BufferPool {
    /// Creates a new buffer pool with `pool_size` frames over the given
    /// disk manager.
    ///
    /// # Errors
    ///
    /// Returns an error if `pool_size` is 0.
    pub fn new(pool_size: usize, disk_manager: DiskManager) -> Result<Self> {
        if pool_size == 0 {
            return Err(VireoError::BufferPool(
                "Buffer pool size must be greater than 0".into(),
            ));
        }

        let frames: Vec<Arc<BufferFrame>> = (0..pool_size)
            .map(|i| Arc::new(BufferFrame::new(i)))
            .collect();

        Ok(Self {
            pool_size,
            frames,
            page_table: ExtendibleHashTable::new(PAGE_TABLE_BUCKET_SIZE),
            replacer: LruReplacer::new(),
            disk_manager: Mutex::new(disk_manager),
            latch: Mutex::new(PoolState {
                free_list: (0..pool_size).collect(),
            }),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
        })
    }

    /// Returns the number of frames in the pool.
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Fetches a page, pinning its frame.
    ///
    /// If the page is resident its pin count is incremented (withdrawing
    /// the frame from the replacer if it was an eviction candidate).
    /// Otherwise a frame is claimed from the free list or by evicting the
    /// least recently used candidate, and the page is read from disk.
    ///
    /// Returns `Ok(None)` when every frame is pinned.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the page, or writing back a dirty
    /// victim, fails. The pool state is unchanged in that case.
    pub fn fetch_page(&self, page_id: PageId) -> Result<Option<Arc<BufferFrame>>> {
        debug_assert!(page_id.is_valid());
        let mut state = self.latch.lock();

        if let Some(frame_id) = self.page_table.find(&page_id) {
            let frame = &self.frames[frame_id];
            if frame.pin_count() == 0 {
                let erased = self.replacer.erase(&frame_id);
                debug_assert!(erased);
            }
            frame.pin();
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Some(Arc::clone(frame)));
        }

        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        let Some(frame_id) = self.claim_frame(&mut state)? else {
            return Ok(None);
        };
        let frame = &self.frames[frame_id];

        // Read before publishing any metadata, so a failed read leaves
        // the frame free and the page table untouched
        {
            let mut data = frame.data_mut();
            let mut disk = self.disk_manager.lock();
            if let Err(e) = disk.read_page(page_id, &mut data[..]) {
                drop(disk);
                // A failed read may have left partial bytes behind; free
                // frames must be zeroed
                data.fill(0);
                drop(data);
                state.free_list.push_front(frame_id);
                return Err(e);
            }
        }

        frame.set_page_id(page_id);
        frame.set_dirty(false);
        frame.pin();
        self.page_table.insert(page_id, frame_id);

        Ok(Some(Arc::clone(frame)))
    }

    /// Allocates a new zeroed page and pins its frame.
    ///
    /// Returns the new page id together with the frame, or `Ok(None)`
    /// when every frame is pinned.
    ///
    /// # Errors
    ///
    /// Returns an error if disk allocation, or writing back a dirty
    /// victim, fails. The pool state is unchanged in that case.
    pub fn new_page(&self) -> Result<Option<(PageId, Arc<BufferFrame>)>> {
        let mut state = self.latch.lock();

        let Some(frame_id) = self.claim_frame(&mut state)? else {
            return Ok(None);
        };
        let frame = &self.frames[frame_id];

        let page_id = match self.disk_manager.lock().allocate_page() {
            Ok(page_id) => page_id,
            Err(e) => {
                state.free_list.push_front(frame_id);
                return Err(e);
            }
        };

        // Claimed frames are already zeroed
        frame.set_page_id(page_id);
        frame.set_dirty(false);
        frame.pin();
        self.page_table.insert(page_id, frame_id);

        Ok(Some((page_id, Arc::clone(frame))))
    }

    /// Unpins a page, recording whether the caller modified it.
    ///
    /// When the pin count reaches zero the frame becomes an eviction
    /// candidate. Returns `false` if the page is not resident or its pin
    /// count is already zero; the pool state is unchanged in that case.
    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> bool {
        let _state = self.latch.lock();

        let Some(frame_id) = self.page_table.find(&page_id) else {
            return false;
        };
        let frame = &self.frames[frame_id];
        if frame.pin_count() == 0 {
            return false;
        }

        if is_dirty {
            frame.set_dirty(true);
        }
        if frame.unpin() == 0 {
            self.replacer.insert(frame_id);
        }
        true
    }

    /// Writes a page's current bytes to disk if it is dirty.
    ///
    /// Flushing a pinned page is permitted; the current byte image is
    /// written. Returns `Ok(false)` if the page is not resident.
    ///
    /// # Errors
    ///
    /// Returns an error if the disk write fails.
    pub fn flush_page(&self, page_id: PageId) -> Result<bool> {
        let _state = self.latch.lock();

        let Some(frame_id) = self.page_table.find(&page_id) else {
            return Ok(false);
        };
        self.flush_frame(&self.frames[frame_id], page_id)?;
        Ok(true)
    }

    /// Writes every dirty resident page to disk.
    ///
    /// Intended for clean shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error on the first failed disk write.
    pub fn flush_all(&self) -> Result<()> {
        let _state = self.latch.lock();

        for frame in &self.frames {
            if let Some(page_id) = frame.page_id() {
                self.flush_frame(frame, page_id)?;
            }
        }
        Ok(())
    }

    /// Deletes a page from the pool and deallocates it on disk.
    ///
    /// A resident page must be unpinned; its frame is reset and returned
    /// to the free list. Deleting a page that is not resident still
    /// deallocates it and succeeds. Returns `false` only when the page is
    /// resident and pinned.
    pub fn delete_page(&self, page_id: PageId) -> bool {
        let mut state = self.latch.lock();

        if let Some(frame_id) = self.page_table.find(&page_id) {
            let frame = &self.frames[frame_id];
            if frame.pin_count() != 0 {
                return false;
            }
            let removed = self.page_table.remove(&page_id);
            debug_assert!(removed);
            let erased = self.replacer.erase(&frame_id);
            debug_assert!(erased);
            frame.reset();
            state.free_list.push_back(frame_id);
        }

        self.disk_manager.lock().deallocate_page(page_id);
        true
    }

    /// Returns the pin count of a resident page, or `None` if the page is
    /// not in the pool.
    #[must_use]
    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        let _state = self.latch.lock();
        self.page_table
            .find(&page_id)
            .map(|frame_id| self.frames[frame_id].pin_count())
    }

    /// Returns whether a page is resident in the pool.
    #[must_use]
    pub fn contains(&self, page_id: PageId) -> bool {
        let _state = self.latch.lock();
        self.page_table.find(&page_id).is_some()
    }

    /// Returns the number of eviction candidates.
    #[must_use]
    pub fn replacer_len(&self) -> usize {
        let _state = self.latch.lock();
        self.replacer.len()
    }

    /// Returns the number of resident pages.
    #[must_use]
    pub fn page_table_len(&self) -> usize {
        let _state = self.latch.lock();
        self.page_table.len()
    }

    /// Returns the number of frames that have never been used.
    #[must_use]
    pub fn free_list_len(&self) -> usize {
        self.latch.lock().free_list.len()
    }

    /// Returns buffer pool statistics.
    #[must_use]
    pub fn stats(&self) -> BufferPoolStats {
        let _state = self.latch.lock();
        let mut dirty_pages = 0;
        let mut pinned_pages = 0;

        for frame in &self.frames {
            if frame.page_id().is_some() {
                if frame.is_dirty() {
                    dirty_pages += 1;
                }
                if frame.is_pinned() {
                    pinned_pages += 1;
                }
            }
        }

        BufferPoolStats {
            pool_size: self.pool_size,
            pages_resident: self.page_table.len(),
            dirty_pages,
            pinned_pages,
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
        }
    }

    /// Resets the cache statistics counters.
    pub fn reset_stats(&self) {
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.flushes.store(0, Ordering::Relaxed);
    }

    /// Claims a frame for a new resident page: free list first, then the
    /// LRU victim. The returned frame is empty, clean, unpinned, and no
    /// longer in the page table. Returns `Ok(None)` when every frame is
    /// pinned.
    ///
    /// Must be called with the pool latch held.
    fn claim_frame(&self, state: &mut PoolState) -> Result<Option<usize>> {
        if let Some(frame_id) = state.free_list.pop_front() {
            return Ok(Some(frame_id));
        }

        let Some(frame_id) = self.replacer.victim() else {
            return Ok(None);
        };
        let frame = &self.frames[frame_id];
        let page_id = frame
            .page_id()
            .expect("evicted frame has no resident page");

        if frame.is_dirty() {
            let data = frame.data();
            if let Err(e) = self.disk_manager.lock().write_page(page_id, &data[..]) {
                drop(data);
                // Put the victim back so the failed eviction is invisible
                self.replacer.insert(frame_id);
                return Err(e);
            }
            self.flushes.fetch_add(1, Ordering::Relaxed);
        }

        let removed = self.page_table.remove(&page_id);
        debug_assert!(removed);
        frame.reset();
        self.evictions.fetch_add(1, Ordering::Relaxed);

        Ok(Some(frame_id))
    }

    /// Writes a frame back if dirty and clears the flag.
    ///
    /// Must be called with the pool latch held.
    fn flush_frame(&self, frame: &BufferFrame, page_id: PageId) -> Result<()> {
        if frame.is_dirty() {
            let data = frame.data();
            self.disk_manager.lock().write_page(page_id, &data[..])?;
            drop(data);
            frame.set_dirty(false);
            self.flushes.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("pool_size", &self.pool_size)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Statistics about the buffer pool state.
#[derive(Debug, Clone)]
pub struct BufferPoolStats {
    /// Number of frames in the pool.
    pub pool_size: usize,
    /// Current number of resident pages.
    pub pages_resident: usize,
    /// Number of dirty resident pages.
    pub dirty_pages: usize,
    /// Number of pinned resident pages.
    pub pinned_pages: usize,
    /// Number of cache hits (page found in buffer pool).
    pub cache_hits: u64,
    /// Number of cache misses (page had to be loaded from disk).
    pub cache_misses: u64,
    /// Number of pages evicted.
    pub evictions: u64,
    /// Number of dirty pages written back.
    pub flushes: u64,
}

impl BufferPoolStats {
    /// Calculates the cache hit rate (0.0 to 1.0).
    ///
    /// Returns `None` if there have been no cache accesses.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> Option<f64> {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            None
        } else {
            Some(self.cache_hits as f64 / total as f64)
        }
    }

    /// Returns the total number of cache accesses (hits + misses).
    #[must_use]
    pub fn total_accesses(&self) -> u64 {
        self.cache_hits + self.cache_misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_pool(pool_size: usize) -> (BufferPool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let dm = DiskManager::new(&db_path).unwrap();
        let pool = BufferPool::new(pool_size, dm).unwrap();
        (pool, temp_dir)
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let dm = DiskManager::new(&temp_dir.path().join("test.db")).unwrap();
        assert!(BufferPool::new(0, dm).is_err());
    }

    #[test]
    fn test_new_page_until_exhausted() {
        let (pool, _temp) = create_test_pool(10);

        for i in 0..10 {
            let (page_id, frame) = pool.new_page().unwrap().expect("frame available");
            assert_eq!(page_id, PageId::new(i));
            assert_eq!(frame.pin_count(), 1);
            assert_eq!(pool.page_table_len(), i as usize + 1);
        }

        // Every frame is pinned now
        for _ in 0..5 {
            assert!(pool.new_page().unwrap().is_none());
            assert_eq!(pool.page_table_len(), 10);
        }
        assert_eq!(pool.free_list_len(), 0);
    }

    #[test]
    fn test_lru_eviction_order() {
        let (pool, _temp) = create_test_pool(10);

        let (page_zero, frame_zero) = pool.new_page().unwrap().unwrap();
        frame_zero.data_mut()[..5].copy_from_slice(b"Hello");
        for _ in 1..10 {
            pool.new_page().unwrap().unwrap();
        }
        assert!(pool.new_page().unwrap().is_none());

        // Unpin pages 0..5 dirty; they enter the replacer in that order
        for i in 0..5 {
            assert!(pool.unpin_page(PageId::new(i), true));
            assert_eq!(pool.pin_count(PageId::new(i)), Some(0));
            assert_eq!(pool.replacer_len(), i as usize + 1);
        }
        assert_eq!(pool.page_table_len(), 10);

        // Four new pages evict pages 0..4 in LRU order
        for (i, expected_id) in (10..14).enumerate() {
            let (page_id, _frame) = pool.new_page().unwrap().unwrap();
            assert_eq!(page_id, PageId::new(expected_id));
            assert_eq!(pool.replacer_len(), 4 - i);
            assert_eq!(pool.page_table_len(), 10);
        }
        assert_eq!(pool.replacer_len(), 1);
        assert!(!pool.contains(page_zero));

        // Page 0 was written back on eviction; fetching reloads its bytes
        let frame = pool.fetch_page(page_zero).unwrap().expect("frame available");
        assert!(pool.contains(page_zero));
        assert_eq!(pool.replacer_len(), 0);
        assert_eq!(pool.pin_count(page_zero), Some(1));
        assert_eq!(&frame.data()[..5], b"Hello");
    }

    #[test]
    fn test_fetch_pins_resident_page() {
        let (pool, _temp) = create_test_pool(4);

        let (page_id, _frame) = pool.new_page().unwrap().unwrap();
        assert_eq!(pool.pin_count(page_id), Some(1));

        let _again = pool.fetch_page(page_id).unwrap().unwrap();
        assert_eq!(pool.pin_count(page_id), Some(2));

        assert!(pool.unpin_page(page_id, false));
        assert!(pool.unpin_page(page_id, false));
        assert_eq!(pool.pin_count(page_id), Some(0));
        assert_eq!(pool.replacer_len(), 1);
    }

    #[test]
    fn test_unpin_not_resident() {
        let (pool, _temp) = create_test_pool(4);
        assert!(!pool.unpin_page(PageId::new(99), false));
    }

    #[test]
    fn test_unpin_below_zero() {
        let (pool, _temp) = create_test_pool(4);

        let (page_id, _frame) = pool.new_page().unwrap().unwrap();
        assert!(pool.unpin_page(page_id, false));
        // Already at zero; state must not change
        assert!(!pool.unpin_page(page_id, false));
        assert_eq!(pool.pin_count(page_id), Some(0));
        assert_eq!(pool.replacer_len(), 1);
    }

    #[test]
    fn test_unpin_dirty_is_sticky() {
        let (pool, _temp) = create_test_pool(4);

        let (page_id, frame) = pool.new_page().unwrap().unwrap();
        let _again = pool.fetch_page(page_id).unwrap().unwrap();

        assert!(pool.unpin_page(page_id, true));
        // A later clean unpin must not clear the dirty flag
        assert!(pool.unpin_page(page_id, false));
        assert!(frame.is_dirty());
    }

    #[test]
    fn test_flush_page() {
        let (pool, _temp) = create_test_pool(4);

        let (page_id, frame) = pool.new_page().unwrap().unwrap();
        frame.data_mut()[..4].copy_from_slice(&[1, 2, 3, 4]);
        pool.unpin_page(page_id, true);

        assert!(pool.flush_page(page_id).unwrap());
        assert!(!frame.is_dirty());

        // Not resident: flush reports false
        assert!(!pool.flush_page(PageId::new(77)).unwrap());
    }

    #[test]
    fn test_flush_all_clears_dirty() {
        let (pool, _temp) = create_test_pool(8);

        for _ in 0..5 {
            let (page_id, frame) = pool.new_page().unwrap().unwrap();
            frame.data_mut()[0] = 0xAB;
            pool.unpin_page(page_id, true);
        }
        assert_eq!(pool.stats().dirty_pages, 5);

        pool.flush_all().unwrap();
        assert_eq!(pool.stats().dirty_pages, 0);
        assert_eq!(pool.stats().flushes, 5);
    }

    #[test]
    fn test_delete_page() {
        let (pool, _temp) = create_test_pool(4);

        let (page_id, _frame) = pool.new_page().unwrap().unwrap();

        // Pinned: refused
        assert!(!pool.delete_page(page_id));
        assert!(pool.contains(page_id));

        pool.unpin_page(page_id, false);
        assert!(pool.delete_page(page_id));
        assert!(!pool.contains(page_id));
        assert_eq!(pool.replacer_len(), 0);
        assert_eq!(pool.free_list_len(), 4);

        // Deleting a page that is not resident still succeeds
        assert!(pool.delete_page(PageId::new(42)));
    }

    #[test]
    fn test_free_list_preferred_over_replacer() {
        let (pool, _temp) = create_test_pool(4);

        let (first, _frame) = pool.new_page().unwrap().unwrap();
        pool.unpin_page(first, false);
        assert_eq!(pool.replacer_len(), 1);

        // Three frames are still free; the unpinned page must survive
        for _ in 0..3 {
            pool.new_page().unwrap().unwrap();
        }
        assert!(pool.contains(first));
        assert_eq!(pool.replacer_len(), 1);

        // Now the free list is empty; the next allocation evicts it
        pool.new_page().unwrap().unwrap();
        assert!(!pool.contains(first));
    }

    #[test]
    fn test_frame_state_invariants() {
        let (pool, _temp) = create_test_pool(6);

        for _ in 0..4 {
            let (page_id, _frame) = pool.new_page().unwrap().unwrap();
            if page_id.as_u32() % 2 == 0 {
                pool.unpin_page(page_id, false);
            }
        }

        assert_eq!(pool.free_list_len() + pool.page_table_len(), 6);
        assert_eq!(pool.replacer_len(), 2);
        assert!(pool.replacer_len() <= pool.page_table_len());
    }

    #[test]
    fn test_pin_unpin_balance() {
        let (pool, _temp) = create_test_pool(4);

        let (page_id, _frame) = pool.new_page().unwrap().unwrap();
        pool.unpin_page(page_id, false);

        for _ in 0..3 {
            pool.fetch_page(page_id).unwrap().unwrap();
        }
        assert_eq!(pool.pin_count(page_id), Some(3));
        for _ in 0..3 {
            assert!(pool.unpin_page(page_id, false));
        }

        assert_eq!(pool.pin_count(page_id), Some(0));
        assert_eq!(pool.replacer_len(), 1);
    }

    #[test]
    fn test_stats_hits_and_misses() {
        let (pool, _temp) = create_test_pool(2);

        let (page_a, _frame) = pool.new_page().unwrap().unwrap();
        pool.unpin_page(page_a, true);
        let (page_b, _frame) = pool.new_page().unwrap().unwrap();
        pool.unpin_page(page_b, false);

        pool.fetch_page(page_a).unwrap().unwrap(); // hit
        pool.unpin_page(page_a, false);
        pool.new_page().unwrap().unwrap(); // evicts page_b
        pool.fetch_page(page_b).unwrap().unwrap(); // miss, evicts page_a

        let stats = pool.stats();
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 1);
        assert!(stats.evictions >= 2);
        assert_eq!(stats.hit_rate(), Some(0.5));
        assert_eq!(stats.total_accesses(), 2);

        pool.reset_stats();
        assert_eq!(pool.stats().total_accesses(), 0);
    }

    #[test]
    fn test_concurrent_fetch_unpin() {
        use std::sync::Arc;

        let (pool, _temp) = create_test_pool(16);
        let pool = Arc::new(pool);

        let mut page_ids = Vec::new();
        for _ in 0..8 {
            let (page_id, _frame) = pool.new_page().unwrap().unwrap();
            pool.unpin_page(page_id, false);
            page_ids.push(page_id);
        }
        let page_ids = Arc::new(page_ids);

        let handles: Vec<_> = (0..8)
            .map(|tid: usize| {
                let pool = Arc::clone(&pool);
                let page_ids = Arc::clone(&page_ids);
                std::thread::spawn(move || {
                    for round in 0..200 {
                        let page_id = page_ids[(tid + round) % page_ids.len()];
                        let frame = pool
                            .fetch_page(page_id)
                            .unwrap()
                            .expect("pool cannot be exhausted");
                        assert_eq!(frame.page_id(), Some(page_id));
                        assert!(pool.unpin_page(page_id, false));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Quiescent state: everything unpinned and evictable again
        assert_eq!(pool.page_table_len(), 8);
        assert_eq!(pool.replacer_len(), 8);
        for &page_id in page_ids.iter() {
            assert_eq!(pool.pin_count(page_id), Some(0));
        }
    }
}
