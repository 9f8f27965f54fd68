//! Buffer frame for holding a single cached page.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::storage::page::{PageId, PAGE_SIZE};

/// A frame in the buffer pool that holds a single page.
///
/// Each frame tracks:
/// - The page currently loaded (if any)
/// - Whether the page has been modified (dirty)
/// - How many operations are currently using the page (pin count)
///
/// Metadata lives in atomics so that introspection never tears, but all
/// metadata writes happen while the buffer pool latch is held. The page
/// bytes sit behind their own `RwLock`: higher layers coordinate readers
/// and writers of page content through [`data`](Self::data) /
/// [`data_mut`](Self::data_mut) within a pin; the pool itself only takes
/// that lock to perform disk I/O on the frame.
pub struct BufferFrame {
    /// Index of this frame in the buffer pool.
    frame_id: usize,
    /// Raw page id, `u32::MAX` when the frame is empty.
    page_id: AtomicU32,
    /// Number of active references to this page.
    pin_count: AtomicU32,
    /// Whether the page has been modified since last flush.
    dirty: AtomicBool,
    /// Raw page data, guarded by the per-frame content latch.
    data: RwLock<Box<[u8; PAGE_SIZE]>>,
}

impl BufferFrame {
    /// Creates a new empty buffer frame.
    #[must_use]
    pub fn new(frame_id: usize) -> Self {
        Self {
            frame_id,
            page_id: AtomicU32::new(PageId::INVALID.as_u32()),
            pin_count: AtomicU32::new(0),
            dirty: AtomicBool::new(false),
            data: RwLock::new(Box::new([0u8; PAGE_SIZE])),
        }
    }

    /// Returns the index of this frame in the pool.
    #[must_use]
    pub fn frame_id(&self) -> usize {
        self.frame_id
    }

    /// Returns the page currently loaded in this frame, if any.
    #[must_use]
    pub fn page_id(&self) -> Option<PageId> {
        let id = PageId::new(self.page_id.load(Ordering::Acquire));
        id.is_valid().then_some(id)
    }

    pub(super) fn set_page_id(&self, page_id: PageId) {
        self.page_id.store(page_id.as_u32(), Ordering::Release);
    }

    /// Returns whether this frame is empty (no page loaded).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.page_id().is_none()
    }

    /// Returns the current pin count.
    #[must_use]
    pub fn pin_count(&self) -> u32 {
        self.pin_count.load(Ordering::Acquire)
    }

    /// Increments the pin count.
    pub(super) fn pin(&self) {
        self.pin_count.fetch_add(1, Ordering::AcqRel);
    }

    /// Decrements the pin count and returns the new value.
    pub(super) fn unpin(&self) -> u32 {
        let old = self.pin_count.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(old > 0, "unpinned a frame with pin_count 0");
        old - 1
    }

    /// Returns whether the frame is pinned.
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.pin_count() > 0
    }

    /// Returns whether the page has been modified since last flush.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub(super) fn set_dirty(&self, dirty: bool) {
        self.dirty.store(dirty, Ordering::Release);
    }

    /// Returns a shared lock on the page bytes.
    pub fn data(&self) -> RwLockReadGuard<'_, Box<[u8; PAGE_SIZE]>> {
        self.data.read()
    }

    /// Returns an exclusive lock on the page bytes.
    ///
    /// Writing through this guard does not mark the frame dirty; callers
    /// report modifications via
    /// [`BufferPool::unpin_page`](super::BufferPool::unpin_page).
    pub fn data_mut(&self) -> RwLockWriteGuard<'_, Box<[u8; PAGE_SIZE]>> {
        self.data.write()
    }

    /// Resets the frame to empty state, zeroing the page bytes.
    pub(super) fn reset(&self) {
        self.page_id
            .store(PageId::INVALID.as_u32(), Ordering::Release);
        self.pin_count.store(0, Ordering::Release);
        self.dirty.store(false, Ordering::Release);
        self.data.write().fill(0);
    }
}

impl std::fmt::Debug for BufferFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferFrame")
            .field("frame_id", &self.frame_id)
            .field("page_id", &self.page_id())
            .field("pin_count", &self.pin_count())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}
