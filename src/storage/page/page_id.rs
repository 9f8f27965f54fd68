//! Page identifier type.

use serde::{Deserialize, Serialize};

/// Unique identifier for a page in the database file.
///
/// Page ids are allocated sequentially by the
/// [`DiskManager`](super::DiskManager), starting at 0. The all-ones value
/// is reserved as the invalid sentinel and is never handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(u32);

impl PageId {
    /// Sentinel value meaning "no page".
    pub const INVALID: Self = Self(u32::MAX);

    /// Creates a page ID from a raw page index.
    #[must_use]
    pub const fn new(page_idx: u32) -> Self {
        Self(page_idx)
    }

    /// Returns the raw page index.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the byte offset of this page within the database file.
    #[must_use]
    pub const fn offset(self) -> u64 {
        (self.0 as u64) * (super::PAGE_SIZE as u64)
    }

    /// Returns whether this is a real page id (not the sentinel).
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Page({})", self.0)
    }
}
