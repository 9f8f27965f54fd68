//! vireo - buffer management core of an embedded storage engine.
//!
//! This crate implements the in-memory page-caching layer that sits
//! between access methods (indices, heap files) and the on-disk page
//! file:
//!
//! - [`storage::BufferPool`]: a fixed-capacity pool of page frames with
//!   pin/unpin lifetimes and write-back of dirty pages on eviction
//! - [`storage::ExtendibleHashTable`]: the concurrent page table mapping
//!   page ids to frames, growing by bucket splits and directory doubling
//! - [`storage::LruReplacer`]: the eviction policy choosing the least
//!   recently unpinned frame as the next victim
//! - [`storage::DiskManager`]: block I/O over a single database file
//!
//! # Example
//!
//! ```no_run
//! use vireo::storage::{BufferPool, DiskManager};
//!
//! # fn main() -> vireo::Result<()> {
//! let disk_manager = DiskManager::new(std::path::Path::new("data.db"))?;
//! let pool = BufferPool::new(64, disk_manager)?;
//!
//! let (page_id, frame) = pool.new_page()?.expect("pool exhausted");
//! frame.data_mut()[..5].copy_from_slice(b"hello");
//! pool.unpin_page(page_id, true);
//! pool.flush_all()?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod storage;

pub use error::{Result, VireoError};
