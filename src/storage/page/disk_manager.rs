//! Disk manager for page-level I/O.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, VireoError};
use crate::storage::page::{PageId, PAGE_SIZE};

/// Manages disk I/O for database pages.
///
/// The disk manager handles:
/// - Reading and writing fixed-size page images to/from disk
/// - Allocating and deallocating page ids
/// - Managing the database file
pub struct DiskManager {
    /// Path to the database file.
    path: PathBuf,
    /// File handle for the database file.
    file: File,
    /// Next available page index.
    next_page_idx: u32,
}

impl DiskManager {
    /// Opens or creates a database file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn new(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| VireoError::Storage(format!("Failed to open database file: {e}")))?;

        let file_len = file
            .metadata()
            .map_err(|e| VireoError::Storage(format!("Failed to get file metadata: {e}")))?
            .len();

        // Derive the next page index from the current file size
        let next_page_idx = file_len.div_ceil(PAGE_SIZE as u64) as u32;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            next_page_idx,
        })
    }

    /// Returns the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of pages allocated in the database file.
    #[must_use]
    pub fn num_pages(&self) -> u32 {
        self.next_page_idx
    }

    /// Reads a page from disk into `buf`.
    ///
    /// `buf` must be exactly [`PAGE_SIZE`] bytes. If the page lies beyond
    /// the current file contents (allocated but never written), the buffer
    /// is zeroed.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub fn read_page(&mut self, page_id: PageId, buf: &mut [u8]) -> Result<()> {
        debug_assert_eq!(buf.len(), PAGE_SIZE);

        self.file
            .seek(SeekFrom::Start(page_id.offset()))
            .map_err(|e| VireoError::Storage(format!("Failed to seek to page: {e}")))?;

        match self.file.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                // Page was never written; it reads as zeroes
                buf.fill(0);
                Ok(())
            }
            Err(e) => Err(VireoError::Storage(format!(
                "Failed to read page {page_id}: {e}"
            ))),
        }
    }

    /// Writes a page image to disk.
    ///
    /// `data` must be exactly [`PAGE_SIZE`] bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn write_page(&mut self, page_id: PageId, data: &[u8]) -> Result<()> {
        debug_assert_eq!(data.len(), PAGE_SIZE);

        self.file
            .seek(SeekFrom::Start(page_id.offset()))
            .map_err(|e| VireoError::Storage(format!("Failed to seek to page: {e}")))?;

        self.file
            .write_all(data)
            .map_err(|e| VireoError::Storage(format!("Failed to write page {page_id}: {e}")))?;

        Ok(())
    }

    /// Allocates a new page and returns its ID.
    ///
    /// Extends the file to cover the new page; the page contents are not
    /// written until [`write_page`](Self::write_page) is called.
    ///
    /// # Errors
    ///
    /// Returns an error if the id space is exhausted or file extension
    /// fails.
    pub fn allocate_page(&mut self) -> Result<PageId> {
        let page_idx = self.next_page_idx;
        let page_id = PageId::new(page_idx);
        if !page_id.is_valid() {
            return Err(VireoError::Storage("Page id space exhausted".into()));
        }
        self.next_page_idx += 1;

        let new_size = (u64::from(page_idx) + 1) * PAGE_SIZE as u64;
        self.file
            .set_len(new_size)
            .map_err(|e| VireoError::Storage(format!("Failed to extend file: {e}")))?;

        Ok(page_id)
    }

    /// Releases a page id.
    ///
    /// File space is not reclaimed and ids are not reused; after
    /// deallocation the page's contents are unspecified.
    pub fn deallocate_page(&mut self, _page_id: PageId) {}

    /// Flushes all buffered writes to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync fails.
    pub fn sync(&mut self) -> Result<()> {
        self.file
            .sync_all()
            .map_err(|e| VireoError::Storage(format!("Failed to sync file: {e}")))
    }

    /// Returns the size of the database file in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be read.
    pub fn file_size(&self) -> Result<u64> {
        self.file
            .metadata()
            .map(|m| m.len())
            .map_err(|e| VireoError::Storage(format!("Failed to get file size: {e}")))
    }
}
