use std::{
    collections::HashMap,
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::types::{PAGE_SIZE, PageId, error::DatabaseError};

/// Fixed-size page I/O against a single backing file.
///
/// Page `n` lives at file offset `n * PAGE_SIZE`; the file holds nothing but
/// whole pages. Pages are loaded lazily into an in-memory cache and only
/// written back on [`Pager::flush`] / [`Pager::flush_all`].
pub struct Pager {
    pub path: PathBuf,
    file: File,
    file_length: u64,
    num_pages: u32,
    max_pages: u32,
    page_cache: HashMap<PageId, Vec<u8>>,
}

impl Pager {
    pub fn open<P: AsRef<Path>>(path: P, max_pages: u32) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let file_length = file.metadata()?.len();

        if file_length % PAGE_SIZE as u64 != 0 {
            return Err(DatabaseError::CorruptedFile {
                reason: format!(
                    "{} is {} bytes, not a whole number of pages",
                    path.display(),
                    file_length
                ),
            });
        }
        let num_pages = (file_length / PAGE_SIZE as u64) as u32;
        if num_pages > max_pages {
            return Err(DatabaseError::CorruptedFile {
                reason: format!("{} holds {} pages, limit is {}", path.display(), num_pages, max_pages),
            });
        }

        info!("Opened {} with {} page(s)", path.display(), num_pages);
        Ok(Self {
            path: path.to_path_buf(),
            file,
            file_length,
            num_pages,
            max_pages,
            page_cache: HashMap::new(),
        })
    }

    fn page_offset(page_id: PageId) -> u64 {
        page_id as u64 * PAGE_SIZE as u64
    }

    /// Number of pages materialized so far, on disk or in the cache.
    pub fn page_count(&self) -> u32 {
        self.num_pages
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Returns the buffer for `page_id`, reading it from disk on first access.
    /// Pages past the end of the file come back zero-filled.
    pub fn get_page(&mut self, page_id: PageId) -> Result<&mut [u8], DatabaseError> {
        if page_id >= self.max_pages {
            return Err(DatabaseError::PageOutOfBounds {
                page_id,
                max_pages: self.max_pages,
            });
        }

        if !self.page_cache.contains_key(&page_id) {
            let mut buffer = vec![0u8; PAGE_SIZE];
            let pages_on_disk = self.file_length / PAGE_SIZE as u64;
            if (page_id as u64) < pages_on_disk {
                self.file.seek(SeekFrom::Start(Self::page_offset(page_id)))?;
                self.file.read_exact(&mut buffer)?;
            }
            self.page_cache.insert(page_id, buffer);
            if page_id >= self.num_pages {
                self.num_pages = page_id + 1;
            }
        }

        match self.page_cache.get_mut(&page_id) {
            Some(buffer) => Ok(buffer.as_mut_slice()),
            None => Err(DatabaseError::PageOutOfBounds {
                page_id,
                max_pages: self.max_pages,
            }),
        }
    }

    /// Reserve the next unused page number. Pages are never reused.
    pub fn allocate_page(&mut self) -> Result<PageId, DatabaseError> {
        if self.num_pages >= self.max_pages {
            return Err(DatabaseError::CapacityExceeded {
                max_pages: self.max_pages,
            });
        }
        let page_id = self.num_pages;
        self.get_page(page_id)?;
        debug!("Allocated page {}", page_id);
        Ok(page_id)
    }

    pub fn flush(&mut self, page_id: PageId) -> Result<(), DatabaseError> {
        let Some(buffer) = self.page_cache.get(&page_id) else {
            return Ok(());
        };
        self.file.seek(SeekFrom::Start(Self::page_offset(page_id)))?;
        self.file.write_all(buffer)?;
        let end = Self::page_offset(page_id) + PAGE_SIZE as u64;
        if end > self.file_length {
            self.file_length = end;
        }
        Ok(())
    }

    /// Write every cached page back and sync the file.
    pub fn flush_all(&mut self) -> Result<(), DatabaseError> {
        for page_id in 0..self.num_pages {
            self.flush(page_id)?;
        }
        self.file.flush()?;
        self.file.sync_all()?;
        info!("Flushed {} page(s) to {}", self.num_pages, self.path.display());
        Ok(())
    }
}
