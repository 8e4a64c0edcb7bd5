use std::path::Path;

use log::{info, warn};

use crate::{
    executor::{scan::Scanner, sequential_scan::SequentialScanner},
    storage::{bplus_tree::BPlusTree, pager::Pager},
    types::{Key, PageId, TABLE_MAX_PAGES, error::DatabaseError, row::Row},
};

const ROOT_PAGE_ID: PageId = 0;

/// A single persistent table: a pager plus the B+ tree rooted at page 0.
pub struct Table {
    tree: BPlusTree,
    capacity_exhausted: bool,
}

impl Table {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        Self::open_with_max_pages(path, TABLE_MAX_PAGES)
    }

    pub fn open_with_max_pages<P: AsRef<Path>>(path: P, max_pages: u32) -> Result<Self, DatabaseError> {
        let pager = Pager::open(path, max_pages)?;
        let tree = BPlusTree::new(pager, ROOT_PAGE_ID)?;
        Ok(Self {
            tree,
            capacity_exhausted: false,
        })
    }

    /// Override node fanout, mostly to force deep trees in tests.
    pub fn with_fanout(mut self, leaf_max_cells: usize, internal_max_keys: usize) -> Self {
        self.tree = self.tree.with_fanout(leaf_max_cells, internal_max_keys);
        self
    }

    /// Insert a row. Once the page budget has run out every later insert
    /// fails with `CapacityExceeded`.
    pub fn insert(&mut self, row: &Row) -> Result<(), DatabaseError> {
        if self.capacity_exhausted {
            return Err(DatabaseError::CapacityExceeded {
                max_pages: self.tree.pager.max_pages(),
            });
        }
        match self.tree.insert(row) {
            Err(err @ DatabaseError::CapacityExceeded { .. }) => {
                warn!("Table is full; rejecting further inserts");
                self.capacity_exhausted = true;
                Err(err)
            }
            other => other,
        }
    }

    pub fn find(&mut self, id: Key) -> Result<Option<Row>, DatabaseError> {
        self.tree.get(id)
    }

    /// Lazy ascending cursor over every row.
    pub fn scanner(&mut self) -> SequentialScanner<'_> {
        SequentialScanner::new(&mut self.tree, None)
    }

    pub fn select_all(&mut self) -> Result<Vec<Row>, DatabaseError> {
        let mut scanner = self.scanner();
        let mut rows = Vec::new();
        while let Some(row) = scanner.scan()? {
            rows.push(row);
        }
        Ok(rows)
    }

    pub fn debug_dump(&mut self) -> Result<String, DatabaseError> {
        self.tree.dump()
    }

    pub fn page_count(&self) -> u32 {
        self.tree.pager.page_count()
    }

    pub fn root_page_id(&self) -> PageId {
        self.tree.root_page_id
    }

    pub fn is_capacity_exhausted(&self) -> bool {
        self.capacity_exhausted
    }

    /// Flush every cached page to the backing file.
    pub fn close(mut self) -> Result<(), DatabaseError> {
        self.tree.pager.flush_all()?;
        info!("Closed {}", self.tree.pager.path.display());
        Ok(())
    }
}
