use std::path::PathBuf;

use tempfile::TempDir;

use crate::{storage::table::Table, types::error::DatabaseError};

/// A throwaway database file inside its own temp directory.
/// The directory and everything in it is removed on drop.
pub struct TempDatabase {
    pub path: PathBuf,
    _dir: TempDir,
}

impl TempDatabase {
    pub fn new() -> Self {
        Self::with_prefix("tinysql_test")
    }

    pub fn with_prefix(prefix: &str) -> Self {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .expect("failed to create temp dir");
        Self {
            path: dir.path().join("dbfile.db"),
            _dir: dir,
        }
    }

    pub fn open_table(&self) -> Result<Table, DatabaseError> {
        Table::open(&self.path)
    }

    pub fn open_table_with_max_pages(&self, max_pages: u32) -> Result<Table, DatabaseError> {
        Table::open_with_max_pages(&self.path, max_pages)
    }
}

impl Default for TempDatabase {
    fn default() -> Self {
        Self::new()
    }
}
