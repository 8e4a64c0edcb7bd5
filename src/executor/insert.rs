use log::debug;

use crate::{
    storage::table::Table,
    types::{error::DatabaseError, row::Row},
};

/// Trait for inserting rows into a table
pub trait Inserter {
    /// Insert a single row
    fn insert(&mut self, row: &Row) -> Result<(), DatabaseError>;

    /// Insert rows in order, stopping at the first failure.
    /// Returns how many rows were inserted.
    fn insert_batch(&mut self, rows: &[Row]) -> Result<usize, DatabaseError>;
}

pub struct TableInserter<'a> {
    table: &'a mut Table,
}

impl<'a> TableInserter<'a> {
    pub fn new(table: &'a mut Table) -> Self {
        Self { table }
    }
}

impl Inserter for TableInserter<'_> {
    fn insert(&mut self, row: &Row) -> Result<(), DatabaseError> {
        self.table.insert(row)?;
        debug!("Inserted key {}", row.id);
        Ok(())
    }

    fn insert_batch(&mut self, rows: &[Row]) -> Result<usize, DatabaseError> {
        for row in rows {
            self.insert(row)?;
        }
        Ok(rows.len())
    }
}
