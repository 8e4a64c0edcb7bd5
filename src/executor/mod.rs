pub mod insert;
pub mod scan;
pub mod sequential_scan;

use crate::{
    executor::{
        insert::{Inserter, TableInserter},
        scan::ScanIterator,
        sequential_scan::SequentialScanner,
    },
    planner::command::Statement,
    storage::table::Table,
    types::error::DatabaseError,
};

pub enum ExecuteResult<'a> {
    Inserted,
    Rows(ScanIterator<SequentialScanner<'a>>),
}

pub fn execute<'a>(statement: &Statement, table: &'a mut Table) -> Result<ExecuteResult<'a>, DatabaseError> {
    match statement {
        Statement::Insert(row) => {
            TableInserter::new(table).insert(row)?;
            Ok(ExecuteResult::Inserted)
        }
        Statement::Select => Ok(ExecuteResult::Rows(ScanIterator::new(table.scanner()))),
    }
}
