//! A single-table row store: fixed-width rows kept in a disk-backed B+ tree,
//! driven through a small line-oriented REPL.

pub mod executor;
pub mod planner;
pub mod repl;
pub mod storage;
pub mod types;
pub mod utils;
